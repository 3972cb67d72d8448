//! # Blood Bank Backend
//!
//! Decision support for blood-bank operations: shortage prediction over
//! current stock, emergency donor matching, and waste, demand and
//! geographic risk analytics. The backend exposes a REST API via Axum.
//!
//! ## Architecture
//!
//! - [`models`]: Blood types, compatibility, geography and stored records
//! - [`algorithms`]: Pure scoring and risk formulas
//! - [`db`]: Repository traits, in-memory and PostgreSQL stores
//! - [`services`]: Prediction, matching and analytics engines
//! - [`routes`]: Route paths and response types per API area
//! - [`api`]: Re-exports of the public response types
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod algorithms;
pub mod api;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
