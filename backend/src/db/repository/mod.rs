//! Repository trait definitions for store access.
//!
//! The store is split into three focused traits so services only depend on
//! what they read:
//!
//! - [`InventoryRepository`]: current stock, its upsert, and the health probe
//! - [`DonorRepository`]: donor lookups for matching and search
//! - [`HistoryRepository`]: usage/movement aggregates, events, hospital sites
//!
//! # Trait Composition
//!
//! ```ignore
//! impl InventoryRepository for MyRepo { ... }
//! impl DonorRepository for MyRepo { ... }
//! impl HistoryRepository for MyRepo { ... }
//! ```
//!
//! Any type implementing all three is a [`FullRepository`], which is what the
//! HTTP layer stores behind an `Arc<dyn FullRepository>`.

pub mod donor;
pub mod error;
pub mod history;
pub mod inventory;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use donor::DonorRepository;
pub use history::HistoryRepository;
pub use inventory::InventoryRepository;

/// Composite trait bound for a complete repository implementation.
pub trait FullRepository: InventoryRepository + DonorRepository + HistoryRepository {}

impl<T> FullRepository for T where T: InventoryRepository + DonorRepository + HistoryRepository {}
