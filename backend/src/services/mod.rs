//! Decision-support engines.
//!
//! Each service reads what it needs through the repository traits, applies
//! the formulas in [`crate::algorithms`] row by row and returns a typed
//! result. The clock is always passed in.

pub mod forecast;
pub mod heatmap;
pub mod matching;
pub mod prediction;
pub mod waste;

pub use forecast::forecast_demand;
pub use heatmap::build_heatmap;
pub use matching::{match_donors, search_donors, RequestIdStrategy};
pub use prediction::{filter_by_risk, predict_shortages};
pub use waste::analyze_waste;

#[cfg(test)]
#[path = "matching_tests.rs"]
mod matching_tests;
#[cfg(test)]
#[path = "prediction_tests.rs"]
mod prediction_tests;
