//! Scoring and risk formulas.
//!
//! Everything here is pure: no repository access, no clock. Callers pass in
//! the reference date so results are reproducible.

pub mod analytics;
pub mod scoring;
pub mod shortage;

pub use scoring::score_donor;
pub use shortage::{estimate, ShortageEstimate};

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::round_to;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.93299, 2), 0.93);
        assert_eq!(round_to(12.3456, 1), 12.3);
        assert_eq!(round_to(0.0598, 3), 0.06);
        assert_eq!(round_to(-1.255, 0), -1.0);
    }
}
