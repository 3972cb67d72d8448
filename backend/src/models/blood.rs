//! ABO/Rh blood types, donor compatibility and request urgency.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the eight ABO/Rh blood types.
///
/// Serialized with the conventional notation (`"O-"`, `"AB+"`, ...), which is
/// also the representation stored in the database.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum BloodType {
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "AB+")]
    AbPositive,
}

impl BloodType {
    /// All eight types, universal donor first.
    pub const ALL: [BloodType; 8] = [
        BloodType::ONegative,
        BloodType::OPositive,
        BloodType::ANegative,
        BloodType::APositive,
        BloodType::BNegative,
        BloodType::BPositive,
        BloodType::AbNegative,
        BloodType::AbPositive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::ONegative => "O-",
            BloodType::OPositive => "O+",
            BloodType::ANegative => "A-",
            BloodType::APositive => "A+",
            BloodType::BNegative => "B-",
            BloodType::BPositive => "B+",
            BloodType::AbNegative => "AB-",
            BloodType::AbPositive => "AB+",
        }
    }

    /// Donor types that may legally supply a recipient of this type.
    pub fn compatible_donors(&self) -> &'static [BloodType] {
        use BloodType::*;
        match self {
            ONegative => &[ONegative],
            OPositive => &[ONegative, OPositive],
            ANegative => &[ONegative, ANegative],
            APositive => &[ONegative, OPositive, ANegative, APositive],
            BNegative => &[ONegative, BNegative],
            BPositive => &[ONegative, OPositive, BNegative, BPositive],
            AbNegative => &[ONegative, ANegative, BNegative, AbNegative],
            AbPositive => &Self::ALL,
        }
    }

    /// Whether a donor of this type can give to `recipient`.
    pub fn can_donate_to(&self, recipient: BloodType) -> bool {
        recipient.compatible_donors().contains(self)
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BloodType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown blood type: {}", s))
    }
}

/// Compatibility lookup on raw type codes.
///
/// Unknown codes resolve to a singleton containing only themselves
/// (fail-open), so a request for an unrecognised type matches donors stored
/// under exactly that code and nothing else.
pub fn compatible_donor_codes(requested: &str) -> Vec<String> {
    match requested.parse::<BloodType>() {
        Ok(blood_type) => blood_type
            .compatible_donors()
            .iter()
            .map(|t| t.as_str().to_string())
            .collect(),
        Err(_) => vec![requested.to_string()],
    }
}

/// Requester-supplied priority of an emergency request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    /// Multiplier applied to a donor's match score.
    pub fn multiplier(&self) -> f64 {
        match self {
            Urgency::Critical => 1.2,
            Urgency::High => 1.1,
            Urgency::Medium => 1.0,
            Urgency::Low => 0.9,
        }
    }

    /// Multiplier for a possibly-unknown urgency; unknown levels are neutral.
    pub fn multiplier_for(urgency: Option<Urgency>) -> f64 {
        urgency.map(|u| u.multiplier()).unwrap_or(1.0)
    }
}

impl FromStr for Urgency {
    type Err = String;

    /// Matching is exact (upper-case), like the stored request values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Urgency::Low),
            "MEDIUM" => Ok(Urgency::Medium),
            "HIGH" => Ok(Urgency::High),
            "CRITICAL" => Ok(Urgency::Critical),
            other => Err(format!("Unknown urgency level: {}", other)),
        }
    }
}
