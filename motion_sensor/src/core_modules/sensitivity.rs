// THEORY:
// Sensitivity is the only user-facing knob of the motion scorer. It is a small
// enumerated level that maps onto a fixed threshold table; a higher level maps to a
// strictly lower threshold, so smaller changes are reported as motion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type Threshold = f32;

pub const LOW_THRESHOLD: Threshold = 0.3;
pub const MEDIUM_THRESHOLD: Threshold = 0.2;
pub const HIGH_THRESHOLD: Threshold = 0.1;

/// How readily the scorer reports motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensitivityLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl SensitivityLevel {
    pub const ALL: [SensitivityLevel; 3] = [
        SensitivityLevel::Low,
        SensitivityLevel::Medium,
        SensitivityLevel::High,
    ];

    pub fn threshold(self) -> Threshold {
        threshold_for(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityLevel::Low => "low",
            SensitivityLevel::Medium => "medium",
            SensitivityLevel::High => "high",
        }
    }
}

/// Looks up the motion threshold for a sensitivity level.
pub fn threshold_for(level: SensitivityLevel) -> Threshold {
    match level {
        SensitivityLevel::Low => LOW_THRESHOLD,
        SensitivityLevel::Medium => MEDIUM_THRESHOLD,
        SensitivityLevel::High => HIGH_THRESHOLD,
    }
}

impl fmt::Display for SensitivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sensitivity level `{0}` (expected low, medium or high)")]
pub struct ParseSensitivityError(String);

impl FromStr for SensitivityLevel {
    type Err = ParseSensitivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(SensitivityLevel::Low),
            "medium" => Ok(SensitivityLevel::Medium),
            "high" => Ok(SensitivityLevel::High),
            _ => Err(ParseSensitivityError(s.to_string())),
        }
    }
}
