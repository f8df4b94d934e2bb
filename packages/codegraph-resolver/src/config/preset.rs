//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// One-shot tooling: no snapshot cache, small delivery pool
    ///
    /// - Scan: all cores
    /// - Delivery: 1 thread
    /// - Cache: disabled
    Fast,

    /// Repeated runs over a mostly stable corpus
    ///
    /// - Scan: all cores
    /// - Delivery: 2 threads
    /// - Cache: enabled, persisted
    #[default]
    Balanced,

    /// Exploratory queries where member criteria may lack a declaring type
    ///
    /// - Scan: all cores, exhaustive member scan
    /// - Delivery: 4 threads
    /// - Cache: enabled, persisted
    Thorough,
}

impl Preset {
    /// Parse preset from string
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "thorough" => Ok(Self::Thorough),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
