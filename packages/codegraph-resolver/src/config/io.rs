//! Configuration I/O (YAML loading)
//!
//! ```yaml
//! version: 1
//! preset: balanced
//! overrides:
//!   scan:
//!     worker_threads: 8
//!   cache:
//!     path: .codegraph/resolver.bin
//! ```

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use super::resolver_config::{CacheConfig, DeliveryConfig, ResolverConfig, ScanConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    /// Base preset
    pub preset: String,

    /// Sections replacing the preset's
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

/// Configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan: Option<ScanConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_on_cycle: Option<bool>,
}

impl ResolverConfig {
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Parse, apply overrides onto the preset, then validate
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(text)?;
        let version = raw
            .get("version")
            .ok_or(ConfigError::MissingVersion)?
            .as_u64()
            .ok_or(ConfigError::MissingVersion)? as u32;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let file: ConfigFileV1 = serde_yaml::from_value(raw)?;
        let mut config = ResolverConfig::from_preset(Preset::from_str(&file.preset)?);
        if let Some(overrides) = file.overrides {
            if let Some(scan) = overrides.scan {
                config.scan = scan;
            }
            if let Some(delivery) = overrides.delivery {
                config.delivery = delivery;
            }
            if let Some(cache) = overrides.cache {
                config.cache = cache;
            }
            if let Some(fail_on_cycle) = overrides.fail_on_cycle {
                config.fail_on_cycle = fail_on_cycle;
            }
        }

        config.validate()?;
        tracing::debug!(preset = %config.preset, "resolver config loaded");
        Ok(config)
    }

    /// Export as a v1 file with every section spelled out
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: 1,
            preset: self.preset.as_str().to_string(),
            overrides: Some(ConfigOverrides {
                scan: Some(self.scan.clone()),
                delivery: Some(self.delivery.clone()),
                cache: Some(self.cache.clone()),
                fail_on_cycle: Some(self.fail_on_cycle),
            }),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}
