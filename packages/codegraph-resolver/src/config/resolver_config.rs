//! Resolver configuration
//!
//! ```rust,ignore
//! use codegraph_resolver::config::{Preset, ResolverConfig};
//!
//! let mut config = ResolverConfig::from_preset(Preset::Fast);
//! config.scan.worker_threads = 4;
//! config.validate()?;
//! ```

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const MAX_THREADS: usize = 512;

/// Corpus scan pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// 0 = one thread per CPU
    pub worker_threads: usize,
    /// Allow member criteria without a declaring type to scan every type
    pub exhaustive_member_scan: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            exhaustive_member_scan: false,
        }
    }
}

/// Callback delivery context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeliveryConfig {
    pub threads: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self { threads: 2 }
    }
}

/// Snapshot cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Snapshot file; `None` keeps snapshots in memory only
    pub path: Option<PathBuf>,
    /// Write the snapshot to `path` (when set) after each resolution; ignored
    /// while `enabled` is off
    pub persist: bool,
}

impl CacheConfig {
    /// Snapshot file to write after a resolution, if any
    pub fn persist_path(&self) -> Option<&Path> {
        self.path
            .as_deref()
            .filter(|_| self.enabled && self.persist)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            persist: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    pub preset: Preset,
    pub scan: ScanConfig,
    pub delivery: DeliveryConfig,
    pub cache: CacheConfig,
    /// Reject cyclic criteria graphs at `resolve()`; `false` lets them stall
    pub fail_on_cycle: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl ResolverConfig {
    pub fn from_preset(preset: Preset) -> Self {
        let (delivery_threads, cache_enabled, exhaustive) = match preset {
            Preset::Fast => (1, false, false),
            Preset::Balanced => (2, true, false),
            Preset::Thorough => (4, true, true),
        };

        Self {
            preset,
            scan: ScanConfig {
                worker_threads: 0,
                exhaustive_member_scan: exhaustive,
            },
            delivery: DeliveryConfig {
                threads: delivery_threads,
            },
            cache: CacheConfig {
                enabled: cache_enabled,
                path: None,
                persist: cache_enabled,
            },
            fail_on_cycle: true,
        }
    }

    /// Scan pool size after resolving 0 to the CPU count
    pub fn effective_worker_threads(&self) -> usize {
        match self.scan.worker_threads {
            0 => num_cpus::get(),
            n => n,
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.scan.worker_threads > MAX_THREADS {
            return Err(ConfigError::range_with_hint(
                "scan.worker_threads",
                self.scan.worker_threads,
                0,
                MAX_THREADS,
                "Use 0 to size the pool from the CPU count",
            ));
        }
        if self.delivery.threads == 0 || self.delivery.threads > MAX_THREADS {
            return Err(ConfigError::range_with_hint(
                "delivery.threads",
                self.delivery.threads,
                1,
                MAX_THREADS,
                "Callbacks need at least one delivery thread",
            ));
        }
        Ok(())
    }
}
