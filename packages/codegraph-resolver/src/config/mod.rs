//! Configuration
//!
//! Two levels:
//! - Level 1: Preset - `ResolverConfig::from_preset(Preset::Fast)`
//! - Level 2: YAML - versioned file, a preset plus per-section overrides
//!
//! # Examples
//!
//! ```rust,ignore
//! use codegraph_resolver::config::{Preset, ResolverConfig};
//!
//! let config = ResolverConfig::from_preset(Preset::Balanced);
//! let config = ResolverConfig::from_yaml("resolver.yaml")?;
//! ```

pub mod error;
pub mod io;
pub mod preset;
pub mod resolver_config;

// Re-exports
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigFileV1, ConfigOverrides};
pub use preset::Preset;
pub use resolver_config::{CacheConfig, DeliveryConfig, ResolverConfig, ScanConfig};
