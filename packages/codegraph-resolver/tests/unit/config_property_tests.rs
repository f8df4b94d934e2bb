//! Property-based tests for resolver configuration
//!
//! - Validity: every preset, and every in-range override, validates
//! - Roundtrip: from_yaml_str(to_yaml(x)) == x
//! - Rejection: out-of-range thread counts never validate

#[path = "../common/mod.rs"]
mod common;

use codegraph_resolver::config::{ConfigError, Preset, ResolverConfig};
use codegraph_resolver::prelude::*;
use common::*;
use proptest::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn preset_strategy() -> impl Strategy<Value = Preset> {
    prop_oneof![
        Just(Preset::Fast),
        Just(Preset::Balanced),
        Just(Preset::Thorough),
    ]
}

proptest! {
    #[test]
    fn prop_in_range_configs_validate_and_roundtrip(
        preset in preset_strategy(),
        workers in 0usize..=512,
        delivery in 1usize..=512,
        exhaustive in any::<bool>(),
        fail_on_cycle in any::<bool>(),
    ) {
        let mut config = ResolverConfig::from_preset(preset);
        config.scan.worker_threads = workers;
        config.scan.exhaustive_member_scan = exhaustive;
        config.delivery.threads = delivery;
        config.fail_on_cycle = fail_on_cycle;
        prop_assert!(config.validate().is_ok());

        let yaml = config.to_yaml().unwrap();
        let recovered = ResolverConfig::from_yaml_str(&yaml).unwrap();
        prop_assert_eq!(recovered, config);
    }

    #[test]
    fn prop_out_of_range_threads_are_rejected(preset in preset_strategy(), workers in 513usize..10_000) {
        let mut config = ResolverConfig::from_preset(preset);
        config.scan.worker_threads = workers;
        let rejected = matches!(config.validate(), Err(ConfigError::Range { .. }));
        prop_assert!(rejected);
    }
}

#[test]
fn test_presets_are_valid() {
    for name in ["fast", "balanced", "thorough"] {
        let preset = Preset::from_str(name).unwrap();
        let config = ResolverConfig::from_preset(preset);
        assert!(config.validate().is_ok(), "{}", name);
        assert!(config.fail_on_cycle);
    }
    assert!(matches!(
        Preset::from_str("reckless"),
        Err(ConfigError::UnknownPreset(_))
    ));
}

#[test]
fn test_yaml_file_drives_a_session() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "version: 1\npreset: fast\noverrides:\n  scan:\n    worker_threads: 2\n    exhaustive_member_scan: true"
    )
    .unwrap();

    let config = ResolverConfig::from_yaml(file.path()).unwrap();
    assert!(config.scan.exhaustive_member_scan);

    let session = ResolutionSession::new(fixture_corpus(), config).unwrap();
    let fields = session
        .fields(FieldCriteria::new().is_static(true).key("statics"))
        .unwrap();
    let report = session.resolve_blocking().unwrap();

    let fields = fields.value().unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(&*fields[0].name, "LIMIT");
    assert!(report.is_clean());
}

#[test]
fn test_invalid_config_is_rejected_by_session() {
    let mut config = fixture_config();
    config.delivery.threads = 0;
    let err = ResolutionSession::new(fixture_corpus(), config).unwrap_err();
    assert!(matches!(err, ResolverError::Config(ConfigError::Range { .. })));
}
