//! Snapshot cache: capture, persist, and seed a second session

#[path = "../common/mod.rs"]
mod common;

use codegraph_resolver::config::Preset;
use codegraph_resolver::errors::ErrorKind;
use codegraph_resolver::features::cache::{decode, encode, CacheSnapshot, CacheStore};
use codegraph_resolver::features::corpus::{EntityCorpus, MemoryProvider, ShardedCorpus};
use codegraph_resolver::prelude::*;
use common::*;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Keyed graph shared by the live and the seeded session
fn build_graph(session: &ResolutionSession) -> (ResultCell<TypeEntity>, ResultSet<MethodEntity>) {
    let b = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("a.B")).key("type.b"))
        .unwrap();
    let runs = session
        .methods(
            MethodCriteria::new()
                .declared_by(&b)
                .include_super(true)
                .name(NamePattern::exact("run"))
                .key("runs"),
        )
        .unwrap();
    session
        .first_string(StringCriteria::new().value(NamePattern::prefix("api_")).key("api"))
        .unwrap();
    (b, runs)
}

fn live_snapshot() -> CacheSnapshot {
    let session = ResolutionSession::new(fixture_corpus(), fixture_config()).unwrap();
    build_graph(&session);
    let report = session.resolve_blocking().unwrap();
    assert!(report.evaluations > 0);
    report.snapshot
}

fn cache_config(dir: &TempDir) -> ResolverConfig {
    let mut config = ResolverConfig::from_preset(Preset::Balanced);
    config.scan.worker_threads = 2;
    config.cache.path = Some(dir.path().join("resolver.cache"));
    config
}

#[test]
fn test_snapshot_holds_every_keyed_result() {
    let snapshot = live_snapshot();

    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot.singles["type.b"].identifier, "a.B");
    assert_eq!(snapshot.singles["api"].identifier, "api_key");
    assert_eq!(
        snapshot.collections["runs"].identifiers,
        vec!["La/B;->run()V".to_string(), "La/A;->run()V".to_string()]
    );
}

#[test]
fn test_encoding_is_stable() {
    let snapshot = live_snapshot();
    let bytes = encode(&snapshot).unwrap();
    let decoded = decode(&bytes).unwrap();

    assert_eq!(decoded, snapshot);
    assert_eq!(encode(&decoded).unwrap(), bytes);
}

#[test]
fn test_seeded_session_never_scans() {
    let snapshot = live_snapshot();
    let corpus = fixture_sharded();
    let session = ResolutionSession::new(corpus.clone(), fixture_config()).unwrap();
    session.use_snapshot(snapshot);
    let (b, runs) = build_graph(&session);

    let delivered = Arc::new(AtomicUsize::new(0));
    let seen = delivered.clone();
    b.on_match(move |ty| {
        assert_eq!(ty.name(), "a.B");
        let thread = std::thread::current();
        assert!(thread
            .name()
            .unwrap_or_default()
            .starts_with("codegraph-resolver-delivery-"));
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let report = session.resolve_blocking().unwrap();

    assert!(report.cache.loaded);
    assert!(report.cache.trusted);
    assert_eq!(report.cache.hits, 3);
    assert!(report.cache.dropped.is_empty());
    assert_eq!(report.evaluations, 0);
    assert_eq!(report.rounds, 0);
    assert_eq!(delivered.load(Ordering::SeqCst), 1);

    assert_eq!(b.value(), Some(TypeEntity::new("a.B")));
    let owners: Vec<String> = runs
        .value()
        .unwrap()
        .iter()
        .map(|m| m.declaring.to_string())
        .collect();
    assert_eq!(owners, vec!["a.B", "a.A"]);
    assert_eq!(report.matches.strings["api"].value(), "api_key");
}

#[test]
fn test_store_then_load_from_disk() {
    let dir = TempDir::new().unwrap();

    let first = ResolutionSession::new(fixture_corpus(), cache_config(&dir)).unwrap();
    build_graph(&first);
    let report = first.resolve_blocking().unwrap();
    assert!(!report.cache.loaded);
    assert!(dir.path().join("resolver.cache").exists());

    let stored = CacheStore::new(dir.path().join("resolver.cache"))
        .load()
        .unwrap()
        .unwrap();
    assert_eq!(stored, report.snapshot);

    let second = ResolutionSession::new(fixture_corpus(), cache_config(&dir)).unwrap();
    let (b, _) = build_graph(&second);
    let report = second.resolve_blocking().unwrap();

    assert!(report.cache.trusted);
    assert_eq!(report.cache.hits, 3);
    assert_eq!(report.evaluations, 0);
    assert_eq!(b.value(), Some(TypeEntity::new("a.B")));
}

#[test]
fn test_empty_parameter_list_survives_the_cache() {
    let dir = TempDir::new().unwrap();
    let keyed_params = |session: &ResolutionSession| {
        let run = session.exact_method("La/A;->run()V").unwrap();
        let params = run.parameter_types();
        params.set_key("params").unwrap();
        params
    };

    let first = ResolutionSession::new(fixture_corpus(), cache_config(&dir)).unwrap();
    build_graph(&first);
    let params = keyed_params(&first);
    let report = first.resolve_blocking().unwrap();
    assert_eq!(params.state(), CellState::Matched);
    assert!(report.snapshot.collections["params"].identifiers.is_empty());

    let second = ResolutionSession::new(fixture_corpus(), cache_config(&dir)).unwrap();
    build_graph(&second);
    let params = keyed_params(&second);
    let report = second.resolve_blocking().unwrap();

    assert!(report.cache.loaded);
    assert!(report.cache.trusted);
    assert_eq!(report.cache.hits, 4);
    assert!(report.cache.dropped.is_empty());
    assert_eq!(report.evaluations, 0);
    assert!(report
        .diagnostics
        .iter()
        .all(|d| d.kind != ErrorKind::CacheCorrupt));
    assert_eq!(params.value().map(|p| p.len()), Some(0));
    assert!(report.matches.collections["params"].is_empty());
}

#[test]
fn test_modified_corpus_is_not_trusted() {
    let old = Arc::new(ShardedCorpus::new({
        let mut provider = fixture_provider();
        provider.set_modified_ns(Some(1));
        provider
    }));
    let session = ResolutionSession::new(old, fixture_config()).unwrap();
    build_graph(&session);
    let snapshot = session.resolve_blocking().unwrap().snapshot;
    assert_eq!(snapshot.metadata.corpus_modified_ns, Some(1));

    let mut provider = fixture_provider();
    provider.set_modified_ns(Some(2));
    let session = ResolutionSession::new(Arc::new(ShardedCorpus::new(provider)), fixture_config()).unwrap();
    session.use_snapshot(snapshot);
    let (b, _) = build_graph(&session);

    let report = session.resolve_blocking().unwrap();

    assert!(report.cache.loaded);
    assert!(!report.cache.trusted);
    assert_eq!(report.cache.hits, 0);
    assert!(report.evaluations > 0);
    assert_eq!(b.value(), Some(TypeEntity::new("a.B")));
}

#[test]
fn test_custom_validator_can_reject() {
    let snapshot = live_snapshot();
    let mut session = ResolutionSession::new(fixture_corpus(), fixture_config()).unwrap();
    session.set_cache_validator(|_, _| false);
    session.use_snapshot(snapshot);
    build_graph(&session);

    let report = session.resolve_blocking().unwrap();

    assert!(!report.cache.trusted);
    assert!(report.evaluations > 0);
}

#[test]
fn test_unknown_and_unresolvable_keys_are_dropped() {
    let mut snapshot = live_snapshot();
    snapshot.insert_single("orphan", &Entity::Type(TypeEntity::new("a.A")));

    let shrunk: Arc<dyn EntityCorpus> = Arc::new(ShardedCorpus::new(
        MemoryProvider::builder()
            .shard(fixture_types().into_iter().filter(|t| &*t.name != "a.B").collect())
            .strings(STRINGS)
            .build(),
    ));
    let mut session = ResolutionSession::new(shrunk, fixture_config()).unwrap();
    session.set_cache_validator(|_, _| true);
    session.use_snapshot(snapshot);
    let (b, runs) = build_graph(&session);

    let report = session.resolve_blocking().unwrap();

    let dropped: Vec<&str> = report.cache.dropped.iter().map(|(k, _)| k.as_str()).collect();
    assert!(dropped.contains(&"orphan"));
    assert!(dropped.contains(&"type.b"));
    assert!(dropped.contains(&"runs"));
    assert_eq!(report.cache.hits, 1);

    assert_eq!(b.state(), CellState::Missed);
    assert_eq!(runs.state(), CellState::Missed);
    assert_eq!(report.matches.strings["api"].value(), "api_key");
}

#[test]
fn test_corrupt_cache_file_falls_back_to_live() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("resolver.cache"), b"definitely not bincode").unwrap();

    let session = ResolutionSession::new(fixture_corpus(), cache_config(&dir)).unwrap();
    let (b, _) = build_graph(&session);
    let report = session.resolve_blocking().unwrap();

    assert!(!report.cache.loaded);
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.kind == ErrorKind::CacheCorrupt));
    assert_eq!(b.value(), Some(TypeEntity::new("a.B")));

    // the live result replaced the corrupt file
    let stored = CacheStore::new(dir.path().join("resolver.cache")).load().unwrap();
    assert_eq!(stored.map(|s| s.len()), Some(3));
}
