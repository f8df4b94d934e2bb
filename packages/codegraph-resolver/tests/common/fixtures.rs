//! Corpus fixtures
//!
//! A small three-type corpus spread over two shards:
//!
//! ```text
//! a.A  public           fields: count:int, name:java.lang.String
//!                       methods: run()void, add(int,int)int
//!                       ctors: (), (int)
//! a.B  public final     super a.A, implements a.I
//!                       methods: run()void (override), helper()void private static
//! b.C  (package)        implements a.I
//!                       fields: LIMIT:long static final
//! ```

use codegraph_resolver::config::{Preset, ResolverConfig};
use codegraph_resolver::features::corpus::{EntityCorpus, MemoryProvider, ShardedCorpus};
use codegraph_resolver::shared::models::{Modifiers, TypeDetail};
use std::sync::Arc;

pub const STRINGS: [&str; 4] = ["api_key", "api_secret", "hello", "zz_last"];

pub fn fixture_types() -> Vec<TypeDetail> {
    vec![
        TypeDetail::new("a.A")
            .with_modifiers(Modifiers::PUBLIC)
            .with_super_type("java.lang.Object")
            .with_field("count", "int", Modifiers::PRIVATE)
            .with_field("name", "java.lang.String", Modifiers::PUBLIC)
            .with_method("run", &[], "void", Modifiers::PUBLIC)
            .with_method("add", &["int", "int"], "int", Modifiers::PUBLIC | Modifiers::STATIC)
            .with_constructor(&[], Modifiers::PUBLIC)
            .with_constructor(&["int"], Modifiers::PUBLIC),
        TypeDetail::new("a.B")
            .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
            .with_super_type("a.A")
            .with_interface("a.I")
            .with_method("run", &[], "void", Modifiers::PUBLIC)
            .with_method("helper", &[], "void", Modifiers::PRIVATE | Modifiers::STATIC),
        TypeDetail::new("b.C")
            .with_interface("a.I")
            .with_field("LIMIT", "long", Modifiers::STATIC | Modifiers::FINAL),
    ]
}

pub fn fixture_provider() -> MemoryProvider {
    let mut types = fixture_types();
    let c = types.pop().map(|c| vec![c]).unwrap_or_default();
    MemoryProvider::builder()
        .shard(types)
        .shard(c)
        .strings(STRINGS[..2].iter().copied())
        .strings(STRINGS[2..].iter().copied())
        .build()
}

pub fn fixture_sharded() -> Arc<ShardedCorpus<MemoryProvider>> {
    Arc::new(ShardedCorpus::new(fixture_provider()))
}

pub fn fixture_corpus() -> Arc<dyn EntityCorpus> {
    fixture_sharded()
}

/// Fast preset, small pools, no cache file
pub fn fixture_config() -> ResolverConfig {
    let mut config = ResolverConfig::from_preset(Preset::Fast);
    config.scan.worker_threads = 2;
    config.delivery.threads = 1;
    config
}

/// Corpus of `n` generated types `pkgN.TypeM`, spread over `shards` shards
pub fn fixture_large_provider(n: usize, shards: usize) -> MemoryProvider {
    let shards = shards.max(1);
    let mut buckets: Vec<Vec<TypeDetail>> = vec![Vec::new(); shards];
    for i in 0..n {
        let name = format!("pkg{}.Type{:05}", i % 7, i);
        let modifiers = if i % 3 == 0 {
            Modifiers::PUBLIC
        } else {
            Modifiers::NONE
        };
        buckets[i % shards].push(TypeDetail::new(name).with_modifiers(modifiers));
    }
    buckets
        .into_iter()
        .fold(MemoryProvider::builder(), |builder, shard| builder.shard(shard))
        .build()
}
