//! Corpus feature
//!
//! The enumerable collection of entities criteria are matched against.
//!
//! ```text
//! DetailProvider (shards + lazy detail)
//!        │
//!        ▼
//! ShardedCorpus ──► sorted name index (linear shard merge)
//!        │          detail memo (DashMap, filled on demand)
//!        ▼
//! EntityCorpus  ◄── consumed by the resolver
//! ```

pub mod memory;
pub mod ports;
pub mod sharded;
pub mod sorted;

pub use memory::{CorpusManifest, MemoryProvider, MemoryProviderBuilder};
pub use ports::{DetailProvider, EntityCorpus};
pub use sharded::{CorpusStats, ShardedCorpus};
