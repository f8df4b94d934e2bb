//! Feature modules - one vertical slice each
//!
//! - corpus/     - Entity corpus port, sorted-name index, sharded adapter
//! - criteria/   - Declarative descriptions of wanted entities
//! - resolution/ - Lazy cells, dependency tracking, fixed-point scheduler
//! - cache/      - Snapshot persistence and the two-phase bootstrap
//! - signature/  - Member signature parsing and lookup

pub mod corpus;

pub mod criteria;

pub mod resolution;

// Snapshot cache: bincode + Blake3 fingerprint, seeded before the scan starts
pub mod cache;

pub mod signature;
