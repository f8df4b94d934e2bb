//! Snapshot cache
//!
//! Persists keyed resolutions between runs so unchanged corpora skip
//! scanning entirely:
//!
//! - **Snapshot**: `{key → identifier}`, `{key → identifiers}` and validation
//!   metadata, in deterministic `BTreeMap` order
//! - **Store**: bincode file with atomic tmp + rename writes
//! - **Validity**: caller-supplied check; default compares the corpus
//!   modification time, else a Blake3 fingerprint of the name index
//! - **Bootstrap**: seed-and-record, then replay on the delivery context

pub(crate) mod bootstrap;
mod error;
mod fingerprint;
mod snapshot;
mod store;
mod validity;

pub use bootstrap::{restore_entity, SeedOutcome};
pub use error::*;
pub use fingerprint::Fingerprint;
pub use snapshot::{CacheMetadata, CacheSnapshot, CachedCollection, CachedIdentifier};
pub use store::{decode, encode, CacheStore};
pub use validity::{default_validator, default_validity, describe_corpus, CacheValidator};
