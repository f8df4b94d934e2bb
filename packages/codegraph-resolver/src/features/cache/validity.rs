//! Snapshot trust check

use super::fingerprint::Fingerprint;
use super::snapshot::CacheMetadata;
use crate::features::corpus::EntityCorpus;
use std::sync::Arc;

/// Caller-supplied trust decision: `true` = seed from the snapshot
pub type CacheValidator = Arc<dyn Fn(&CacheMetadata, &dyn EntityCorpus) -> bool + Send + Sync>;

/// Build the metadata describing `corpus` as it is now
pub fn describe_corpus(corpus: &dyn EntityCorpus) -> CacheMetadata {
    CacheMetadata {
        corpus_modified_ns: corpus.last_modified_ns(),
        corpus_fingerprint: Fingerprint::of_corpus(corpus),
        extra: Default::default(),
    }
}

/// Compare the stored modification time with the corpus's
///
/// When either side has no timestamp the blake3 fingerprint decides.
pub fn default_validity(metadata: &CacheMetadata, corpus: &dyn EntityCorpus) -> bool {
    match (metadata.corpus_modified_ns, corpus.last_modified_ns()) {
        (Some(stored), Some(current)) => stored == current,
        _ => metadata
            .corpus_fingerprint
            .matches(&Fingerprint::of_corpus(corpus)),
    }
}

pub fn default_validator() -> CacheValidator {
    Arc::new(default_validity)
}
