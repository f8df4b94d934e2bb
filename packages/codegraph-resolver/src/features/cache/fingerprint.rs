//! Corpus fingerprint with Blake3 hashing

use crate::features::corpus::EntityCorpus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Blake3 digest of a corpus's sorted name index and string pool
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn compute(content: &[u8]) -> Self {
        Self(*blake3::hash(content).as_bytes())
    }

    /// Hash every type name, then every string literal
    ///
    /// Names are NUL-terminated so `["ab", "c"]` and `["a", "bc"]` differ.
    pub fn of_corpus(corpus: &dyn EntityCorpus) -> Self {
        let mut hasher = blake3::Hasher::new();
        for name in corpus.sorted_names() {
            hasher.update(name.as_bytes());
            hasher.update(&[0]);
        }
        hasher.update(&[0xff]);
        for literal in corpus.string_literals() {
            hasher.update(literal.as_bytes());
            hasher.update(&[0]);
        }
        Self(*hasher.finalize().as_bytes())
    }

    pub fn zero() -> Self {
        Self([0; 32])
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }

    pub fn matches(&self, other: &Fingerprint) -> bool {
        self.0 == other.0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}
