//! Name patterns

use crate::features::corpus::sorted::{exact_range, prefix_range};
use std::ops::Range;
use std::sync::Arc;

/// Constraint on an entity name (type name, member name, string value)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePattern {
    Exact(String),
    /// `first` keeps only the lowest name carrying the prefix
    Prefix { prefix: String, first: bool },
}

impl NamePattern {
    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix {
            prefix: prefix.into(),
            first: false,
        }
    }

    pub fn first_prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix {
            prefix: prefix.into(),
            first: true,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(exact) => name == exact,
            Self::Prefix { prefix, .. } => name.starts_with(prefix.as_str()),
        }
    }

    /// Candidate slice of a sorted name index, by binary search
    pub fn range(&self, names: &[Arc<str>]) -> Range<usize> {
        match self {
            Self::Exact(exact) => exact_range(names, exact),
            Self::Prefix { prefix, first } => {
                let range = prefix_range(names, prefix);
                if *first {
                    range.start..range.end.min(range.start + 1)
                } else {
                    range
                }
            }
        }
    }
}

impl std::fmt::Display for NamePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(exact) => write!(f, "{}", exact),
            Self::Prefix { prefix, first: false } => write!(f, "{}*", prefix),
            Self::Prefix { prefix, first: true } => write!(f, "{}*[0]", prefix),
        }
    }
}
