//! Generic criteria evaluation core
//!
//! One loop for every entity kind: pick the candidate slice, run the
//! kind-specific structural test, then the optional user predicate.

use crate::errors::{ErrorSink, ResolverError, ResolverResult};
use crate::features::corpus::EntityCorpus;
use crate::features::criteria::{Criteria, Exact};
use crate::shared::utils::panic::catch;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scan counters for one session
#[derive(Debug, Default)]
pub struct ScanStats {
    pub evaluations: AtomicUsize,
    pub candidates: AtomicUsize,
}

impl ScanStats {
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    pub fn candidates(&self) -> usize {
        self.candidates.load(Ordering::Relaxed)
    }
}

/// What an evaluation may read
pub struct ScanContext<'a> {
    pub corpus: &'a dyn EntityCorpus,
    pub errors: &'a ErrorSink,
    /// Member criteria without a declaring type scan every type
    pub exhaustive_members: bool,
    pub stats: &'a ScanStats,
}

impl ScanContext<'_> {
    /// Report a failure; `false` means stop scanning this criteria
    pub fn report(&self, error: ResolverError) -> bool {
        self.errors.report(error)
    }
}

pub(crate) fn evaluate<C: Criteria>(
    criteria: &C,
    scan: &ScanContext<'_>,
    label: &str,
) -> Vec<C::Item> {
    scan.stats.evaluations.fetch_add(1, Ordering::Relaxed);
    let common = criteria.common();

    let candidates: Box<dyn Iterator<Item = ResolverResult<C::Item>> + '_> = match &common.exact {
        Exact::Bound(value) => Box::new(std::iter::once(Ok(value.clone()))),
        Exact::Unresolvable(_) => return Vec::new(),
        Exact::Unbound => match criteria.candidates(scan) {
            Ok(candidates) => candidates,
            Err(err) => {
                scan.report(err);
                return Vec::new();
            }
        },
    };

    let mut found = Vec::new();
    for candidate in candidates {
        let candidate = match candidate {
            Ok(candidate) => candidate,
            Err(err) => {
                if scan.report(err) {
                    continue;
                }
                break;
            }
        };
        scan.stats.candidates.fetch_add(1, Ordering::Relaxed);

        match accepts(criteria, &candidate, scan, label) {
            Ok(true) => {
                found.push(candidate);
                if common.match_first {
                    break;
                }
            }
            Ok(false) => {}
            Err(err) => {
                if !scan.report(err) {
                    break;
                }
            }
        }
    }
    found
}

fn accepts<C: Criteria>(
    criteria: &C,
    candidate: &C::Item,
    scan: &ScanContext<'_>,
    label: &str,
) -> ResolverResult<bool> {
    if !criteria.test(candidate, scan)? {
        return Ok(false);
    }
    match &criteria.common().predicate {
        None => Ok(true),
        Some(predicate) => catch(|| predicate(candidate))
            .map_err(|message| ResolverError::user_callback(format!("filter of {}", label), message)),
    }
}
