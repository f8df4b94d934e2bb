//! Criteria feature
//!
//! Declarative descriptions of wanted entities. A criteria is plain
//! configuration until it is handed to the session, which freezes it into a
//! scheduled node and returns its result handle.
//!
//! ```text
//! TypeCriteria ─┐
//! FieldCriteria ├─ CommonCriteria (key, modifier mask, match_first, exact, filter)
//! MethodCriteria│  + kind-specific checks, sub-criteria, set expressions
//! ...           ┘
//!        │ session.types(..) / session.first_method(..)
//!        ▼
//! CriteriaNode ──► ResultSet / ResultCell
//! ```

pub mod common;
pub mod member_criteria;
pub mod pattern;
pub mod set_expr;
pub mod string_criteria;
pub mod type_criteria;

pub use common::{CommonCriteria, Exact, Predicate};
pub use member_criteria::{
    ConstructorCriteria, DeclaringScope, ExecutableFilter, FieldCriteria, MemberScope,
    MethodCriteria,
};
pub use pattern::NamePattern;
pub use set_expr::{BinaryOp, SetExpr, SetOperand, UnaryOp};
pub use string_criteria::StringCriteria;
pub use type_criteria::TypeCriteria;

use crate::errors::ResolverResult;
use crate::features::resolution::evaluator::ScanContext;
use crate::features::resolution::lazy::Dependable;
use crate::shared::models::EntityKind;
use std::sync::Arc;

/// What a prerequisite's miss does to the dependent criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgePolicy {
    /// Named sub-criteria: the dependent settles Missed without scanning
    ForceMiss,
    /// Set-expression leaf: the miss only counts as settled
    Tolerate,
}

pub(crate) struct Prerequisite {
    pub(crate) handle: Arc<dyn Dependable>,
    pub(crate) policy: EdgePolicy,
}

impl Prerequisite {
    pub(crate) fn force_miss(handle: Arc<dyn Dependable>) -> Self {
        Self {
            handle,
            policy: EdgePolicy::ForceMiss,
        }
    }

    pub(crate) fn tolerate(handle: Arc<dyn Dependable>) -> Self {
        Self {
            handle,
            policy: EdgePolicy::Tolerate,
        }
    }

    pub(crate) fn leaves_of<E: EntityKind>(expr: &SetExpr<E>) -> impl Iterator<Item = Self> {
        expr.leaves().into_iter().map(Self::tolerate)
    }
}

/// Kind-specific half of a criteria; the evaluation loop is shared
pub(crate) trait Criteria: Send + Sync + 'static {
    type Item: EntityKind;

    fn common(&self) -> &CommonCriteria<Self::Item>;

    fn common_mut(&mut self) -> &mut CommonCriteria<Self::Item>;

    fn prerequisites(&self) -> Vec<Prerequisite>;

    /// Label stem, e.g. `types(a.*)`
    fn describe(&self) -> String;

    /// Candidate slice, in corpus order
    fn candidates<'s>(
        &'s self,
        scan: &'s ScanContext<'s>,
    ) -> ResolverResult<Box<dyn Iterator<Item = ResolverResult<Self::Item>> + 's>>;

    /// Structural checks; unset constraints are wildcards
    fn test(&self, candidate: &Self::Item, scan: &ScanContext<'_>) -> ResolverResult<bool>;
}
