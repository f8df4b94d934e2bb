//! Boolean set expressions
//!
//! Tested against a concrete candidate set, e.g. the parameter types of a
//! method or the interfaces of a type.
//!
//! ```text
//! SetExpr ::= Unary(op, operand) | Binary(And|Or, operand, operand)
//! operand ::= cell              (membership)
//!           | ∀ set             (every element is a member)
//!           | ∃ set             (at least one element is a member)
//!           | (SetExpr)
//! ```
//!
//! Operands are other results of the same session, so an expression is also
//! a list of prerequisites. A leaf that misses only reads as "not a member".

use crate::features::resolution::lazy::Dependable;
use crate::features::resolution::{ResultCell, ResultSet};
use crate::shared::models::EntityKind;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Identity,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
}

#[derive(Clone)]
pub enum SetOperand<E: EntityKind> {
    Entity(ResultCell<E>),
    /// ∀: conjunction over a resolved collection
    All(ResultSet<E>),
    /// ∃: disjunction over a resolved collection
    Any(ResultSet<E>),
    Nested(Box<SetExpr<E>>),
}

#[derive(Clone)]
pub enum SetExpr<E: EntityKind> {
    Unary {
        op: UnaryOp,
        operand: SetOperand<E>,
    },
    Binary {
        op: BinaryOp,
        left: SetOperand<E>,
        right: SetOperand<E>,
    },
}

impl<E: EntityKind> SetOperand<E> {
    fn test(&self, set: &HashSet<E>) -> bool {
        match self {
            Self::Entity(cell) => cell.value().map_or(false, |value| set.contains(&value)),
            Self::All(values) => values
                .value()
                .map_or(false, |values| values.iter().all(|v| set.contains(v))),
            Self::Any(values) => values
                .value()
                .map_or(false, |values| values.iter().any(|v| set.contains(v))),
            Self::Nested(expr) => expr.test(set),
        }
    }

    fn collect_leaves(&self, out: &mut Vec<Arc<dyn Dependable>>) {
        match self {
            Self::Entity(cell) => out.push(cell.dependable()),
            Self::All(values) | Self::Any(values) => out.push(values.dependable()),
            Self::Nested(expr) => expr.collect_leaves(out),
        }
    }
}

impl<E: EntityKind> From<SetExpr<E>> for SetOperand<E> {
    fn from(expr: SetExpr<E>) -> Self {
        SetOperand::Nested(Box::new(expr))
    }
}

impl<E: EntityKind> SetExpr<E> {
    pub fn unary(op: UnaryOp, operand: impl Into<SetOperand<E>>) -> Self {
        Self::Unary {
            op,
            operand: operand.into(),
        }
    }

    pub fn and(self, other: impl Into<SetOperand<E>>) -> Self {
        Self::Binary {
            op: BinaryOp::And,
            left: self.into(),
            right: other.into(),
        }
    }

    pub fn or(self, other: impl Into<SetOperand<E>>) -> Self {
        Self::Binary {
            op: BinaryOp::Or,
            left: self.into(),
            right: other.into(),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::unary(UnaryOp::Not, self)
    }

    /// Evaluate against `set`; `And` and `Or` short-circuit left to right
    pub fn test(&self, set: &HashSet<E>) -> bool {
        match self {
            Self::Unary { op, operand } => {
                let member = operand.test(set);
                match op {
                    UnaryOp::Identity => member,
                    UnaryOp::Not => !member,
                }
            }
            Self::Binary { op, left, right } => match op {
                BinaryOp::And => left.test(set) && right.test(set),
                BinaryOp::Or => left.test(set) || right.test(set),
            },
        }
    }

    pub(crate) fn leaves(&self) -> Vec<Arc<dyn Dependable>> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<Arc<dyn Dependable>>) {
        match self {
            Self::Unary { operand, .. } => operand.collect_leaves(out),
            Self::Binary { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }
}

impl<E: EntityKind> ResultCell<E> {
    /// Expression holding when this cell's value is in the tested set
    pub fn observe(&self) -> SetExpr<E> {
        SetExpr::unary(UnaryOp::Identity, SetOperand::Entity(self.clone()))
    }

    /// Expression holding when this cell's value is *not* in the tested set
    ///
    /// Same as `observe().not()`, without the extra nesting level.
    pub fn reverse(&self) -> SetExpr<E> {
        SetExpr::unary(UnaryOp::Not, SetOperand::Entity(self.clone()))
    }
}

impl<E: EntityKind> ResultSet<E> {
    /// ∀: every resolved element is in the tested set
    pub fn conjunction(&self) -> SetExpr<E> {
        SetExpr::unary(UnaryOp::Identity, SetOperand::All(self.clone()))
    }

    /// ∃: at least one resolved element is in the tested set
    pub fn disjunction(&self) -> SetExpr<E> {
        SetExpr::unary(UnaryOp::Identity, SetOperand::Any(self.clone()))
    }
}

impl<E: EntityKind> std::fmt::Debug for SetExpr<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unary { op, .. } => write!(f, "{:?}(..)", op),
            Self::Binary { op, .. } => write!(f, "{:?}(.., ..)", op),
        }
    }
}
