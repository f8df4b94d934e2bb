//! Configuration shared by every criteria kind

use crate::shared::models::{EntityKind, ModifierMask};
use std::fmt;
use std::sync::Arc;

/// Pre-bound exact value
#[derive(Clone)]
pub enum Exact<E> {
    Unbound,
    /// Candidate set is exactly this entity
    Bound(E),
    /// An exact value was asked for but does not exist; always misses
    Unresolvable(String),
}

impl<E: fmt::Debug> fmt::Debug for Exact<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound => f.write_str("Unbound"),
            Self::Bound(value) => write!(f, "Bound({:?})", value),
            Self::Unresolvable(name) => write!(f, "Unresolvable({})", name),
        }
    }
}

pub type Predicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

pub struct CommonCriteria<E: EntityKind> {
    pub(crate) key: Option<String>,
    pub(crate) mask: ModifierMask,
    pub(crate) match_first: bool,
    pub(crate) exact: Exact<E>,
    pub(crate) predicate: Option<Predicate<E>>,
}

impl<E: EntityKind> Default for CommonCriteria<E> {
    fn default() -> Self {
        Self {
            key: None,
            mask: ModifierMask::default(),
            match_first: false,
            exact: Exact::Unbound,
            predicate: None,
        }
    }
}

impl<E: EntityKind> CommonCriteria<E> {
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn mask(&self) -> &ModifierMask {
        &self.mask
    }

    pub fn is_match_first(&self) -> bool {
        self.match_first
    }

    /// Short suffix for labels, e.g. ` first key=foo`
    pub(crate) fn describe(&self) -> String {
        let mut out = String::new();
        if self.match_first {
            out.push_str(" first");
        }
        if let Some(key) = &self.key {
            out.push_str(&format!(" key={}", key));
        }
        match &self.exact {
            Exact::Unbound => {}
            Exact::Bound(value) => out.push_str(&format!(" exact={}", value.identifier())),
            Exact::Unresolvable(name) => out.push_str(&format!(" exact={}?", name)),
        }
        out
    }
}

impl<E: EntityKind> fmt::Debug for CommonCriteria<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommonCriteria")
            .field("key", &self.key)
            .field("mask", &self.mask)
            .field("match_first", &self.match_first)
            .field("exact", &self.exact)
            .field("has_predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Builder setters every criteria kind carries
macro_rules! criteria_setters {
    ($entity:ty) => {
        /// Publish the result under `key`
        pub fn key(mut self, key: impl Into<String>) -> Self {
            self.common.key = Some(key.into());
            self
        }

        /// Stop at the first satisfying candidate
        pub fn match_first(mut self, first: bool) -> Self {
            self.common.match_first = first;
            self
        }

        /// Restrict the candidate set to one pre-bound value
        pub fn exact(mut self, exact: $crate::features::criteria::Exact<$entity>) -> Self {
            self.common.exact = exact;
            self
        }

        /// User predicate, run after every structural check
        pub fn filter(mut self, predicate: impl Fn(&$entity) -> bool + Send + Sync + 'static) -> Self {
            self.common.predicate = Some(std::sync::Arc::new(predicate));
            self
        }

        pub fn common(&self) -> &$crate::features::criteria::CommonCriteria<$entity> {
            &self.common
        }
    };
}

/// Access-modifier setters
macro_rules! modifier_setters {
    () => {
        pub fn modifiers(mut self, include: $crate::shared::models::Modifiers, exclude: $crate::shared::models::Modifiers) -> Self {
            self.common.mask.set(include, true);
            self.common.mask.set(exclude, false);
            self
        }

        pub fn is_public(mut self, public: bool) -> Self {
            self.common.mask.set($crate::shared::models::Modifiers::PUBLIC, public);
            self
        }

        pub fn is_private(mut self, private: bool) -> Self {
            self.common.mask.set($crate::shared::models::Modifiers::PRIVATE, private);
            self
        }

        pub fn is_protected(mut self, protected: bool) -> Self {
            self.common.mask.set($crate::shared::models::Modifiers::PROTECTED, protected);
            self
        }

        /// `true`: no access modifier at all; `false`: any access modifier
        pub fn is_package(mut self, package: bool) -> Self {
            self.common.mask.set_package(package);
            self
        }
    };
}

/// One boolean setter per listed modifier bit
macro_rules! flag_setters {
    ($($name:ident => $bit:ident),* $(,)?) => {
        $(
            pub fn $name(mut self, present: bool) -> Self {
                self.common.mask.set($crate::shared::models::Modifiers::$bit, present);
                self
            }
        )*
    };
}

pub(crate) use criteria_setters;
pub(crate) use flag_setters;
pub(crate) use modifier_setters;
