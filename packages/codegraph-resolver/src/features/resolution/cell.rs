//! Public result handles
//!
//! [`ResultCell`] holds one entity, [`ResultSet`] an ordered collection. Both
//! are cheap clones of a shared lazy core; a handle never owns the value
//! exclusively.
//!
//! Attaching a consumer (callback, key, join barrier) is what makes a result
//! demanded. Results nobody consumes are never evaluated.

use super::lazy::{CellState, Dependable, Lazy, Observer};
use super::registry::{KeyedCell, KeyedSet};
use crate::errors::ResolverResult;
use crate::shared::models::{EntityKind, Executable, FieldEntity, Member, MethodEntity, TypeEntity};
use std::fmt;
use std::sync::Arc;

/// Lazily settled single entity
pub struct ResultCell<E: EntityKind> {
    inner: Arc<Lazy<E>>,
}

/// Lazily settled ordered entity collection
///
/// A criteria that finds zero candidates settles as a miss. Structural
/// derivations ([`ResultCell::parameter_types`], session `interfaces`) read a
/// matched entity's own lists and match empty when the list is empty.
pub struct ResultSet<E: EntityKind> {
    inner: Arc<Lazy<Arc<[E]>>>,
}

impl<E: EntityKind> Clone for ResultCell<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: EntityKind> Clone for ResultSet<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: EntityKind> ResultCell<E> {
    pub(crate) fn from_lazy(inner: Arc<Lazy<E>>) -> Self {
        Self { inner }
    }

    pub(crate) fn lazy(&self) -> &Arc<Lazy<E>> {
        &self.inner
    }

    pub(crate) fn dependable(&self) -> Arc<dyn Dependable> {
        self.inner.clone()
    }

    /// Session-unique label, `<description>#<id>`
    pub fn label(&self) -> &str {
        self.inner.label()
    }

    pub fn state(&self) -> CellState {
        self.inner.state()
    }

    pub fn value(&self) -> Option<E> {
        self.inner.value()
    }

    pub fn is_demanded(&self) -> bool {
        self.inner.is_demanded()
    }

    /// Run `callback` on the delivery context once this matches
    pub fn on_match(&self, callback: impl FnOnce(&E) + Send + 'static) -> &Self {
        self.inner.subscribe_now(Observer::Match(Box::new(callback)));
        self.inner.request();
        self
    }

    /// Run `callback` on the delivery context once this misses
    pub fn on_miss(&self, callback: impl FnOnce() + Send + 'static) -> &Self {
        self.inner.subscribe_now(Observer::Miss(Box::new(callback)));
        self.inner.request();
        self
    }

    /// Substitute `fallback` if this misses
    ///
    /// Fallbacks are consulted in the order they were added.
    pub fn or_else(&self, fallback: &ResultCell<E>) -> &Self {
        self.inner.push_fallback(fallback.inner.clone());
        self
    }

    /// Publish the result under `key` in the report and the cache snapshot
    pub fn set_key(&self, key: impl Into<String>) -> ResolverResult<()> {
        self.inner
            .ctx()
            .keys
            .register(key.into(), Arc::new(KeyedCell(self.inner.clone())))?;
        self.inner.request();
        Ok(())
    }
}

impl<E: Member> ResultCell<E> {
    pub fn declaring_type(&self) -> ResultCell<TypeEntity> {
        let label = format!("declaring_type({})", self.label());
        ResultCell::from_lazy(self.inner.derive(label, |member: &E| Ok(Some(member.declaring_type()))))
    }
}

impl<E: Executable> ResultCell<E> {
    /// Parameter types in declaration order; matches empty for `()`
    pub fn parameter_types(&self) -> ResultSet<TypeEntity> {
        let label = format!("parameter_types({})", self.label());
        ResultSet::from_lazy(self.inner.derive(label, |executable: &E| {
            let types: Vec<TypeEntity> = executable
                .parameters()
                .iter()
                .map(|p| TypeEntity::new(p.clone()))
                .collect();
            Ok(Some(Arc::from(types)))
        }))
    }
}

impl ResultCell<TypeEntity> {
    /// One-dimensional array of this type, e.g. `a.B` to `a.B[]`
    pub fn array_type(&self) -> ResultCell<TypeEntity> {
        let label = format!("array_type({})", self.label());
        ResultCell::from_lazy(self.inner.derive(label, |ty: &TypeEntity| {
            Ok(Some(TypeEntity::new(format!("{}[]", ty.name()))))
        }))
    }
}

impl ResultCell<FieldEntity> {
    pub fn field_type(&self) -> ResultCell<TypeEntity> {
        let label = format!("field_type({})", self.label());
        ResultCell::from_lazy(self.inner.derive(label, |field: &FieldEntity| {
            Ok(Some(TypeEntity::new(field.field_type.clone())))
        }))
    }
}

impl ResultCell<MethodEntity> {
    pub fn return_type(&self) -> ResultCell<TypeEntity> {
        let label = format!("return_type({})", self.label());
        ResultCell::from_lazy(self.inner.derive(label, |method: &MethodEntity| {
            Ok(Some(TypeEntity::new(method.return_type.clone())))
        }))
    }
}

impl<E: EntityKind> ResultSet<E> {
    pub(crate) fn from_lazy(inner: Arc<Lazy<Arc<[E]>>>) -> Self {
        Self { inner }
    }

    pub(crate) fn lazy(&self) -> &Arc<Lazy<Arc<[E]>>> {
        &self.inner
    }

    pub(crate) fn dependable(&self) -> Arc<dyn Dependable> {
        self.inner.clone()
    }

    pub fn label(&self) -> &str {
        self.inner.label()
    }

    pub fn state(&self) -> CellState {
        self.inner.state()
    }

    pub fn value(&self) -> Option<Arc<[E]>> {
        self.inner.value()
    }

    pub fn is_demanded(&self) -> bool {
        self.inner.is_demanded()
    }

    pub fn on_match(&self, callback: impl FnOnce(&[E]) + Send + 'static) -> &Self {
        self.inner
            .subscribe_now(Observer::Match(Box::new(move |values: &Arc<[E]>| {
                callback(values)
            })));
        self.inner.request();
        self
    }

    pub fn on_miss(&self, callback: impl FnOnce() + Send + 'static) -> &Self {
        self.inner.subscribe_now(Observer::Miss(Box::new(callback)));
        self.inner.request();
        self
    }

    pub fn or_else(&self, fallback: &ResultSet<E>) -> &Self {
        self.inner.push_fallback(fallback.inner.clone());
        self
    }

    pub fn set_key(&self, key: impl Into<String>) -> ResolverResult<()> {
        self.inner
            .ctx()
            .keys
            .register(key.into(), Arc::new(KeyedSet(self.inner.clone())))?;
        self.inner.request();
        Ok(())
    }

    /// First element in corpus order
    pub fn first(&self) -> ResultCell<E> {
        let label = format!("first({})", self.label());
        ResultCell::from_lazy(
            self.inner
                .derive(label, |values: &Arc<[E]>| Ok(values.first().cloned())),
        )
    }
}

impl<E: Member> ResultSet<E> {
    /// Distinct declaring types, in first-seen order
    pub fn declaring_types(&self) -> ResultSet<TypeEntity> {
        let label = format!("declaring_types({})", self.label());
        ResultSet::from_lazy(self.inner.derive(label, |members: &Arc<[E]>| {
            let mut types: Vec<TypeEntity> = Vec::new();
            for member in members.iter() {
                let ty = member.declaring_type();
                if !types.contains(&ty) {
                    types.push(ty);
                }
            }
            Ok(Some(Arc::from(types)))
        }))
    }
}

impl<E: EntityKind> fmt::Debug for ResultCell<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCell")
            .field("label", &self.label())
            .field("state", &self.state())
            .finish()
    }
}

impl<E: EntityKind> fmt::Debug for ResultSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("label", &self.label())
            .field("state", &self.state())
            .finish()
    }
}
