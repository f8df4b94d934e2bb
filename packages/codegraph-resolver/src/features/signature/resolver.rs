//! Signature → entity resolution with a weak cache
//!
//! Positive results are cached as `Weak` references, so an entity is only
//! kept alive by its callers. Negative results are cached as sentinels so a
//! repeated failing lookup never touches the corpus again.

use super::parser::{parse, MemberSignature, SignatureShape};
use crate::errors::{ResolverError, ResolverResult};
use crate::features::corpus::EntityCorpus;
use crate::shared::models::{
    ConstructorEntity, Entity, FieldEntity, MethodEntity, TypeDetail, TypeEntity,
};
use crate::shared::utils::descriptor::normalize_type_name;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

enum Cached {
    Found(Weak<Entity>),
    Missing,
}

pub struct SignatureResolver {
    corpus: Arc<dyn EntityCorpus>,
    cache: Mutex<HashMap<String, Cached>>,
}

impl SignatureResolver {
    pub fn new(corpus: Arc<dyn EntityCorpus>) -> Self {
        Self {
            corpus,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a field, method or constructor signature
    pub fn resolve(&self, signature: &str) -> ResolverResult<Arc<Entity>> {
        match self.cache.lock().get(signature) {
            Some(Cached::Found(weak)) => {
                if let Some(entity) = weak.upgrade() {
                    return Ok(entity);
                }
            }
            Some(Cached::Missing) => return Err(ResolverError::not_found(signature)),
            None => {}
        }

        let parsed = parse(signature)?;
        let found = self.lookup(&parsed)?;
        let mut cache = self.cache.lock();
        match found {
            Some(entity) => {
                let entity = Arc::new(entity);
                cache.insert(signature.to_string(), Cached::Found(Arc::downgrade(&entity)));
                Ok(entity)
            }
            None => {
                tracing::debug!(signature, "signature not found; caching negative result");
                cache.insert(signature.to_string(), Cached::Missing);
                Err(ResolverError::not_found(signature))
            }
        }
    }

    pub fn resolve_field(&self, signature: &str) -> ResolverResult<FieldEntity> {
        match &*self.resolve(signature)? {
            Entity::Field(field) => Ok(field.clone()),
            other => Err(wrong_kind(signature, other)),
        }
    }

    pub fn resolve_method(&self, signature: &str) -> ResolverResult<MethodEntity> {
        match &*self.resolve(signature)? {
            Entity::Method(method) => Ok(method.clone()),
            other => Err(wrong_kind(signature, other)),
        }
    }

    pub fn resolve_constructor(&self, signature: &str) -> ResolverResult<ConstructorEntity> {
        match &*self.resolve(signature)? {
            Entity::Constructor(constructor) => Ok(constructor.clone()),
            other => Err(wrong_kind(signature, other)),
        }
    }

    /// Qualified name or descriptor → type handle
    pub fn resolve_type(&self, name: &str) -> ResolverResult<TypeEntity> {
        let name = normalize_type_name(name)
            .ok_or_else(|| ResolverError::invalid_signature(name, "empty type name"))?;
        self.corpus.load_type(&name)
    }

    fn lookup(&self, signature: &MemberSignature) -> ResolverResult<Option<Entity>> {
        let owner = match self.corpus.load_type(&signature.owner) {
            Ok(owner) => owner,
            Err(ResolverError::EntityNotFound { .. }) => return Ok(None),
            Err(err) => return Err(err),
        };
        let detail = self.corpus.structural_detail(&owner)?;
        Ok(find_member(&detail, signature))
    }
}

fn same_names(declared: &[Arc<str>], wanted: &[String]) -> bool {
    declared.len() == wanted.len() && declared.iter().zip(wanted).all(|(d, w)| &**d == w)
}

fn find_member(detail: &TypeDetail, signature: &MemberSignature) -> Option<Entity> {
    match &signature.shape {
        SignatureShape::Field { field_type } => detail
            .fields
            .iter()
            .find(|f| {
                *f.name == *signature.name
                    && field_type.as_deref().map_or(true, |t| *f.field_type == *t)
            })
            .cloned()
            .map(Entity::Field),
        SignatureShape::Executable { parameters, .. } if signature.is_constructor() => detail
            .constructors
            .iter()
            .find(|c| same_names(&c.parameters, parameters))
            .cloned()
            .map(Entity::Constructor),
        SignatureShape::Executable {
            parameters,
            return_type,
        } => detail
            .methods
            .iter()
            .find(|m| {
                *m.name == *signature.name
                    && same_names(&m.parameters, parameters)
                    && return_type.as_deref().map_or(true, |t| *m.return_type == *t)
            })
            .cloned()
            .map(Entity::Method),
    }
}

fn wrong_kind(signature: &str, entity: &Entity) -> ResolverError {
    ResolverError::invalid_signature(signature, format!("resolves to a {}", entity.kind()))
}

impl std::fmt::Debug for SignatureResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureResolver")
            .field("cached", &self.cache.lock().len())
            .finish()
    }
}
