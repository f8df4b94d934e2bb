//! Type criteria

use super::common::{criteria_setters, flag_setters, modifier_setters, CommonCriteria};
use super::pattern::NamePattern;
use super::set_expr::SetExpr;
use super::{Criteria, Prerequisite};
use crate::errors::ResolverResult;
use crate::features::resolution::evaluator::ScanContext;
use crate::features::resolution::{ResultCell, ResultSet};
use crate::shared::models::TypeEntity;
use std::collections::HashSet;

/// Types of the corpus, filtered by name, modifiers, supertype and interfaces
///
/// The top-level name search is a binary range search over the sorted name
/// index; every other check reads the lazily fetched structural detail.
#[derive(Default)]
pub struct TypeCriteria {
    common: CommonCriteria<TypeEntity>,
    name: Option<NamePattern>,
    super_type: Option<ResultCell<TypeEntity>>,
    interfaces: Option<SetExpr<TypeEntity>>,
    among: Option<ResultSet<TypeEntity>>,
}

impl TypeCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    criteria_setters!(TypeEntity);
    modifier_setters!();
    flag_setters! {
        is_static => STATIC,
        is_final => FINAL,
        is_abstract => ABSTRACT,
        is_interface => INTERFACE,
        is_synthetic => SYNTHETIC,
    }

    pub fn name(mut self, pattern: NamePattern) -> Self {
        self.name = Some(pattern);
        self
    }

    /// Direct supertype must be the value of `super_type`
    ///
    /// If `super_type` misses, this criteria misses without scanning.
    pub fn super_type(mut self, super_type: &ResultCell<TypeEntity>) -> Self {
        self.super_type = Some(super_type.clone());
        self
    }

    /// Expression over the set of directly implemented interfaces
    pub fn interfaces(mut self, expr: SetExpr<TypeEntity>) -> Self {
        self.interfaces = Some(expr);
        self
    }

    /// Only consider the corpus types of `types`, in their order
    ///
    /// Misses without scanning if `types` misses.
    pub fn among(mut self, types: &ResultSet<TypeEntity>) -> Self {
        self.among = Some(types.clone());
        self
    }
}

impl Criteria for TypeCriteria {
    type Item = TypeEntity;

    fn common(&self) -> &CommonCriteria<TypeEntity> {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonCriteria<TypeEntity> {
        &mut self.common
    }

    fn prerequisites(&self) -> Vec<Prerequisite> {
        let mut prerequisites: Vec<Prerequisite> = self
            .super_type
            .iter()
            .map(|cell| Prerequisite::force_miss(cell.dependable()))
            .chain(
                self.among
                    .iter()
                    .map(|set| Prerequisite::force_miss(set.dependable())),
            )
            .collect();
        if let Some(expr) = &self.interfaces {
            prerequisites.extend(Prerequisite::leaves_of(expr));
        }
        prerequisites
    }

    fn describe(&self) -> String {
        let name = self
            .name
            .as_ref()
            .map_or_else(|| "*".to_string(), ToString::to_string);
        match &self.among {
            Some(set) => format!("types({} in {}){}", name, set.label(), self.common.describe()),
            None => format!("types({}){}", name, self.common.describe()),
        }
    }

    fn candidates<'s>(
        &'s self,
        scan: &'s ScanContext<'s>,
    ) -> ResolverResult<Box<dyn Iterator<Item = ResolverResult<TypeEntity>> + 's>> {
        if let Some(set) = &self.among {
            let listed: Vec<TypeEntity> = set
                .value()
                .map(|types| types.to_vec())
                .unwrap_or_default()
                .into_iter()
                .filter(|ty| scan.corpus.contains(ty.name()))
                .collect();
            return Ok(Box::new(listed.into_iter().map(Ok)));
        }

        let names = scan.corpus.sorted_names();
        let range = match &self.name {
            Some(pattern) => pattern.range(names),
            None => 0..names.len(),
        };
        Ok(Box::new(
            names[range].iter().map(move |name| scan.corpus.load_type(name)),
        ))
    }

    fn test(&self, candidate: &TypeEntity, scan: &ScanContext<'_>) -> ResolverResult<bool> {
        if let Some(pattern) = &self.name {
            if !pattern.matches(candidate.name()) {
                return Ok(false);
            }
        }

        let detail = scan.corpus.structural_detail(candidate)?;
        if !self.common.mask.matches(detail.modifiers) {
            return Ok(false);
        }

        if let Some(super_type) = &self.super_type {
            let expected = super_type.value();
            let actual = detail.super_type.as_deref();
            if expected.as_ref().map(TypeEntity::name) != actual || actual.is_none() {
                return Ok(false);
            }
        }

        if let Some(expr) = &self.interfaces {
            let implemented: HashSet<TypeEntity> = detail
                .interfaces
                .iter()
                .map(|name| TypeEntity::new(name.clone()))
                .collect();
            if !expr.test(&implemented) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
