//! Field, method and constructor criteria
//!
//! Member criteria never scan the whole corpus on their own: they need a
//! declaring-type constraint ([`MemberScope`]) unless the session runs in
//! exhaustive member-scan mode. Without one, evaluation reports
//! `UnboundedQuery` and the criteria misses.

use super::common::{criteria_setters, flag_setters, modifier_setters, CommonCriteria, Exact};
use super::pattern::NamePattern;
use super::set_expr::SetExpr;
use super::{Criteria, Prerequisite};
use crate::errors::{ResolverError, ResolverResult};
use crate::features::resolution::evaluator::ScanContext;
use crate::features::resolution::{ResultCell, ResultSet};
use crate::shared::models::{
    ConstructorEntity, FieldEntity, Member, MethodEntity, TypeDetail, TypeEntity,
};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Where declaring types come from
#[derive(Clone)]
pub enum DeclaringScope {
    Type(ResultCell<TypeEntity>),
    AnyOf(ResultSet<TypeEntity>),
}

/// Declaring-type constraint of a member criteria
#[derive(Clone, Default)]
pub struct MemberScope {
    declaring: Option<DeclaringScope>,
    include_super: bool,
    include_interfaces: bool,
}

impl MemberScope {
    fn prerequisite(&self) -> Option<Prerequisite> {
        match &self.declaring {
            Some(DeclaringScope::Type(cell)) => Some(Prerequisite::force_miss(cell.dependable())),
            Some(DeclaringScope::AnyOf(set)) => Some(Prerequisite::force_miss(set.dependable())),
            None => None,
        }
    }

    fn describe(&self) -> String {
        let mut out = match &self.declaring {
            Some(DeclaringScope::Type(cell)) => format!("in {}", cell.label()),
            Some(DeclaringScope::AnyOf(set)) => format!("in any {}", set.label()),
            None => "in *".to_string(),
        };
        if self.include_super {
            out.push_str(" +super");
        }
        if self.include_interfaces {
            out.push_str(" +interfaces");
        }
        out
    }

    /// Declaring types to scan, in scan order
    fn types(&self, scan: &ScanContext<'_>, label: &str) -> ResolverResult<Vec<TypeEntity>> {
        let roots: Vec<TypeEntity> = match &self.declaring {
            Some(DeclaringScope::Type(cell)) => cell.value().into_iter().collect(),
            Some(DeclaringScope::AnyOf(set)) => {
                set.value().map(|types| types.to_vec()).unwrap_or_default()
            }
            None if scan.exhaustive_members => {
                return Ok(scan
                    .corpus
                    .sorted_names()
                    .iter()
                    .map(|name| TypeEntity::new(name.clone()))
                    .collect());
            }
            None => return Err(ResolverError::unbounded(label)),
        };

        if !self.include_super && !self.include_interfaces {
            return Ok(roots);
        }

        let mut seen: HashSet<TypeEntity> = roots.iter().cloned().collect();
        let mut queue: VecDeque<TypeEntity> = roots.iter().cloned().collect();
        let mut ordered = roots;
        while let Some(ty) = queue.pop_front() {
            let detail = scan.corpus.structural_detail(&ty)?;
            for next in self.related(&detail) {
                if scan.corpus.contains(next) {
                    let next = TypeEntity::new(next.clone());
                    if seen.insert(next.clone()) {
                        ordered.push(next.clone());
                        queue.push_back(next);
                    }
                }
            }
        }
        Ok(ordered)
    }

    fn related<'d>(&self, detail: &'d TypeDetail) -> Vec<&'d Arc<str>> {
        let mut related = Vec::new();
        if self.include_super {
            related.extend(detail.super_type.iter());
        }
        if self.include_interfaces {
            related.extend(detail.interfaces.iter());
        }
        related
    }

    /// Whether a pre-bound member lies inside the scope
    fn admits(&self, member: &impl Member, scan: &ScanContext<'_>, label: &str) -> ResolverResult<bool> {
        if self.declaring.is_none() {
            return Ok(true);
        }
        let declaring = member.declaring_type();
        Ok(self.types(scan, label)?.contains(&declaring))
    }
}

/// Members of every scoped type, pulled lazily type by type
fn members_of<'s, M: Clone + 's>(
    scan: &'s ScanContext<'s>,
    types: Vec<TypeEntity>,
    select: fn(&TypeDetail) -> &[M],
) -> Box<dyn Iterator<Item = ResolverResult<M>> + 's> {
    Box::new(types.into_iter().flat_map(move |ty| {
        match scan.corpus.structural_detail(&ty) {
            Ok(detail) => select(&detail).iter().cloned().map(Ok).collect::<Vec<_>>(),
            Err(err) => vec![Err(err)],
        }
    }))
}

fn is_exact<E>(exact: &Exact<E>) -> bool {
    matches!(exact, Exact::Bound(_))
}

fn same_type(cell: &ResultCell<TypeEntity>, name: &str) -> bool {
    cell.value().map_or(false, |ty| ty.name() == name)
}

/// Parameter constraints shared by methods and constructors
#[derive(Clone, Default)]
pub struct ExecutableFilter {
    parameter_count: Option<usize>,
    parameters: Option<Vec<ResultCell<TypeEntity>>>,
    parameter_at: Vec<(usize, ResultCell<TypeEntity>)>,
    parameter_types: Option<SetExpr<TypeEntity>>,
}

impl ExecutableFilter {
    fn prerequisites(&self) -> Vec<Prerequisite> {
        let mut prerequisites: Vec<Prerequisite> = self
            .parameters
            .iter()
            .flatten()
            .chain(self.parameter_at.iter().map(|(_, cell)| cell))
            .map(|cell| Prerequisite::force_miss(cell.dependable()))
            .collect();
        if let Some(expr) = &self.parameter_types {
            prerequisites.extend(Prerequisite::leaves_of(expr));
        }
        prerequisites
    }

    fn test(&self, parameters: &[Arc<str>]) -> bool {
        if let Some(count) = self.parameter_count {
            if parameters.len() != count {
                return false;
            }
        }
        if let Some(expected) = &self.parameters {
            if expected.len() != parameters.len()
                || !expected
                    .iter()
                    .zip(parameters)
                    .all(|(cell, actual)| same_type(cell, actual))
            {
                return false;
            }
        }
        let positional = self.parameter_at.iter().all(|(index, cell)| {
            parameters
                .get(*index)
                .map_or(false, |actual| same_type(cell, actual))
        });
        if !positional {
            return false;
        }
        if let Some(expr) = &self.parameter_types {
            let types: HashSet<TypeEntity> = parameters
                .iter()
                .map(|p| TypeEntity::new(p.clone()))
                .collect();
            if !expr.test(&types) {
                return false;
            }
        }
        true
    }
}

/// Setters for the member scope and executable filter
macro_rules! scope_setters {
    () => {
        /// Members declared by the value of `declaring`
        pub fn declared_by(mut self, declaring: &ResultCell<TypeEntity>) -> Self {
            self.scope.declaring = Some(DeclaringScope::Type(declaring.clone()));
            self
        }

        /// Members declared by any type of `declaring`
        pub fn declared_by_any(mut self, declaring: &ResultSet<TypeEntity>) -> Self {
            self.scope.declaring = Some(DeclaringScope::AnyOf(declaring.clone()));
            self
        }

        /// Also scan the supertype chain of the declaring types
        pub fn include_super(mut self, include: bool) -> Self {
            self.scope.include_super = include;
            self
        }

        pub fn include_interfaces(mut self, include: bool) -> Self {
            self.scope.include_interfaces = include;
            self
        }
    };
}

macro_rules! executable_setters {
    () => {
        pub fn parameter_count(mut self, count: usize) -> Self {
            self.executable.parameter_count = Some(count);
            self
        }

        /// Exact parameter list, one resolved type per position
        pub fn parameters(mut self, parameters: &[ResultCell<TypeEntity>]) -> Self {
            self.executable.parameters = Some(parameters.to_vec());
            self
        }

        /// Parameter at `index` (zero-based) must be the value of `ty`
        pub fn parameter(mut self, index: usize, ty: &ResultCell<TypeEntity>) -> Self {
            self.executable.parameter_at.push((index, ty.clone()));
            self
        }

        /// Expression over the set of parameter types
        pub fn parameter_types(mut self, expr: SetExpr<TypeEntity>) -> Self {
            self.executable.parameter_types = Some(expr);
            self
        }
    };
}

#[derive(Default)]
pub struct FieldCriteria {
    common: CommonCriteria<FieldEntity>,
    scope: MemberScope,
    name: Option<NamePattern>,
    field_type: Option<ResultCell<TypeEntity>>,
}

impl FieldCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    criteria_setters!(FieldEntity);
    modifier_setters!();
    scope_setters!();
    flag_setters! {
        is_static => STATIC,
        is_final => FINAL,
        is_transient => TRANSIENT,
        is_volatile => VOLATILE,
        is_synthetic => SYNTHETIC,
    }

    pub fn name(mut self, pattern: NamePattern) -> Self {
        self.name = Some(pattern);
        self
    }

    pub fn field_type(mut self, field_type: &ResultCell<TypeEntity>) -> Self {
        self.field_type = Some(field_type.clone());
        self
    }
}

impl Criteria for FieldCriteria {
    type Item = FieldEntity;

    fn common(&self) -> &CommonCriteria<FieldEntity> {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonCriteria<FieldEntity> {
        &mut self.common
    }

    fn prerequisites(&self) -> Vec<Prerequisite> {
        self.scope
            .prerequisite()
            .into_iter()
            .chain(
                self.field_type
                    .iter()
                    .map(|cell| Prerequisite::force_miss(cell.dependable())),
            )
            .collect()
    }

    fn describe(&self) -> String {
        let name = self
            .name
            .as_ref()
            .map_or_else(|| "*".to_string(), ToString::to_string);
        format!("fields({} {}){}", name, self.scope.describe(), self.common.describe())
    }

    fn candidates<'s>(
        &'s self,
        scan: &'s ScanContext<'s>,
    ) -> ResolverResult<Box<dyn Iterator<Item = ResolverResult<FieldEntity>> + 's>> {
        let types = self.scope.types(scan, &self.describe())?;
        Ok(members_of(scan, types, |detail| detail.fields.as_slice()))
    }

    fn test(&self, field: &FieldEntity, scan: &ScanContext<'_>) -> ResolverResult<bool> {
        if let Some(pattern) = &self.name {
            if !pattern.matches(&field.name) {
                return Ok(false);
            }
        }
        if !self.common.mask.matches(field.modifiers) {
            return Ok(false);
        }
        if let Some(field_type) = &self.field_type {
            if !same_type(field_type, &field.field_type) {
                return Ok(false);
            }
        }
        if is_exact(&self.common.exact) {
            return self.scope.admits(field, scan, &self.describe());
        }
        Ok(true)
    }
}

#[derive(Default)]
pub struct MethodCriteria {
    common: CommonCriteria<MethodEntity>,
    scope: MemberScope,
    name: Option<NamePattern>,
    return_type: Option<ResultCell<TypeEntity>>,
    executable: ExecutableFilter,
}

impl MethodCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    criteria_setters!(MethodEntity);
    modifier_setters!();
    scope_setters!();
    executable_setters!();
    flag_setters! {
        is_static => STATIC,
        is_final => FINAL,
        is_abstract => ABSTRACT,
        is_synchronized => SYNCHRONIZED,
        is_native => NATIVE,
        is_varargs => VARARGS,
        is_synthetic => SYNTHETIC,
    }

    pub fn name(mut self, pattern: NamePattern) -> Self {
        self.name = Some(pattern);
        self
    }

    pub fn return_type(mut self, return_type: &ResultCell<TypeEntity>) -> Self {
        self.return_type = Some(return_type.clone());
        self
    }
}

impl Criteria for MethodCriteria {
    type Item = MethodEntity;

    fn common(&self) -> &CommonCriteria<MethodEntity> {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonCriteria<MethodEntity> {
        &mut self.common
    }

    fn prerequisites(&self) -> Vec<Prerequisite> {
        let mut prerequisites: Vec<Prerequisite> = self.scope.prerequisite().into_iter().collect();
        prerequisites.extend(
            self.return_type
                .iter()
                .map(|cell| Prerequisite::force_miss(cell.dependable())),
        );
        prerequisites.extend(self.executable.prerequisites());
        prerequisites
    }

    fn describe(&self) -> String {
        let name = self
            .name
            .as_ref()
            .map_or_else(|| "*".to_string(), ToString::to_string);
        format!("methods({} {}){}", name, self.scope.describe(), self.common.describe())
    }

    fn candidates<'s>(
        &'s self,
        scan: &'s ScanContext<'s>,
    ) -> ResolverResult<Box<dyn Iterator<Item = ResolverResult<MethodEntity>> + 's>> {
        let types = self.scope.types(scan, &self.describe())?;
        Ok(members_of(scan, types, |detail| detail.methods.as_slice()))
    }

    fn test(&self, method: &MethodEntity, scan: &ScanContext<'_>) -> ResolverResult<bool> {
        if let Some(pattern) = &self.name {
            if !pattern.matches(&method.name) {
                return Ok(false);
            }
        }
        if !self.common.mask.matches(method.modifiers) {
            return Ok(false);
        }
        if let Some(return_type) = &self.return_type {
            if !same_type(return_type, &method.return_type) {
                return Ok(false);
            }
        }
        if !self.executable.test(&method.parameters) {
            return Ok(false);
        }
        if is_exact(&self.common.exact) {
            return self.scope.admits(method, scan, &self.describe());
        }
        Ok(true)
    }
}

#[derive(Default)]
pub struct ConstructorCriteria {
    common: CommonCriteria<ConstructorEntity>,
    scope: MemberScope,
    executable: ExecutableFilter,
}

impl ConstructorCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    criteria_setters!(ConstructorEntity);
    modifier_setters!();
    scope_setters!();
    executable_setters!();
    flag_setters! {
        is_varargs => VARARGS,
        is_synthetic => SYNTHETIC,
    }
}

impl Criteria for ConstructorCriteria {
    type Item = ConstructorEntity;

    fn common(&self) -> &CommonCriteria<ConstructorEntity> {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonCriteria<ConstructorEntity> {
        &mut self.common
    }

    fn prerequisites(&self) -> Vec<Prerequisite> {
        let mut prerequisites: Vec<Prerequisite> = self.scope.prerequisite().into_iter().collect();
        prerequisites.extend(self.executable.prerequisites());
        prerequisites
    }

    fn describe(&self) -> String {
        format!("constructors({}){}", self.scope.describe(), self.common.describe())
    }

    fn candidates<'s>(
        &'s self,
        scan: &'s ScanContext<'s>,
    ) -> ResolverResult<Box<dyn Iterator<Item = ResolverResult<ConstructorEntity>> + 's>> {
        let types = self.scope.types(scan, &self.describe())?;
        Ok(members_of(scan, types, |detail| detail.constructors.as_slice()))
    }

    fn test(&self, constructor: &ConstructorEntity, scan: &ScanContext<'_>) -> ResolverResult<bool> {
        if !self.common.mask.matches(constructor.modifiers) {
            return Ok(false);
        }
        if !self.executable.test(&constructor.parameters) {
            return Ok(false);
        }
        if is_exact(&self.common.exact) {
            return self.scope.admits(constructor, scan, &self.describe());
        }
        Ok(true)
    }
}
