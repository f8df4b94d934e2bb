//! String-literal criteria
//!
//! Matched against the corpus's sorted string-literal pool with the same
//! binary range search as type names.

use super::common::{criteria_setters, CommonCriteria};
use super::pattern::NamePattern;
use super::{Criteria, Prerequisite};
use crate::errors::ResolverResult;
use crate::features::resolution::evaluator::ScanContext;
use crate::shared::models::StringEntity;

#[derive(Default)]
pub struct StringCriteria {
    common: CommonCriteria<StringEntity>,
    pattern: Option<NamePattern>,
}

impl StringCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    criteria_setters!(StringEntity);

    pub fn value(mut self, pattern: NamePattern) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

impl Criteria for StringCriteria {
    type Item = StringEntity;

    fn common(&self) -> &CommonCriteria<StringEntity> {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonCriteria<StringEntity> {
        &mut self.common
    }

    fn prerequisites(&self) -> Vec<Prerequisite> {
        Vec::new()
    }

    fn describe(&self) -> String {
        let pattern = self
            .pattern
            .as_ref()
            .map_or_else(|| "*".to_string(), ToString::to_string);
        format!("strings({}){}", pattern, self.common.describe())
    }

    fn candidates<'s>(
        &'s self,
        scan: &'s ScanContext<'s>,
    ) -> ResolverResult<Box<dyn Iterator<Item = ResolverResult<StringEntity>> + 's>> {
        let literals = scan.corpus.string_literals();
        let range = match &self.pattern {
            Some(pattern) => pattern.range(literals),
            None => 0..literals.len(),
        };
        Ok(Box::new(
            literals[range]
                .iter()
                .map(|literal| Ok(StringEntity(literal.clone()))),
        ))
    }

    fn test(&self, literal: &StringEntity, _scan: &ScanContext<'_>) -> ResolverResult<bool> {
        Ok(self
            .pattern
            .as_ref()
            .map_or(true, |pattern| pattern.matches(literal.value())))
    }
}
