use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{
    aggregate::{
        resolver::normalize_name, AggregateError, AggregateOperator, AggregateResolver,
        AggregationStep, LegacyAggregateFactory,
    },
    types::DataType,
};

/// Older name -> factory table kept for implementations that never declared
/// signatures.
///
/// Several candidates may share a name; they are tried in registration order
/// and the first one that builds an operator wins.
pub struct LegacyAggregateRegistry {
    case_sensitive: bool,
    candidates: RwLock<IndexMap<String, Vec<Arc<dyn LegacyAggregateFactory>>>>,
}

impl Default for LegacyAggregateRegistry {
    fn default() -> Self {
        Self::new(false)
    }
}

impl LegacyAggregateRegistry {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive, candidates: RwLock::new(IndexMap::new()) }
    }

    pub fn register<F: LegacyAggregateFactory + 'static>(&self, name: &str, factory: F) {
        let key = normalize_name(name, self.case_sensitive);
        let mut guard = self.candidates.write().unwrap_or_else(PoisonError::into_inner);
        let list = guard.entry(key.clone()).or_default();
        list.push(Arc::new(factory));
        debug!(function = %key, candidates = list.len(), "registered legacy aggregate");
    }

    pub fn contains(&self, name: &str) -> bool {
        let key = normalize_name(name, self.case_sensitive);
        self.candidates.read().unwrap_or_else(PoisonError::into_inner).contains_key(&key)
    }

    pub fn names(&self) -> Vec<String> {
        let mut v: Vec<_> = self
            .candidates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        v.sort();
        v
    }

    /// First candidate that accepts the request, or `None`.
    pub fn create(
        &self,
        name: &str,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Option<AggregateOperator> {
        let key = normalize_name(name, self.case_sensitive);
        let candidates = self
            .candidates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()?;
        candidates
            .iter()
            .find_map(|c| c.create(step, arg_types, result_type))
    }
}

impl AggregateResolver for LegacyAggregateRegistry {
    fn resolver_name(&self) -> &'static str { "legacy" }

    fn try_create(
        &self,
        name: &str,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Result<Option<AggregateOperator>, AggregateError> {
        let op = self.create(name, step, arg_types, result_type);
        if op.is_some() {
            trace!(function = name, %step, "legacy hit");
        }
        Ok(op)
    }
}
