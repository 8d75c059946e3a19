use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{
    aggregate::{
        resolver::normalize_name, AggregateError, AggregateFactory, AggregateOperator,
        AggregateResolver, AggregationStep, FunctionSignature,
    },
    types::DataType,
};

/// Signatures plus the factory registered under one name.
#[derive(Clone)]
pub struct CatalogEntry {
    pub signatures: Vec<FunctionSignature>,
    pub factory: Arc<dyn AggregateFactory>,
}

/// Name -> entry map for aggregate functions with declared signatures.
///
/// Registration replaces any previous entry under the same name.
pub struct FunctionCatalog {
    case_sensitive: bool,
    entries: RwLock<IndexMap<String, CatalogEntry>>,
}

impl Default for FunctionCatalog {
    fn default() -> Self {
        Self::new(false)
    }
}

impl FunctionCatalog {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive, entries: RwLock::new(IndexMap::new()) }
    }

    /// Insert or overwrite. Always returns `true`.
    pub fn register<F: AggregateFactory + 'static>(
        &self,
        name: &str,
        signatures: Vec<FunctionSignature>,
        factory: F,
    ) -> bool {
        self.register_shared(name, signatures, Arc::new(factory))
    }

    pub fn register_shared(
        &self,
        name: &str,
        signatures: Vec<FunctionSignature>,
        factory: Arc<dyn AggregateFactory>,
    ) -> bool {
        let key = normalize_name(name, self.case_sensitive);
        let overloads = signatures.len();
        let previous = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), CatalogEntry { signatures, factory });
        if previous.is_some() {
            debug!(function = %key, overloads, "replaced aggregate function");
        } else {
            debug!(function = %key, overloads, "registered aggregate function");
        }
        true
    }

    pub fn entry(&self, name: &str) -> Option<CatalogEntry> {
        let key = normalize_name(name, self.case_sensitive);
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Signatures in registration order, `None` for unknown names.
    pub fn signatures(&self, name: &str) -> Option<Vec<FunctionSignature>> {
        self.entry(name).map(|e| e.signatures)
    }

    pub fn contains(&self, name: &str) -> bool {
        let key = normalize_name(name, self.case_sensitive);
        self.entries.read().unwrap_or_else(PoisonError::into_inner).contains_key(&key)
    }

    pub fn names(&self) -> Vec<String> {
        let mut v: Vec<_> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        v.sort();
        v
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AggregateResolver for FunctionCatalog {
    fn resolver_name(&self) -> &'static str { "catalog" }

    fn try_create(
        &self,
        name: &str,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Result<Option<AggregateOperator>, AggregateError> {
        // Lock is released before the factory runs.
        let Some(entry) = self.entry(name) else {
            return Ok(None);
        };
        trace!(function = name, %step, "catalog hit");
        entry.factory.create(step, arg_types, result_type).map(Some)
    }
}
