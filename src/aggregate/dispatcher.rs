use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    aggregate::{AggregateError, AggregateOperator, AggregateResolver, AggregationStep},
    types::DataType,
};

/// Ordered chain of resolvers. The first one that produces an operator wins.
#[derive(Clone, Default)]
pub struct AggregateDispatcher {
    resolvers: Vec<Arc<dyn AggregateResolver>>,
}

impl AggregateDispatcher {
    pub fn new() -> Self {
        Self { resolvers: Vec::new() }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn AggregateResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    pub fn push(&mut self, resolver: Arc<dyn AggregateResolver>) {
        self.resolvers.push(resolver);
    }

    pub fn resolver_names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.resolver_name()).collect()
    }

    /// Build a fresh operator for `name`.
    ///
    /// Resolver errors are returned as-is. When nothing matches the error is
    /// [`AggregateError::NotRegistered`] carrying `name` as given.
    pub fn create(
        &self,
        name: &str,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Result<AggregateOperator, AggregateError> {
        for (position, resolver) in self.resolvers.iter().enumerate() {
            if position > 0 {
                debug!(function = name, resolver = resolver.resolver_name(), "falling back");
            }
            if let Some(op) = resolver.try_create(name, step, arg_types, result_type)? {
                return Ok(op);
            }
        }
        warn!(function = name, %step, "aggregate function not registered");
        AggregateError::NotRegistered(name.to_string()).err()
    }
}
