use crate::{aggregate::{AggregateError, AggregateOperator, AggregationStep}, types::DataType};

/// Builds operators for one registered aggregate function.
///
/// Stateless and shared between threads; every call returns a fresh operator.
/// A factory is expected to reject type combinations it cannot specialize for.
pub trait AggregateFactory: Send + Sync {
    fn create(
        &self,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Result<AggregateOperator, AggregateError>;
}

impl<F> AggregateFactory for F
where
    F: Fn(AggregationStep, &[DataType], &DataType) -> Result<AggregateOperator, AggregateError> + Send + Sync,
{
    fn create(
        &self,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Result<AggregateOperator, AggregateError> {
        self(step, arg_types, result_type)
    }
}

/// Factory shape used by the legacy registry: `None` means "no match".
pub trait LegacyAggregateFactory: Send + Sync {
    fn create(
        &self,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Option<AggregateOperator>;
}

impl<F> LegacyAggregateFactory for F
where
    F: Fn(AggregationStep, &[DataType], &DataType) -> Option<AggregateOperator> + Send + Sync,
{
    fn create(
        &self,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Option<AggregateOperator> {
        self(step, arg_types, result_type)
    }
}

/// Pins a closure to the [`AggregateFactory`] call shape so its parameter and
/// return types are inferred.
pub fn aggregate_factory<F>(f: F) -> F
where
    F: Fn(AggregationStep, &[DataType], &DataType) -> Result<AggregateOperator, AggregateError> + Send + Sync,
{
    f
}

/// Same as [`aggregate_factory`] for the legacy call shape.
pub fn legacy_factory<F>(f: F) -> F
where
    F: Fn(AggregationStep, &[DataType], &DataType) -> Option<AggregateOperator> + Send + Sync,
{
    f
}
