pub mod count_impl;
pub use count_impl::*;

pub mod sum_impl;
pub use sum_impl::*;

pub mod avg_impl;
pub use avg_impl::*;

pub mod minmax_impl;
pub use minmax_impl::*;

use crate::{
    aggregate::{AggregateError, AggregateFactory, AggregationStep, Bindings, FunctionCatalog, FunctionSignature},
    types::DataType,
};

/// A built-in aggregate: canonical name, declared overloads, and the factory itself.
pub trait BuiltinAggregate: AggregateFactory {
    /// Canonical lowercase function name ("count", "sum", ...).
    fn name(&self) -> &'static str;

    fn signatures(&self) -> Vec<FunctionSignature>;
}

pub fn register_builtin<B: BuiltinAggregate + 'static>(catalog: &FunctionCatalog, builtin: B) -> bool {
    catalog.register(builtin.name(), builtin.signatures(), builtin)
}

pub fn register_builtin_aggregates(catalog: &FunctionCatalog) {
    register_builtin(catalog, CountImpl);
    register_builtin(catalog, SumImpl);
    register_builtin(catalog, AvgImpl);
    register_builtin(catalog, MinImpl);
    register_builtin(catalog, MaxImpl);
}

/// Pick the first signature that accepts `arg_types` and whose output type
/// for `step` agrees with `result_type`.
///
/// `arg_types` are always the raw argument types. `result_type` is the
/// intermediate type for partial-output steps and the return type otherwise.
/// `DataType::Unknown` on either side is accepted.
pub(crate) fn specialize(
    name: &str,
    signatures: &[FunctionSignature],
    step: AggregationStep,
    arg_types: &[DataType],
    result_type: &DataType,
) -> Result<(FunctionSignature, Bindings), AggregateError> {
    signatures
        .iter()
        .find_map(|sig| {
            let bindings = sig.bind(arg_types)?;
            let produced = if step.is_partial_output() {
                sig.resolve_intermediate_type(&bindings)
            } else {
                sig.resolve_return_type(&bindings)
            };
            let agrees = match produced {
                Some(t) => t == *result_type || t == DataType::Unknown || *result_type == DataType::Unknown,
                None => true,
            };
            agrees.then(|| (sig.clone(), bindings))
        })
        .ok_or_else(|| AggregateError::UnsupportedSignature {
            name: name.to_string(),
            step,
            arg_types: arg_types.to_vec(),
            result_type: result_type.clone(),
        })
}
