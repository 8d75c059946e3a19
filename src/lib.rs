//! Aggregate function catalog: register aggregate implementations by name and
//! build step-specialized operators for the planner and the executor.

pub mod types;
pub use types::DataType;

pub mod aggregate;
pub use aggregate::{
    is_partial_output, is_raw_input, AggregateError, AggregateFactory, AggregateOperator,
    AggregateRegistry, AggregationStep, FunctionSignature, RegistryConfig, TypeSignature,
};
