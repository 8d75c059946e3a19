use std::fmt::Display;

use crate::{aggregate::AggregationStep, types::DataType};

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateError {
    /// Name is unknown to every resolver.
    NotRegistered(String),
    /// A known function was asked for a type combination none of its signatures accepts.
    UnsupportedSignature {
        name: String,
        step: AggregationStep,
        arg_types: Vec<DataType>,
        result_type: DataType,
    },
    /// A runtime value an accumulator cannot consume.
    InvalidInput { name: String, message: String },
    InvalidStep(String),
    Config(String),
}

impl AggregateError {
    pub fn invalid_input(name: &str, message: impl Into<String>) -> Self {
        AggregateError::InvalidInput { name: name.to_string(), message: message.into() }
    }

    pub fn err<T>(self) -> Result<T, AggregateError> {
        Err(self)
    }
}

impl Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateError::NotRegistered(name) => {
                write!(f, "Aggregate function not registered: {name}")
            }
            AggregateError::UnsupportedSignature { name, step, arg_types, result_type } => {
                let args = arg_types.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ");
                write!(
                    f,
                    "Aggregate function {name} ({step} step) does not support ({args}) -> {result_type}"
                )
            }
            AggregateError::InvalidInput { name, message } => {
                write!(f, "Invalid input for aggregate {name}: {message}")
            }
            AggregateError::InvalidStep(s) => write!(f, "Unknown aggregation step: {s}"),
            AggregateError::Config(msg) => write!(f, "Invalid registry config: {msg}"),
        }
    }
}

impl std::error::Error for AggregateError {}
