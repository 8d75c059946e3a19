use serde_json::Value;

use crate::{aggregate::{Accumulator, AggregateError, AggregationStep}, types::DataType};

/// An executable aggregation bound to one step and one concrete type combination.
///
/// Built by a factory and handed to the caller; nothing in the registry keeps
/// a reference to it.
pub struct AggregateOperator {
    name: String,
    step: AggregationStep,
    arg_types: Vec<DataType>,
    result_type: DataType,
    acc: Box<dyn Accumulator>,
}

impl AggregateOperator {
    pub fn new(
        name: &str,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
        acc: Box<dyn Accumulator>,
    ) -> Self {
        Self {
            name: name.to_string(),
            step,
            arg_types: arg_types.to_vec(),
            result_type: result_type.clone(),
            acc,
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn step(&self) -> AggregationStep { self.step }
    pub fn arg_types(&self) -> &[DataType] { &self.arg_types }
    pub fn result_type(&self) -> &DataType { &self.result_type }

    /// Feed one row. Raw-input steps take the evaluated arguments; the others
    /// take exactly one intermediate value.
    pub fn add_input(&mut self, args: &[Value]) -> Result<(), AggregateError> {
        if self.step.is_raw_input() {
            return self.acc.update(args);
        }
        match args {
            [partial] => self.acc.merge(partial),
            _ => AggregateError::invalid_input(
                &self.name,
                format!("{} step expects one intermediate value, got {}", self.step, args.len()),
            ).err(),
        }
    }

    pub fn add_inputs<'a, I>(&mut self, rows: I) -> Result<(), AggregateError>
    where
        I: IntoIterator<Item = &'a [Value]>,
    {
        for row in rows {
            self.add_input(row)?;
        }
        Ok(())
    }

    /// Intermediate state for partial-output steps, final value otherwise.
    pub fn extract(&self) -> Value {
        if self.step.is_partial_output() {
            self.acc.partial()
        } else {
            self.acc.finalize()
        }
    }
}

impl std::fmt::Debug for AggregateOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateOperator")
            .field("name", &self.name)
            .field("step", &self.step)
            .field("arg_types", &self.arg_types)
            .field("result_type", &self.result_type)
            .finish_non_exhaustive()
    }
}
