use serde_json::Value;

use crate::{
    aggregate::{
        functions::{specialize, BuiltinAggregate}, Accumulator, AggregateError, AggregateFactory,
        AggregateOperator, AggregationStep, FunctionSignature, TypeSignature,
    },
    types::DataType,
};

pub struct CountImpl;

impl BuiltinAggregate for CountImpl {
    fn name(&self) -> &'static str { "count" }

    fn signatures(&self) -> Vec<FunctionSignature> {
        vec![
            // COUNT(*)
            FunctionSignature::builder()
                .intermediate_type(DataType::BigInt)
                .return_type(DataType::BigInt)
                .build(),
            // COUNT(expr)
            FunctionSignature::builder()
                .type_variable("T")
                .argument(TypeSignature::variable("T"))
                .intermediate_type(DataType::BigInt)
                .return_type(DataType::BigInt)
                .build(),
        ]
    }
}

impl AggregateFactory for CountImpl {
    fn create(
        &self,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Result<AggregateOperator, AggregateError> {
        specialize(self.name(), &self.signatures(), step, arg_types, result_type)?;
        Ok(AggregateOperator::new(self.name(), step, arg_types, result_type, Box::new(CountAcc { cnt: 0 })))
    }
}

struct CountAcc {
    cnt: i64,
}

impl Accumulator for CountAcc {
    fn update(&mut self, args: &[Value]) -> Result<(), AggregateError> {
        match args {
            // COUNT(*) -> no arguments, every row counts
            [] => self.cnt += 1,
            // COUNT(expr): increment if expr != NULL
            [v] => {
                if !v.is_null() {
                    self.cnt += 1;
                }
            }
            _ => return AggregateError::invalid_input("count", "COUNT(*|expr)").err(),
        }
        Ok(())
    }

    fn merge(&mut self, partial: &Value) -> Result<(), AggregateError> {
        match partial {
            Value::Null => Ok(()),
            Value::Number(n) => {
                let c = n.as_i64()
                    .filter(|c| *c >= 0)
                    .ok_or_else(|| AggregateError::invalid_input("count", format!("bad partial count: {n}")))?;
                self.cnt = self.cnt.checked_add(c)
                    .ok_or_else(|| AggregateError::invalid_input("count", "bigint overflow"))?;
                Ok(())
            }
            other => AggregateError::invalid_input("count", format!("bad partial count: {other}")).err(),
        }
    }

    fn partial(&self) -> Value {
        Value::from(self.cnt)
    }

    fn finalize(&self) -> Value {
        Value::from(self.cnt)
    }
}
