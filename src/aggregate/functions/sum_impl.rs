use serde_json::{Number, Value};

use crate::{
    aggregate::{
        functions::{specialize, BuiltinAggregate}, Accumulator, AggregateError, AggregateFactory,
        AggregateOperator, AggregationStep, FunctionSignature,
    },
    types::DataType,
};

pub struct SumImpl;

impl BuiltinAggregate for SumImpl {
    fn name(&self) -> &'static str { "sum" }

    fn signatures(&self) -> Vec<FunctionSignature> {
        [DataType::BigInt, DataType::Double]
            .into_iter()
            .map(|t| FunctionSignature::builder().argument(t.clone()).return_type(t).build())
            .collect()
    }
}

impl AggregateFactory for SumImpl {
    fn create(
        &self,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Result<AggregateOperator, AggregateError> {
        let (sig, bindings) = specialize(self.name(), &self.signatures(), step, arg_types, result_type)?;
        // untyped input cannot promise integers, so it sums as double
        let untyped = arg_types.iter().all(|t| *t == DataType::Unknown) && *result_type == DataType::Unknown;
        let acc = match sig.resolve_return_type(&bindings) {
            Some(DataType::Double) => SumAcc::Float(None),
            _ if untyped => SumAcc::Float(None),
            _ => SumAcc::Int(None),
        };
        Ok(AggregateOperator::new(self.name(), step, arg_types, result_type, Box::new(acc)))
    }
}

// Kind is fixed by the specialized signature.
enum SumAcc {
    Int(Option<i64>),
    Float(Option<f64>),
}

impl SumAcc {
    fn add(&mut self, v: &Value) -> Result<(), AggregateError> {
        let n = match v {
            Value::Null => return Ok(()),
            Value::Number(n) if DataType::of_value(v).is_numeric() => n,
            other => return AggregateError::invalid_input("sum", format!("non numeric arg: {other}")).err(),
        };
        match self {
            SumAcc::Int(acc) => {
                let i = n.as_i64()
                    .ok_or_else(|| AggregateError::invalid_input("sum", "SUM received float for BIGINT aggregation"))?;
                let next = acc.unwrap_or(0).checked_add(i)
                    .ok_or_else(|| AggregateError::invalid_input("sum", "bigint overflow"))?;
                *acc = Some(next);
            }
            SumAcc::Float(acc) => {
                let f = n.as_f64()
                    .ok_or_else(|| AggregateError::invalid_input("sum", "non numeric number"))?;
                *acc = Some(acc.unwrap_or(0.0) + f);
            }
        }
        Ok(())
    }
}

impl Accumulator for SumAcc {
    fn update(&mut self, args: &[Value]) -> Result<(), AggregateError> {
        let [v] = args else {
            return AggregateError::invalid_input("sum", "SUM(expr)").err();
        };
        self.add(v)
    }

    // partial state has the same shape as the result
    fn merge(&mut self, partial: &Value) -> Result<(), AggregateError> {
        self.add(partial)
    }

    fn partial(&self) -> Value {
        self.finalize()
    }

    fn finalize(&self) -> Value {
        match self {
            // SQL SUM over no rows or only NULLs -> NULL
            SumAcc::Int(None) | SumAcc::Float(None) => Value::Null,
            SumAcc::Int(Some(i)) => Value::from(*i),
            SumAcc::Float(Some(f)) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        }
    }
}
