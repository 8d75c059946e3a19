use serde_json::Value;

use crate::{
    aggregate::{
        functions::{specialize, BuiltinAggregate}, Accumulator, AggregateError, AggregateFactory,
        AggregateOperator, AggregationStep, FunctionSignature, TypeSignature,
    },
    types::DataType,
};

pub struct MinImpl;
pub struct MaxImpl;

fn extrema_signatures() -> Vec<FunctionSignature> {
    vec![
        FunctionSignature::builder()
            .type_variable("T")
            .argument(TypeSignature::variable("T"))
            .return_type(TypeSignature::variable("T"))
            .build(),
    ]
}

impl BuiltinAggregate for MinImpl {
    fn name(&self) -> &'static str { "min" }
    fn signatures(&self) -> Vec<FunctionSignature> { extrema_signatures() }
}

impl BuiltinAggregate for MaxImpl {
    fn name(&self) -> &'static str { "max" }
    fn signatures(&self) -> Vec<FunctionSignature> { extrema_signatures() }
}

impl AggregateFactory for MinImpl {
    fn create(
        &self,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Result<AggregateOperator, AggregateError> {
        specialize(self.name(), &self.signatures(), step, arg_types, result_type)?;
        Ok(AggregateOperator::new(self.name(), step, arg_types, result_type, Box::new(ExtremaAcc::new_min())))
    }
}

impl AggregateFactory for MaxImpl {
    fn create(
        &self,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Result<AggregateOperator, AggregateError> {
        specialize(self.name(), &self.signatures(), step, arg_types, result_type)?;
        Ok(AggregateOperator::new(self.name(), step, arg_types, result_type, Box::new(ExtremaAcc::new_max())))
    }
}

enum Mode { Min, Max }

struct ExtremaAcc {
    mode: Mode,
    current: Option<Value>,
}

impl ExtremaAcc {
    fn new_min() -> Self { Self { mode: Mode::Min, current: None } }
    fn new_max() -> Self { Self { mode: Mode::Max, current: None } }

    fn label(&self) -> &'static str {
        match self.mode { Mode::Min => "min", Mode::Max => "max" }
    }

    /// Whether `b` should replace `a`.
    fn better(&self, a: &Value, b: &Value) -> Result<bool, AggregateError> {
        use Value::*;
        let name = self.label();
        let ord = match (a, b) {
            (Null, _) | (_, Null) => return Ok(false),
            (Bool(x), Bool(y)) => x.cmp(y),
            (Number(x), Number(y)) => match (x.as_i64(), y.as_i64(), x.as_f64(), y.as_f64()) {
                (Some(ix), Some(iy), _, _) => ix.cmp(&iy),
                (_, _, Some(fx), Some(fy)) => fx
                    .partial_cmp(&fy)
                    .ok_or_else(|| AggregateError::invalid_input(name, "NaN"))?,
                _ => return AggregateError::invalid_input(name, "unsupported number").err(),
            },
            (String(x), String(y)) => x.cmp(y),
            (Array(_), _) | (Object(_), _) | (_, Array(_)) | (_, Object(_)) => {
                return AggregateError::invalid_input(name, "unsupported type").err()
            }
            _ => return AggregateError::invalid_input(name, "mixed types").err(),
        };
        Ok(match self.mode { Mode::Min => ord.is_gt(), Mode::Max => ord.is_lt() })
    }

    fn offer(&mut self, v: &Value) -> Result<(), AggregateError> {
        if v.is_null() {
            return Ok(());
        }
        let replace = match &self.current {
            None => true,
            Some(cur) => self.better(cur, v)?,
        };
        if replace {
            self.current = Some(v.clone());
        }
        Ok(())
    }
}

impl Accumulator for ExtremaAcc {
    fn update(&mut self, args: &[Value]) -> Result<(), AggregateError> {
        let [v] = args else {
            return AggregateError::invalid_input(self.label(), "MIN/MAX(expr)").err();
        };
        self.offer(v)
    }

    fn merge(&mut self, partial: &Value) -> Result<(), AggregateError> {
        self.offer(partial)
    }

    fn partial(&self) -> Value {
        self.finalize()
    }

    fn finalize(&self) -> Value {
        self.current.clone().unwrap_or(Value::Null)
    }
}
