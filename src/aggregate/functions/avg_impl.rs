use serde_json::{Number, Value};

use crate::{
    aggregate::{
        functions::{specialize, BuiltinAggregate}, Accumulator, AggregateError, AggregateFactory,
        AggregateOperator, AggregationStep, FunctionSignature,
    },
    types::DataType,
};

pub struct AvgImpl;

impl AvgImpl {
    /// `row(double, bigint)`: running sum and count.
    pub fn intermediate_type() -> DataType {
        DataType::row([DataType::Double, DataType::BigInt])
    }
}

impl BuiltinAggregate for AvgImpl {
    fn name(&self) -> &'static str { "avg" }

    fn signatures(&self) -> Vec<FunctionSignature> {
        [DataType::BigInt, DataType::Double]
            .into_iter()
            .map(|t| {
                FunctionSignature::builder()
                    .argument(t)
                    .intermediate_type(Self::intermediate_type())
                    .return_type(DataType::Double)
                    .build()
            })
            .collect()
    }
}

impl AggregateFactory for AvgImpl {
    fn create(
        &self,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Result<AggregateOperator, AggregateError> {
        specialize(self.name(), &self.signatures(), step, arg_types, result_type)?;
        Ok(AggregateOperator::new(self.name(), step, arg_types, result_type, Box::new(AvgAcc { sum: 0.0, cnt: 0 })))
    }
}

struct AvgAcc { sum: f64, cnt: i64 }

impl Accumulator for AvgAcc {
    fn update(&mut self, args: &[Value]) -> Result<(), AggregateError> {
        let [v] = args else {
            return AggregateError::invalid_input("avg", "AVG(expr)").err();
        };
        match v {
            Value::Null => {}
            Value::Number(n) if DataType::of_value(v).is_numeric() => {
                let f = n.as_f64().ok_or_else(|| AggregateError::invalid_input("avg", "non numeric number"))?;
                self.sum += f;
                self.cnt += 1;
            }
            other => return AggregateError::invalid_input("avg", format!("non numeric arg: {other}")).err(),
        }
        Ok(())
    }

    fn merge(&mut self, partial: &Value) -> Result<(), AggregateError> {
        if partial.is_null() {
            return Ok(());
        }
        let parsed = partial.as_array().and_then(|pair| match pair.as_slice() {
            [s, c] => Some((s.as_f64()?, c.as_i64().filter(|c| *c >= 0)?)),
            _ => None,
        });
        let Some((sum, cnt)) = parsed else {
            return AggregateError::invalid_input("avg", format!("bad partial state: {partial}")).err();
        };
        self.cnt = self.cnt.checked_add(cnt)
            .ok_or_else(|| AggregateError::invalid_input("avg", "bigint overflow"))?;
        self.sum += sum;
        Ok(())
    }

    fn partial(&self) -> Value {
        let sum = Number::from_f64(self.sum).map(Value::Number).unwrap_or(Value::Null);
        Value::Array(vec![sum, Value::from(self.cnt)])
    }

    fn finalize(&self) -> Value {
        if self.cnt == 0 {
            Value::Null
        } else {
            let avg = self.sum / (self.cnt as f64);
            Number::from_f64(avg).map(Value::Number).unwrap_or(Value::Null)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn avg_ignores_null_and_returns_float() {
        let mut a = AvgImpl.create(AggregationStep::Single, &[DataType::BigInt], &DataType::Double).unwrap();
        a.add_input(&[Value::Null]).unwrap();
        a.add_input(&[json!(2)]).unwrap();
        a.add_input(&[json!(3)]).unwrap();
        assert_eq!(a.extract(), json!(2.5));
    }

    #[test]
    fn partial_state_is_sum_and_count() {
        let mut p = AvgImpl
            .create(AggregationStep::Partial, &[DataType::Double], &AvgImpl::intermediate_type())
            .unwrap();
        p.add_input(&[json!(1.5)]).unwrap();
        p.add_input(&[json!(2.5)]).unwrap();
        assert_eq!(p.extract(), json!([4.0, 2]));
    }

    #[test]
    fn final_merges_partials_and_rejects_garbage() {
        let mut f = AvgImpl.create(AggregationStep::Final, &[DataType::Double], &DataType::Double).unwrap();
        f.add_input(&[json!([4.0, 2])]).unwrap();
        f.add_input(&[Value::Null]).unwrap();
        f.add_input(&[json!([2.0, 2])]).unwrap();
        assert!(f.add_input(&[json!([1.0])]).is_err());
        assert!(f.add_input(&[json!("x")]).is_err());
        assert_eq!(f.extract(), json!(1.5));
    }

    #[test]
    fn merge_rejects_negative_counts_and_overflow() {
        let mut f = AvgImpl.create(AggregationStep::Final, &[DataType::Double], &DataType::Double).unwrap();
        assert!(f.add_input(&[json!([1.0, -2])]).is_err());

        f.add_input(&[json!([1.0, i64::MAX])]).unwrap();
        let err = f.add_input(&[json!([1.0, 1])]).unwrap_err();
        assert!(err.to_string().contains("bigint overflow"));
    }

    #[test]
    fn empty_avg_is_null() {
        let f = AvgImpl.create(AggregationStep::Final, &[DataType::BigInt], &DataType::Double).unwrap();
        assert_eq!(f.extract(), Value::Null);
    }
}
