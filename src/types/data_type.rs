use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Logical type of an aggregate argument, intermediate state or result.
///
/// Runtime values travelling through the operators are `serde_json::Value`;
/// `DataType` is what the planner knows about them ahead of execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// SQL boolean
    Boolean,
    /// 64-bit signed integer
    BigInt,
    /// 64-bit float
    Double,
    /// Variable length string
    Varchar,
    /// Homogeneous array
    Array(Box<DataType>),
    /// Positional struct, used for multi-field intermediate states
    Row(Vec<DataType>),
    /// Type not known yet (e.g. a NULL literal)
    Unknown,
}

impl DataType {
    /// Classify a runtime JSON value.
    ///
    /// Arrays are typed after their first non-null element; objects map to
    /// `Unknown` because they carry no positional layout.
    pub fn of_value(v: &Value) -> DataType {
        match v {
            Value::Null => DataType::Unknown,
            Value::Bool(_) => DataType::Boolean,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    DataType::BigInt
                } else {
                    DataType::Double
                }
            }
            Value::String(_) => DataType::Varchar,
            Value::Array(items) => {
                let inner = items.iter()
                    .find(|i| !i.is_null())
                    .map(DataType::of_value)
                    .unwrap_or(DataType::Unknown);
                DataType::Array(Box::new(inner))
            }
            Value::Object(_) => DataType::Unknown,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::BigInt | DataType::Double)
    }

    pub fn row(fields: impl IntoIterator<Item = DataType>) -> DataType {
        DataType::Row(fields.into_iter().collect())
    }

    pub fn array(inner: DataType) -> DataType {
        DataType::Array(Box::new(inner))
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Boolean => f.write_str("boolean"),
            DataType::BigInt => f.write_str("bigint"),
            DataType::Double => f.write_str("double"),
            DataType::Varchar => f.write_str("varchar"),
            DataType::Unknown => f.write_str("unknown"),
            DataType::Array(inner) => write!(f, "array({inner})"),
            DataType::Row(fields) => {
                f.write_str("row(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 { f.write_str(",")?; }
                    write!(f, "{field}")?;
                }
                f.write_str(")")
            }
        }
    }
}
