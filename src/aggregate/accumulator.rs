use serde_json::Value;

use crate::aggregate::AggregateError;

/// The per-group state behind an [`AggregateOperator`](crate::aggregate::AggregateOperator).
///
/// The operator decides which half is used, based on its step:
///   1) raw-input steps call `update` with the evaluated arguments of a row
///   2) the other steps call `merge` with one intermediate value
///   3) partial-output steps read `partial()`, the rest read `finalize()`
pub trait Accumulator: Send {
    /// Fold the evaluated arguments of one raw row into the state.
    fn update(&mut self, args: &[Value]) -> Result<(), AggregateError>;

    /// Fold a value previously produced by `partial()` into the state.
    fn merge(&mut self, partial: &Value) -> Result<(), AggregateError>;

    /// Serialized intermediate state.
    fn partial(&self) -> Value;

    /// Final result.
    fn finalize(&self) -> Value;
}
