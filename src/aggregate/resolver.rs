use crate::{aggregate::{AggregateError, AggregateOperator, AggregationStep}, types::DataType};

/// One source of aggregate implementations consulted by the dispatcher.
///
/// `Ok(None)` means "not mine, ask the next resolver". An `Err` ends the
/// lookup and reaches the caller untouched.
pub trait AggregateResolver: Send + Sync {
    /// Short label used in logs.
    fn resolver_name(&self) -> &'static str;

    fn try_create(
        &self,
        name: &str,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Result<Option<AggregateOperator>, AggregateError>;
}

/// Apply the registry's name policy.
pub(crate) fn normalize_name(name: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}
