use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateError;

/// Execution phase of an aggregation operator.
///
/// Fixed when the operator is built and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationStep {
    /// raw rows in, partial state out
    Partial,
    /// partial state in, partial state out
    Intermediate,
    /// partial state in, final value out
    Final,
    /// raw rows in, final value out
    Single,
}

impl AggregationStep {
    pub const ALL: [AggregationStep; 4] = [
        AggregationStep::Partial,
        AggregationStep::Intermediate,
        AggregationStep::Final,
        AggregationStep::Single,
    ];

    /// The operator receives un-aggregated rows.
    pub fn is_raw_input(self) -> bool {
        matches!(self, AggregationStep::Partial | AggregationStep::Single)
    }

    /// The operator emits an intermediate accumulator instead of a final value.
    pub fn is_partial_output(self) -> bool {
        matches!(self, AggregationStep::Partial | AggregationStep::Intermediate)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AggregationStep::Partial => "partial",
            AggregationStep::Intermediate => "intermediate",
            AggregationStep::Final => "final",
            AggregationStep::Single => "single",
        }
    }
}

pub fn is_raw_input(step: AggregationStep) -> bool {
    step.is_raw_input()
}

pub fn is_partial_output(step: AggregationStep) -> bool {
    step.is_partial_output()
}

impl Display for AggregationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationStep {
    type Err = AggregateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregationStep::ALL
            .into_iter()
            .find(|step| step.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AggregateError::InvalidStep(s.to_string()))
    }
}
