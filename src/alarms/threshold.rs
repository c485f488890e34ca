//! Threshold expression parsing
//!
//! A threshold expression is a comma separated list of comparisons:
//!
//! ```text
//! EXPR    := SEGMENT (',' SEGMENT)*
//! SEGMENT := ('<' | '>' | '<=' | '>=') FLOAT
//! ```
//!
//! Whitespace around segments is ignored. An empty expression yields no rules.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, MonitorResult};

// Two-character operators come first so `<=` is never read as `<` followed by `=...`
static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(<=|>=|<|>)([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)$")
        .expect("threshold segment pattern is valid")
});

/// Serialized under the operator names alarm backends understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "LessThanThreshold")]
    LessThan,
    #[serde(rename = "GreaterThanThreshold")]
    GreaterThan,
    #[serde(rename = "LessThanOrEqualToThreshold")]
    LessOrEqual,
    #[serde(rename = "GreaterThanOrEqualToThreshold")]
    GreaterOrEqual,
}

impl ComparisonOperator {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(ComparisonOperator::LessThan),
            ">" => Some(ComparisonOperator::GreaterThan),
            "<=" => Some(ComparisonOperator::LessOrEqual),
            ">=" => Some(ComparisonOperator::GreaterOrEqual),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::GreaterOrEqual => ">=",
        }
    }
}

/// A single parsed comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub operator: ComparisonOperator,
    pub value: f64,

    /// The trimmed segment this rule was parsed from
    pub source_expression: String,
}

/// Parse a threshold expression into its rules, in order of appearance
pub fn parse(expression: &str) -> MonitorResult<Vec<ThresholdRule>> {
    if expression.trim().is_empty() {
        return Ok(vec![]);
    }

    expression.split(',').map(|segment| parse_segment(expression, segment)).collect()
}

fn parse_segment(expression: &str, segment: &str) -> MonitorResult<ThresholdRule> {
    let segment = segment.trim();

    let captures = SEGMENT.captures(segment).ok_or_else(|| {
        let reason = if segment.is_empty() {
            "empty comparison".to_string()
        } else {
            format!("'{segment}' is not a comparison like '<1' or '>=0.5'")
        };
        MonitorError::invalid_expression(expression, reason)
    })?;

    let operator = ComparisonOperator::from_symbol(&captures[1])
        .ok_or_else(|| MonitorError::invalid_expression(expression, "unknown operator"))?;
    let value: f64 = captures[2]
        .parse()
        .map_err(|e| MonitorError::invalid_expression(expression, format!("{e}")))?;

    Ok(ThresholdRule {
        operator,
        value,
        source_expression: segment.to_string(),
    })
}
