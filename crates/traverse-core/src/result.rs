//! Aggregated outcome of one action
//!
//! The engine fills in whichever phases it ran. Errors are recorded as text per
//! phase; they are never raised, only folded into [`ActionResult::has_error`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::options::ActionOptions;

/// Outcome of opening or activating an application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenResult {
    pub pid: i32,
    pub app_name: String,
    pub processing_time_seconds: f64,
}

/// One element of the target application's UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Counters reported by a traversal pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraversalStats {
    pub count: u64,
    pub visible_elements_count: u64,
    pub with_text_count: u64,
    pub excluded_count: u64,
}

/// Snapshot produced by one traversal pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub app_name: String,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub stats: TraversalStats,
    pub processing_time_seconds: f64,
}

/// Elements that appeared or disappeared between the two snapshots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalDiff {
    pub added: Vec<Element>,
    pub removed: Vec<Element>,
}

/// Everything the engine reports for one action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_result: Option<OpenResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traversal_pid: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traversal_before: Option<Snapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traversal_after: Option<Snapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traversal_diff: Option<TraversalDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_action_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traversal_before_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traversal_after_error: Option<String>,
}

impl ActionResult {
    /// Result carrying only a primary-action error
    pub fn primary_failure(message: impl Into<String>) -> Self {
        Self {
            primary_action_error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Overall error flag.
    ///
    /// Traversal errors only count for phases the options requested.
    pub fn has_error(&self, options: &ActionOptions) -> bool {
        self.primary_action_error.is_some()
            || (options.traverse_before && self.traversal_before_error.is_some())
            || (options.traverse_after && self.traversal_after_error.is_some())
    }

    /// Canonical text encoding: pretty-printed, keys sorted, `/` unescaped.
    ///
    /// Equal results always produce byte-identical output.
    pub fn to_canonical_json(&self) -> serde_json::Result<String> {
        let value = sort_keys(serde_json::to_value(self)?);
        serde_json::to_string_pretty(&value)
    }
}

/// Rebuild every object in key order, independent of serde_json's map flavour
fn sort_keys(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
