//! The JSON report every task prints on stdout.

use serde::Serialize;
use serde_json::Value;

/// Single-line JSON result of one task invocation.
///
/// `reason` is a stable machine-checkable string; `msg` is for humans.
#[derive(Debug, Serialize)]
pub struct TaskReport {
    pub changed: bool,
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub result: Value,
}

impl TaskReport {
    pub fn ok(changed: bool, result: Value) -> Self {
        Self {
            changed,
            failed: false,
            msg: None,
            reason: None,
            result,
        }
    }

    pub fn ok_with_msg(changed: bool, result: Value, msg: impl Into<String>) -> Self {
        Self {
            changed,
            failed: false,
            msg: Some(msg.into()),
            reason: None,
            result,
        }
    }

    /// Caller-supplied parameters were contradictory or incomplete.
    /// Raised before any network call; the message names the field.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::failure("validation", msg)
    }

    /// A structured task failure (remote rejection, timeout-adjacent
    /// outcome, ambiguous remote state).
    pub fn failure(reason: &'static str, msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            failed: true,
            msg: Some(msg.into()),
            reason: Some(reason),
            result: Value::Null,
        }
    }

    /// Print the single-line JSON report.
    pub fn emit(&self) {
        // TaskReport serialization cannot fail: it is a plain struct over
        // already-valid JSON values.
        println!("{}", serde_json::to_string(self).expect("report serialization"));
    }
}
