/* 📖 # Why one result shape for every call?

Queries and mutations talk to very different collaborators, but the
documentation page must show every outcome the same way: a success message
with data, or an error code with a message. Every dispatch path ends in an
`ExecutionResult`, including failures that never reached a handler.

On the wire it is the familiar tagged object:
`{"success": true, "message": …, "data": …}` or
`{"success": false, "errorCode": …, "message": …}`.
*/

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Error code for a service name that is bound to neither a query nor a mutation.
pub const INVALID_ENDPOINT: &str = "INVALID_ENDPOINT";
/// Error code for a query or mutation that failed while executing.
pub const API_ERROR: &str = "API_ERROR";
/// Message used when a failure carries no usable message of its own.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Normalized outcome of executing an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawResult", into = "RawResult")]
pub enum ExecutionResult {
    Success {
        message: String,
        data: Value,
    },
    Failure {
        error_code: String,
        message: String,
    },
}

impl ExecutionResult {
    pub fn success(message: impl Into<String>, data: Value) -> Self {
        Self::Success {
            message: message.into(),
            data,
        }
    }

    pub fn failure(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            error_code: error_code.into(),
            message: message.into(),
        }
    }

    /// The result for a service name nothing is bound to.
    pub fn invalid_endpoint() -> Self {
        Self::failure(INVALID_ENDPOINT, "Invalid endpoint")
    }

    /// The result for a failed call; an empty message falls back to the generic one.
    pub fn api_error(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::failure(API_ERROR, UNKNOWN_ERROR_MESSAGE)
        } else {
            Self::failure(API_ERROR, message)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }

    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error_code, .. } => Some(error_code),
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    /// The wire form of this result as a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Success { message, data } => {
                json!({"success": true, "message": message, "data": data})
            }
            Self::Failure {
                error_code,
                message,
            } => json!({"success": false, "errorCode": error_code, "message": message}),
        }
    }

    /// Normalize data returned by a query.
    ///
    /// Data that already is a result object is passed through; anything else is
    /// wrapped as a successful result.
    pub fn from_query_data(data: Value) -> Self {
        let looks_like_result = data
            .as_object()
            .is_some_and(|object| object.get("success").is_some_and(Value::is_boolean));
        if looks_like_result {
            if let Ok(result) = serde_json::from_value::<ExecutionResult>(data.clone()) {
                return result;
            }
        }
        Self::success("Query executed successfully", data)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResult {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_code: Option<String>,
    #[serde(default)]
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl TryFrom<RawResult> for ExecutionResult {
    type Error = String;

    fn try_from(raw: RawResult) -> Result<Self, Self::Error> {
        match (raw.success, raw.error_code) {
            (true, _) => Ok(Self::Success {
                message: raw.message,
                data: raw.data.unwrap_or(Value::Null),
            }),
            (false, Some(error_code)) => Ok(Self::Failure {
                error_code,
                message: raw.message,
            }),
            (false, None) => Err("failed result without errorCode".to_string()),
        }
    }
}

impl From<ExecutionResult> for RawResult {
    fn from(result: ExecutionResult) -> Self {
        match result {
            ExecutionResult::Success { message, data } => RawResult {
                success: true,
                error_code: None,
                message,
                data: Some(data),
            },
            ExecutionResult::Failure {
                error_code,
                message,
            } => RawResult {
                success: false,
                error_code: Some(error_code),
                message,
                data: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let success = ExecutionResult::success("Login successful", json!({"username": "admin"}));
        expect![[r#"{"success":true,"message":"Login successful","data":{"username":"admin"}}"#]]
            .assert_eq(&serde_json::to_string(&success).unwrap());

        let failure = ExecutionResult::failure("LOGOUT_ERROR", "Failed to logout");
        expect![[r#"{"success":false,"errorCode":"LOGOUT_ERROR","message":"Failed to logout"}"#]]
            .assert_eq(&serde_json::to_string(&failure).unwrap());
    }

    #[test]
    fn test_parse_failure_requires_error_code() {
        let parsed: ExecutionResult = serde_json::from_value(
            json!({"success": false, "errorCode": "NOT_FOUND", "message": "Student not found"}),
        )
        .unwrap();
        assert_eq!(parsed.error_code(), Some("NOT_FOUND"));

        let missing = serde_json::from_value::<ExecutionResult>(json!({"success": false}));
        assert!(missing.is_err());
    }

    #[test]
    fn test_api_error_fallback_message() {
        assert_eq!(ExecutionResult::api_error("boom").message(), "boom");
        assert_eq!(
            ExecutionResult::api_error("  "),
            ExecutionResult::failure(API_ERROR, UNKNOWN_ERROR_MESSAGE)
        );
    }

    #[test]
    fn test_query_data_normalization() {
        let wrapped = ExecutionResult::from_query_data(json!([{"id": "students-0001"}]));
        assert!(wrapped.is_success());
        assert_eq!(wrapped.data(), Some(&json!([{"id": "students-0001"}])));

        let passed = ExecutionResult::from_query_data(
            json!({"success": true, "message": "Loaded", "data": 3}),
        );
        assert_eq!(passed, ExecutionResult::success("Loaded", json!(3)));

        // a record that merely has a non-boolean `success` field stays data
        let record = json!({"success": "yes"});
        assert_eq!(
            ExecutionResult::from_query_data(record.clone()).data(),
            Some(&record)
        );
    }
}
