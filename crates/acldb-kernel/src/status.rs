use serde::{Deserialize, Serialize};

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    CreatePrincipal,
    ChangePassword,
    Set,
    Append,
    Local,
    Foreach,
    SetDelegation,
    DeleteDelegation,
    DefaultDelegator,
    Returning,
    Exiting,
    Failed,
    Denied,
    /// Emitted by the network boundary only.
    Timeout,
}

/// One line of program output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub status: StatusCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl Status {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            output: None,
        }
    }

    pub fn returning(output: Value) -> Self {
        Self {
            status: StatusCode::Returning,
            output: Some(output),
        }
    }

    /// Single-line JSON rendering.
    pub fn to_json(&self) -> String {
        // Serializing strings, lists and string maps cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| String::from(r#"{"status":"FAILED"}"#))
    }
}

impl From<StatusCode> for Status {
    fn from(status: StatusCode) -> Self {
        Status::new(status)
    }
}
