use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Result envelope every command operation resolves to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: CommandStatus,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl ExecutionOutcome {
    pub fn success(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: message.into(),
            details,
        }
    }

    pub fn failure(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Failure,
            message: message.into(),
            details,
        }
    }

    pub fn user_error(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::UserError,
            message: message.into(),
            details,
        }
    }

    /// "Nothing to do" resolution used when no workspace is open; this is
    /// a success, never an error.
    pub fn noop(message: impl Into<String>) -> Self {
        Self::success(message, json!({ "noop": true }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandStatus {
    Ok,
    UserError,
    Failure,
}

#[must_use]
pub fn to_json_response(command: &str, outcome: &ExecutionOutcome) -> Value {
    let status = match outcome.status {
        CommandStatus::Ok => "ok",
        CommandStatus::UserError => "user-error",
        CommandStatus::Failure => "error",
    };
    let details = match &outcome.details {
        Value::Object(_) => outcome.details.clone(),
        Value::Null => json!({}),
        other => json!({ "value": other }),
    };
    json!({
        "status": status,
        "message": format_status_message(command, &outcome.message),
        "details": details,
    })
}

#[must_use]
pub fn format_status_message(command: &str, message: &str) -> String {
    let prefix = format!("mws {command}");
    if message.is_empty() {
        prefix
    } else if message.starts_with(&prefix) {
        message.to_string()
    } else {
        format!("{prefix}: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_response_maps_statuses() {
        let ok = to_json_response("list", &ExecutionOutcome::success("found 2 projects", json!({})));
        assert_eq!(ok["status"], "ok");
        assert_eq!(ok["message"], "mws list: found 2 projects");

        let user = to_json_response("select", &ExecutionOutcome::user_error("unknown project", json!({})));
        assert_eq!(user["status"], "user-error");
    }

    #[test]
    fn non_object_details_are_wrapped() {
        let outcome = ExecutionOutcome::success("", json!(3));
        let payload = to_json_response("list", &outcome);
        assert_eq!(payload["details"]["value"], 3);
        assert_eq!(payload["message"], "mws list");
    }

    #[test]
    fn message_prefix_is_not_duplicated() {
        assert_eq!(
            format_status_message("update", "mws update: done"),
            "mws update: done"
        );
    }
}
