//! Shape validation of homework status responses

use serde_json::Value;
use tracing::debug;

use super::error::{ClientError, Result};
use crate::cursor::PollCursor;

/// Validated homework status response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusesResponse {
    /// Homeworks whose status changed since the requested `from_date`, in server order
    ///
    /// Entries are kept as sent. Only the one that gets formatted is decoded.
    pub homeworks: Vec<Value>,
    /// Server time to use as the next cursor
    pub current_date: PollCursor,
}

/// Check the payload shape and extract the homework list
///
/// Both `homeworks` and `current_date` must be present. An empty homework
/// list is valid and means nothing changed.
pub fn extract(payload: &Value) -> Result<StatusesResponse> {
    let object = payload.as_object().ok_or_else(|| {
        ClientError::malformed(format!("expected an object, got {}", kind(payload)))
    })?;

    let homeworks = object
        .get("homeworks")
        .ok_or(ClientError::MissingField("homeworks"))?;
    let current_date = object
        .get("current_date")
        .ok_or(ClientError::MissingField("current_date"))?;

    let homeworks = homeworks.as_array().ok_or_else(|| {
        ClientError::malformed(format!("homeworks must be a list, got {}", kind(homeworks)))
    })?;
    let current_date = current_date.as_i64().ok_or_else(|| {
        ClientError::malformed(format!(
            "current_date must be an integer, got {}",
            kind(current_date)
        ))
    })?;

    let homeworks = homeworks.clone();

    debug!(homework_count = homeworks.len(), current_date, "Response is valid");

    Ok(StatusesResponse {
        homeworks,
        current_date: PollCursor::new(current_date),
    })
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
