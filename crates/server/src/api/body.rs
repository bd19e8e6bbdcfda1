//! Request body parsing for the collection endpoints.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiError;

/// Query string of `DELETE /api/{collection}?id=...`.
#[derive(Debug, Deserialize)]
pub struct IdParams {
    pub id: Option<String>,
}

impl IdParams {
    pub fn require(self) -> Result<String, ApiError> {
        self.id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("id is required"))
    }
}

/// Fail with 400 unless every named field is a non-blank string.
pub fn require_fields(body: &Value, fields: &[&str]) -> Result<(), ApiError> {
    let missing = fields.iter().any(|field| {
        body.get(field)
            .and_then(Value::as_str)
            .map_or(true, |v| v.trim().is_empty())
    });
    if missing {
        return Err(ApiError::bad_request(format!(
            "{} are required",
            fields.join(", ")
        )));
    }
    Ok(())
}

/// Decode a full record after its required fields were checked.
pub fn parse_record<T: DeserializeOwned>(body: Value, kind: &str) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::bad_request(format!("Invalid {}: {}", kind, e)))
}

/// Decode `{"id", "field", "value"}` into the id and a typed single-field update.
///
/// A missing `value` means null.
pub fn parse_patch<U: DeserializeOwned>(body: &Value) -> Result<(String, U), ApiError> {
    require_fields(body, &["id", "field"])?;

    let id = body["id"].as_str().unwrap_or_default().to_string();
    let field = body["field"].as_str().unwrap_or_default();
    let value = body.get("value").cloned().unwrap_or(Value::Null);

    let update = serde_json::from_value(json!({ "field": field, "value": value }))
        .map_err(|e| ApiError::bad_request(format!("Invalid update of {}: {}", field, e)))?;
    Ok((id, update))
}
