use crate::errors::ServiceError;
use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Parses a create payload. An empty body, a JSON `null`, malformed JSON and
/// anything other than an object are rejected with `rejection`, so the caller
/// answers with its own required-fields message. An object whose fields have
/// the wrong types is rejected with the deserializer's message instead.
pub fn parse_create_body<T: DeserializeOwned>(
    body: &Bytes,
    rejection: &str,
) -> Result<T, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ServiceError::ValidationError(rejection.to_string()));
    }

    let value = match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => return Err(ServiceError::ValidationError(rejection.to_string())),
        Err(e) => {
            tracing::debug!(error = %e, "rejecting malformed create body");
            return Err(ServiceError::ValidationError(rejection.to_string()));
        }
    };

    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(error = %e, "rejecting mistyped create body");
        ServiceError::ValidationError(e.to_string())
    })
}

/// Parses a partial-update payload. An empty body or a JSON `null` is an
/// update with no fields; a malformed body is rejected with `rejection`.
pub fn parse_update_body<T: DeserializeOwned + Default>(
    body: &Bytes,
    rejection: &str,
) -> Result<T, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice::<Option<T>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| {
            tracing::debug!(error = %e, "rejecting malformed update body");
            ServiceError::ValidationError(rejection.to_string())
        })
}

/// Treats `Some("")` the same as a missing field.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
