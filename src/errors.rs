use std::collections::BTreeMap;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::JsonResponse;

/// Every error body is a one-level JSON object of the shape
/// `{field: message}` (validation, conflicts) or `{error: message}`
/// (auth, not-found, server failures).
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("validation failed")]
    Validation(BTreeMap<&'static str, String>),
    #[error("{1}")]
    BadRequest(&'static str, &'static str),
    #[error("Unauthorised")]
    NotAuthorized,
    #[error("Wrong password")]
    WrongPassword,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    ServerError(&'static str),
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

impl RequestError {
    pub fn to_json_response(&self) -> JsonResponse<Value> {
        let (status_code, body) = match self {
            RequestError::Validation(errors) => (StatusCode::BAD_REQUEST, json!(errors)),
            RequestError::BadRequest(field, message) => {
                (StatusCode::BAD_REQUEST, field_error(field, message))
            }
            RequestError::NotAuthorized => {
                (StatusCode::FORBIDDEN, json!({ "error": "Unauthorised" }))
            }
            RequestError::WrongPassword => {
                (StatusCode::FORBIDDEN, json!({ "password": "Wrong password" }))
            }
            RequestError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            RequestError::Database(e) => {
                tracing::error!("database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Something went wrong" }),
                )
            }
            RequestError::ServerError(message) => {
                tracing::error!("server error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "general": "Something went wrong, please try again" }),
                )
            }
        };
        (status_code, Json(body))
    }
}

fn field_error(field: &str, message: &str) -> Value {
    let mut body = serde_json::Map::new();
    body.insert(field.to_owned(), Value::String(message.to_owned()));
    Value::Object(body)
}
