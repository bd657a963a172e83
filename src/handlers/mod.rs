use axum::http::{StatusCode, Uri};

mod screams;
mod users;

pub use screams::*;
pub use users::*;

use crate::errors::RequestError;

pub(crate) type JsonResult<T> = Result<axum::Json<T>, RequestError>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}
