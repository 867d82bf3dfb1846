//! Maps `IronGateError` to HTTP responses via a thin wrapper — one
//! `IntoResponse` impl, status taken from the error type's own
//! `http_status` rather than re-derived here.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use irongate_core::IronGateError;
use serde_json::json;

pub struct AppError(pub IronGateError);

impl From<IronGateError> for AppError {
    fn from(e: IronGateError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({
            "error": self.0.to_string(),
            "code": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}
