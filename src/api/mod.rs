//! HTTP API endpoints for the admin console
//!
//! Responses use a uniform JSON envelope: `{ok: true, data}` on success,
//! `{ok: false, error: {code, message}}` on failure. Authentication and
//! authorization are enforced by the surrounding gate; this surface only
//! validates its own filter and pagination bounds.

pub mod trust;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::trust::TrustError;

pub use trust::{create_trust_router, TrustApiState};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Uniform response envelope
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            ok: true,
            data: Some(data),
            error: None,
        })
    }
}

pub type ApiFailure = (StatusCode, Json<Envelope<()>>);

fn failure(status: StatusCode, code: &str, message: String) -> ApiFailure {
    (
        status,
        Json(Envelope {
            ok: false,
            data: None,
            error: Some(ErrorBody {
                code: code.to_string(),
                message,
            }),
        }),
    )
}

/// Map the domain error taxonomy onto envelope codes and HTTP status.
pub fn error_response(err: TrustError) -> ApiFailure {
    match err {
        TrustError::NotFound(_) => failure(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        TrustError::Validation(_) => {
            failure(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        TrustError::RecalculationFailed(_) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "RECALCULATION_FAILED",
            err.to_string(),
        ),
        TrustError::Store(e) => {
            error!(error = %e, "Store failure while serving request");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal error".to_string(),
            )
        }
    }
}
