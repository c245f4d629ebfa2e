// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! API error type shared by all route handlers.
//!
//! OAuth error codes (`invalid_request`, `invalid_grant`, ...) travel in the
//! same `{"error": "..."}` body shape the rest of the gateway uses, so the
//! protocol endpoints and the identity endpoints share one error path.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// OAuth `invalid_request`: a required parameter is missing or malformed.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::bad_request(message)
    }

    /// OAuth `invalid_grant`: unknown, expired, or already-consumed code.
    pub fn invalid_grant() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_grant")
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// The upstream-asserted account is not the pre-registered one. Hard
    /// trust boundary; always surfaced, never retried.
    pub fn identity_mismatch(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// A required secret is absent; names the missing configuration key.
    pub fn not_configured(env_name: &str) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{env_name} not configured"),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let grant = ApiError::invalid_grant();
        assert_eq!(grant.status, StatusCode::BAD_REQUEST);
        assert_eq!(grant.message, "invalid_grant");

        let mismatch = ApiError::identity_mismatch("wrong account");
        assert_eq!(mismatch.status, StatusCode::FORBIDDEN);

        let missing = ApiError::not_configured("ALCHEMY_API_KEY");
        assert_eq!(missing.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(missing.message, "ALCHEMY_API_KEY not configured");
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::invalid_grant().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"invalid_grant"}"#);
    }
}
