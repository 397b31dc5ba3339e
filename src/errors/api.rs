use crate::errors::{ServiceError, StoreError};
use crate::types::dto::common::ErrorResponse;
use poem_openapi::payload::Json;
use poem_openapi::ApiResponse;
use std::fmt;

/// The HTTP error taxonomy. Validation (400), authentication (401),
/// authorization (403), not-found (404), conflict (409) and internal (500)
/// are distinct outcomes and are never conflated.
#[derive(ApiResponse, Debug)]
pub enum ApiError {
    /// Missing or malformed input
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),

    /// No session, or an invalid one
    #[oai(status = 401)]
    Unauthenticated(Json<ErrorResponse>),

    /// Valid session, insufficient role
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// Referenced id does not resolve
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    /// Duplicate unique key
    #[oai(status = 409)]
    Conflict(Json<ErrorResponse>),

    /// Unexpected failure; no internals leaked
    #[oai(status = 500)]
    Internal(Json<ErrorResponse>),
}

fn body(error: &str, message: impl Into<String>, status_code: u16) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code,
    })
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(body("bad_request", message, 400))
    }

    /// The generic guard failure for requests without a usable session.
    pub fn unauthenticated() -> Self {
        ApiError::Unauthenticated(body("unauthenticated", "Not authenticated", 401))
    }

    pub fn invalid_credentials() -> Self {
        ApiError::Unauthenticated(body("invalid_credentials", "Invalid credentials", 401))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(body("forbidden", message, 403))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(body("not_found", message, 404))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(body("conflict", message, 409))
    }

    pub fn internal() -> Self {
        ApiError::Internal(body("internal_error", "Internal server error", 500))
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(json)
            | ApiError::Unauthenticated(json)
            | ApiError::Forbidden(json)
            | ApiError::NotFound(json)
            | ApiError::Conflict(json)
            | ApiError::Internal(json) => &json.0.message,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(entity) => ApiError::not_found(format!("{entity} not found")),
            ServiceError::EmailInUse => ApiError::conflict("Email is already in use"),
            ServiceError::InvalidCredentials => ApiError::invalid_credentials(),
            ServiceError::Hash(detail) => {
                tracing::error!(%detail, "password hashing failed");
                ApiError::internal()
            }
            ServiceError::Store(err) => {
                tracing::error!(error = %err, "datastore failure");
                ApiError::internal()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "datastore failure");
        ApiError::internal()
    }
}
