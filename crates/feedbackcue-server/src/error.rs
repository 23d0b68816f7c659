use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use feedbackcue_shared::ValidationError;
use feedbackcue_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Map a store error, naming the record kind for `NotFound`.
    pub fn from_store(e: StoreError, what: &'static str) -> Self {
        match e {
            StoreError::NotFound => ServerError::NotFound(what),
            other => other.into(),
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ServerError::NotFound("Record"),
            StoreError::Conflict(msg) => ServerError::Conflict(msg),
            StoreError::InvalidArgument(v) => ServerError::Validation(v),
            other => {
                tracing::error!(error = %other, "store failure");
                ServerError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            ServerError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Unauthorized | ServerError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_status_codes() {
        let cases = [
            (ServerError::from_store(StoreError::NotFound, "Board"), StatusCode::NOT_FOUND),
            (StoreError::Conflict("taken".into()).into(), StatusCode::CONFLICT),
            (
                StoreError::InvalidArgument(ValidationError::Required("Title")).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (StoreError::NoDataDir.into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn not_found_names_the_record() {
        let err = ServerError::from_store(StoreError::NotFound, "Board");
        assert_eq!(err.to_string(), "Board not found");
    }
}
