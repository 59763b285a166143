use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// One rejected input field and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid input: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("upstream service error: {0}")]
    Upstream(String),

    #[error("storage error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Upstream(_) => "upstream_service_error",
            AppError::Persistence(_) => "persistence_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| f.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldError]>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, kind = self.kind(), "request failed");
        }
        // storage details stay in the logs
        let message = match &self {
            AppError::Persistence(_) | AppError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        let fields = match &self {
            AppError::Validation(f) => Some(f.as_slice()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.kind(),
            message,
            fields,
        };
        (status, Json(body)).into_response()
    }
}

/// Accumulates field errors so a request reports every bad field at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_collects_every_failed_field() {
        let mut v = Validator::new();
        v.check(false, "calorie_target", "must be positive")
            .check(true, "goal", "unused")
            .check(false, "meal_count", "must be between 1 and 6");
        let err = v.finish().unwrap_err();
        match err {
            AppError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["calorie_target", "meal_count"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn validation_error_message_names_fields() {
        let err = AppError::Validation(vec![
            FieldError::new("rating", "must be between 1 and 5"),
            FieldError::new("duration_minutes", "must be positive"),
        ]);
        assert_eq!(err.to_string(), "invalid input: rating, duration_minutes");
    }

    #[tokio::test]
    async fn into_response_maps_status_and_hides_storage_details() {
        let res = AppError::NotFound("workout").into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = AppError::Persistence(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "persistence_error");
        assert_eq!(body["message"], "internal server error");
    }
}
