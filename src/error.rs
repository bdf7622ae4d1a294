use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::models::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("{entity} not found") })),
            )
                .into_response(),
            AppError::Validation(err) => {
                tracing::debug!(error = %err, "rejected request");
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": ["validation errors"] })))
                    .into_response()
            },
            AppError::Db(err) => {
                tracing::error!(error = %err, "database error");
                let body = Json(json!({ "error": "internal server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            },
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_are_server_errors() {
        let err = AppError::from(sea_orm::DbErr::Custom("disk gone".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_and_missing_rows_are_client_errors() {
        let err = AppError::from(ValidationError::RatingOutOfRange(9));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = AppError::NotFound("Guest");
        assert_eq!(err.to_string(), "Guest not found");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
