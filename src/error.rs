/*
 * Responsibility
 * - Application-wide AppError
 * - IntoResponse (HTTP status / JSON error body)
 * - Uniform conversion of repo / service / extractor errors
 */
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::animal::AnimalServiceError;
use crate::services::stable_registry::StableCheckError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },
    #[error("{code}: {message}")]
    Conflict { code: &'static str, message: String },
    #[error("stable service rejected the token")]
    StableUnauthorized,
    #[error("no permission to access stable {stable_id}")]
    StableForbidden { stable_id: i64 },
    #[error("error communicating with the stable service")]
    BadGateway,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::bad_request("VALIDATION_ERROR", message)
    }

    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::StableUnauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::StableForbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::BadGateway => StatusCode::BAD_GATEWAY,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            AppError::BadRequest { code, message } => (code, message),
            AppError::Conflict { code, message } => (code, message),
            AppError::Unauthorized => ("UNAUTHORIZED", "unauthorized".into()),
            AppError::Forbidden => ("FORBIDDEN", "forbidden".into()),
            AppError::NotFound { resource, id } => {
                ("NOT_FOUND", format!("{resource} with id {id} not found."))
            }
            e @ AppError::StableUnauthorized => ("STABLE_UNAUTHORIZED", e.to_string()),
            e @ AppError::StableForbidden { .. } => ("STABLE_FORBIDDEN", e.to_string()),
            e @ AppError::BadGateway => ("BAD_GATEWAY", e.to_string()),
            AppError::Internal => ("INTERNAL_SERVER_ERROR", "internal server error".into()),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::conflict("CONFLICT", "conflict"),
            RepoError::Db(_) => AppError::Internal,
        }
    }
}

impl From<StableCheckError> for AppError {
    fn from(e: StableCheckError) -> Self {
        match e {
            StableCheckError::NotFound { stable_id } => AppError::not_found("stable", stable_id),
            StableCheckError::Forbidden { stable_id } => AppError::StableForbidden { stable_id },
            // Missing header and upstream rejection both mean the caller's token is unusable here
            StableCheckError::MissingAuthorization { .. } | StableCheckError::Unauthorized => {
                AppError::StableUnauthorized
            }
            StableCheckError::Upstream(_) => AppError::BadGateway,
        }
    }
}

impl From<AnimalServiceError> for AppError {
    fn from(e: AnimalServiceError) -> Self {
        match e {
            AnimalServiceError::NotFound { id } => AppError::not_found("animal", id),
            AnimalServiceError::Forbidden { .. } => AppError::Forbidden,
            AnimalServiceError::TagConflict { tag } => {
                AppError::conflict("TAG_CONFLICT", format!("tag '{tag}' is already in use"))
            }
            AnimalServiceError::Stable(e) => e.into(),
            AnimalServiceError::Repo(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::validation(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        AppError::validation(e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_names_the_missing_id() {
        let (status, body) = body_json(AppError::not_found("stable", 5)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert!(body["error"]["message"].as_str().unwrap().contains('5'));
    }

    #[tokio::test]
    async fn stable_errors_map_to_distinct_statuses() {
        let cases = [
            (StableCheckError::NotFound { stable_id: 1 }, StatusCode::NOT_FOUND),
            (StableCheckError::Forbidden { stable_id: 1 }, StatusCode::FORBIDDEN),
            (StableCheckError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                StableCheckError::MissingAuthorization { stable_id: 1 },
                StatusCode::UNAUTHORIZED,
            ),
            (
                StableCheckError::Upstream("connection refused".into()),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn service_errors_keep_not_found_and_forbidden_apart() {
        let not_found = AppError::from(AnimalServiceError::NotFound { id: 9 });
        let forbidden = AppError::from(AnimalServiceError::Forbidden { id: 9 });

        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let (status, body) = body_json(AppError::from(AnimalServiceError::TagConflict {
            tag: "A-1".into(),
        }))
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "TAG_CONFLICT");
    }
}
