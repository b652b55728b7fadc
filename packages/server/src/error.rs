use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use intake_common::response::{
    GENERIC_FAILURE_MESSAGE, INVALID_RESOURCES_MESSAGE, SAVE_FAILED_MESSAGE, SubmitResponse,
    UPLOAD_FAILED_MESSAGE,
};
use intake_common::storage::StorageError;
use sea_orm::DbErr;

/// Application-level error type.
///
/// Every variant renders as the `{ success: false, message }` envelope.
/// Detail strings are logged, never sent to the client, except for
/// `Validation` and `NotFound` whose text is meant for the applicant.
#[derive(Debug)]
pub enum AppError {
    /// The `resources` part is not a JSON list of resource items.
    InvalidResources(String),
    /// A field, the attachment, or the multipart framing is unacceptable.
    Validation(String),
    NotFound(String),
    /// Archiving the slide deck failed; nothing was persisted.
    Upload(String),
    /// Writing the application row failed.
    Persistence(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, SubmitResponse) {
        match self {
            AppError::InvalidResources(detail) => {
                tracing::warn!("Rejected resources payload: {}", detail);
                (
                    StatusCode::BAD_REQUEST,
                    SubmitResponse::failure(INVALID_RESOURCES_MESSAGE),
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, SubmitResponse::failure(msg)),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, SubmitResponse::failure(msg)),
            AppError::Upload(detail) => {
                tracing::error!("File upload error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SubmitResponse::failure(UPLOAD_FAILED_MESSAGE),
                )
            }
            AppError::Persistence(detail) => {
                tracing::error!("Database insert error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SubmitResponse::failure(SAVE_FAILED_MESSAGE),
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SubmitResponse::failure(GENERIC_FAILURE_MESSAGE),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Upload(err.to_string())
    }
}
