//! # Error Handling
//!
//! Every failure leaving the API is rendered as `application/problem+json`
//! carrying a stable [`ErrorCode`] and the request's trace id.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use utoipa::ToSchema;

use crate::eligibility::EligibilityError;
use crate::models::ApplicationStatus;
use crate::telemetry;

/// Machine-readable failure category, serialized in SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationFailed,
    Forbidden,
    NotFound,
    NoOpenSlots,
    DatabaseUnavailable,
    InternalServerError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            Self::ValidationFailed | Self::NoOpenSlots => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::DatabaseUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Problem body returned for every failed request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Request trace id, or a generated `corr-` id outside a request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: code.status(),
            code,
            message: message.into(),
            details: None,
            trace_id: Some(telemetry::current_trace_id().unwrap_or_else(correlation_id)),
        }
    }

    pub fn with_details(mut self, details: impl Into<Value>) -> Self {
        self.details = Some(details.into());
        self
    }
}

fn correlation_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("corr-{}", &id[..8])
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        let mut response = (status, axum::Json(self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

/// Errors raised by the data-access layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("invalid stored data: {0}")]
    Validation(String),
}

impl RepositoryError {
    pub fn database_error(error: sea_orm::DbErr) -> Self {
        Self::Database(error)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Failure modes of the acceptance transaction.
#[derive(Debug, Error)]
pub enum AcceptanceError {
    #[error("No open slots available for this team")]
    NoOpenSlots,
    #[error("application is already {status}")]
    AlreadyDecided { status: ApplicationStatus },
    #[error("application {0} not found")]
    ApplicationNotFound(String),
    #[error("posting {0} not found")]
    PostingNotFound(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sea_orm::DbErr> for AcceptanceError {
    fn from(error: sea_orm::DbErr) -> Self {
        Self::Repository(RepositoryError::Database(error))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        tracing::error!(error = ?error, "Unhandled internal error");
        internal_error()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Request body must be sent as application/json".to_string()
            }
            JsonRejection::JsonSyntaxError(_) => {
                format!("Malformed JSON body: {}", rejection.body_text())
            }
            JsonRejection::JsonDataError(_) => {
                format!("Unexpected JSON shape: {}", rejection.body_text())
            }
            _ => "Unreadable request body".to_string(),
        };
        bad_request(&message)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        bad_request(&format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Repository database error");
                internal_error()
            }
            RepositoryError::Validation(message) => {
                tracing::error!(%message, "Repository returned invalid data");
                internal_error()
            }
        }
    }
}

impl From<AcceptanceError> for ApiError {
    fn from(error: AcceptanceError) -> Self {
        match error {
            AcceptanceError::NoOpenSlots => {
                ApiError::new(ErrorCode::NoOpenSlots, AcceptanceError::NoOpenSlots.to_string())
            }
            AcceptanceError::AlreadyDecided { status } => {
                validation_error(&format!("Application is already {status}"), json!({ "status": status }))
            }
            AcceptanceError::ApplicationNotFound(_) => not_found("Application not found"),
            AcceptanceError::PostingNotFound(_) => not_found("Hackathon not found"),
            AcceptanceError::Repository(inner) => inner.into(),
        }
    }
}

impl From<EligibilityError> for ApiError {
    fn from(error: EligibilityError) -> Self {
        match error {
            EligibilityError::PostingNotFound(_) => not_found("Hackathon not found"),
            EligibilityError::ApplicationNotFound(_) => not_found("Application not found"),
            EligibilityError::Forbidden(_) => forbidden("Only the posting owner can decide applications"),
            EligibilityError::InvalidStatus(status) => validation_error(
                "Invalid status",
                json!({ "status": status, "allowed": ["ACCEPTED", "REJECTED"] }),
            ),
            EligibilityError::Acceptance(inner) => inner.into(),
            EligibilityError::Repository(inner) => inner.into(),
        }
    }
}

/// 500 with no internal detail.
pub fn internal_error() -> ApiError {
    ApiError::new(ErrorCode::InternalServerError, "An internal error occurred")
}

pub fn forbidden(message: &str) -> ApiError {
    ApiError::new(ErrorCode::Forbidden, message)
}

pub fn not_found(message: &str) -> ApiError {
    ApiError::new(ErrorCode::NotFound, message)
}

pub fn bad_request(message: &str) -> ApiError {
    ApiError::new(ErrorCode::ValidationFailed, message)
}

/// 400 carrying field-level details.
pub fn validation_error(message: &str, details: Value) -> ApiError {
    bad_request(message).with_details(details)
}
