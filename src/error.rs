use axum::http::StatusCode;

use crate::db::dao::{DaoLayerError, DaoOp};

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
    Unavailable(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message)
            | Self::NotFound(message)
            | Self::Internal(message)
            | Self::Unavailable(message) => message.as_str(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl From<DaoLayerError> for AppError {
    fn from(err: DaoLayerError) -> Self {
        match err {
            DaoLayerError::NotFound { .. } => AppError::not_found("Todo not found"),
            DaoLayerError::Cancelled { .. } => {
                AppError::unavailable("Database did not respond in time, please retry")
            }
            DaoLayerError::Db { op, .. } => AppError::internal(failure_message(op)),
        }
    }
}

fn failure_message(op: DaoOp) -> &'static str {
    match op {
        DaoOp::Create => "Failed to create todo",
        DaoOp::Get => "Failed to get todo",
        DaoOp::List => "Failed to list todos",
        DaoOp::Update => "Failed to update todo",
        DaoOp::Delete => "Failed to delete todo",
    }
}
