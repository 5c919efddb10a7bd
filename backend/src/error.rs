use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use thiserror::Error;

/// Failures that abort a request.
///
/// Problems with what the user typed are never an `AppError`; those travel as
/// per-field results in the submission response.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed enumerated column {column}: {raw:?}")]
    MalformedEnum { column: String, raw: String },

    #[error("Internal consistency fault: {0}")]
    Inconsistent(String),

    #[error("Image {name} could not be verified after {attempts} write attempts")]
    ImageWrite { name: String, attempts: u32 },

    #[error("Malformed multipart payload: {0}")]
    Multipart(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Blocking task failed: {0}")]
    Blocking(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Multipart(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        error!("{}", self);
        let status = self.status_code();
        let body = if status == StatusCode::BAD_REQUEST {
            self.to_string()
        } else {
            "Error interno del servidor".to_string()
        };
        HttpResponse::build(status).body(body)
    }
}
