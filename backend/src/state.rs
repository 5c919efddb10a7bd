use crate::config::{AppConfig, ValidationConfig};
use crate::error::AppError;

/// Shared, read-only application state injected into every handler as
/// `web::Data<AppState>`.
///
/// Handlers open their own store connection per request from
/// `config.database_path`; nothing mutable is shared between requests.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub validation: ValidationConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let validation = ValidationConfig::new(config.max_image_bytes)?;
        Ok(Self { config, validation })
    }
}
