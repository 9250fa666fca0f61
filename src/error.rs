//! Application-wide error types.

use thiserror::Error;

use crate::db::DatabaseError;
use crate::llm::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("llm error: {0}")]
    Llm(#[from] ProviderError),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn http_error_display() {
        let e = AppError::Http("bind failed on 0.0.0.0:80".into());
        assert!(e.to_string().contains("bind failed"));
    }

    #[test]
    fn database_error_converts() {
        let e: AppError = DatabaseError::MissingCredentials(vec!["DB_HOST"]).into();
        let msg = e.to_string();
        assert!(msg.starts_with("database error"));
        assert!(msg.contains("DB_HOST"));
    }

    #[test]
    fn logger_error_display() {
        let e = AppError::Logger("already initialized".into());
        assert!(e.to_string().contains("already initialized"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
