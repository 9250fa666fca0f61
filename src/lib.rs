// Library root: exposes the adapters to request-handling code and tests.
// The binary entry point is src/main.rs.

pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod logger;

#[cfg(feature = "http")]
pub mod http;

pub use config::Settings;
pub use db::mysql::Engine;
pub use db::{ScopedSession, Session, SessionFactory, SessionProvider};
pub use error::AppError;
pub use llm::{ChatClient, LLM_ERROR_PREFIX};
