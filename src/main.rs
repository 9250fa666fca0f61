//! ismart backend: service entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present), overriding inherited variables
//!   2. Load settings
//!   3. Init logger (`RUST_LOG`, else `APP_LOG_LEVEL`)
//!   4. Build the database engine (fatal on missing credentials)
//!   5. Build the chat client
//!   6. Serve HTTP until Ctrl-C, then drain the pool

use std::sync::Arc;

use ismart_backend::http::{self, AppState};
use ismart_backend::{AppError, ChatClient, Engine, SessionProvider, Settings, logger};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present; ignore errors (file is optional).
    let _ = dotenvy::dotenv_override();

    let settings = Settings::from_env();
    logger::init(&settings.server.log_level)?;

    let engine = Engine::build(&settings.database)?;
    let chat = ChatClient::build(&settings.azure_openai)?;

    info!(
        database = %engine.redacted_url(),
        deployment = %settings.azure_openai.deployment,
        bind = %settings.server.bind,
        "settings loaded"
    );

    let state = AppState {
        settings: Arc::new(settings),
        sessions: SessionProvider::new(engine.clone()),
        chat,
    };

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested");
                signal.cancel();
            }
            Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
        }
    });

    let served = http::serve(state, shutdown).await;
    engine.close().await;
    served
}
