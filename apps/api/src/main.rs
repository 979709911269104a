mod auth;
mod config;
mod curriculo;
mod db;
mod errors;
mod extract;
mod identity;
mod logging;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::auth::SigningSecret;
use crate::config::Config;
use crate::curriculo::PgCurriculoStore;
use crate::db::create_pool;
use crate::identity::firebase::FirebaseIdentityProvider;
use crate::identity::service_account::ServiceAccount;
use crate::identity::{IdentityProvider, LoginMode};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging; errors are also written to a file
    let _log_guard = logging::init(&config)?;

    info!("Starting Curriculos API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.database_max_connections).await?;

    // Initialize identity provider
    let identity = build_identity_provider(&config)?;
    match identity.login_mode() {
        LoginMode::VerifyPassword => info!("Login verifies passwords with the identity provider"),
        LoginMode::LookupOnly => warn!(
            "FIREBASE_WEB_API_KEY is not set: login only checks that the account exists \
             and does not verify the password"
        ),
    }

    let secret = SigningSecret::new(config.jwt_secret.clone());
    let state = AppState::new(&secret, identity, Arc::new(PgCurriculoStore::new(db)));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Uses the Auth emulator when `FIREBASE_AUTH_EMULATOR_HOST` is set,
/// otherwise the service-account credentials file.
fn build_identity_provider(config: &Config) -> Result<Arc<dyn IdentityProvider>> {
    let provider = match &config.firebase_auth_emulator_host {
        Some(host) => FirebaseIdentityProvider::emulator(
            host,
            config.firebase_project_id.clone(),
            config.firebase_web_api_key.clone(),
        )?,
        None => {
            let account = ServiceAccount::from_file(&config.firebase_credentials_path)?;
            FirebaseIdentityProvider::new(
                account,
                config.identity_toolkit_url.clone(),
                config.firebase_web_api_key.clone(),
            )?
        }
    };
    Ok(Arc::new(provider))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => warn!("Failed to listen for SIGTERM: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
