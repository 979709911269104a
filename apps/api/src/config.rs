use anyhow::{bail, Context, Result};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CREDENTIALS_PATH: &str = "./firebase-credentials.json";
const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_EMULATOR_PROJECT: &str = "demo-curriculos";
const DEFAULT_ERROR_LOG: &str = "error.log";
/// HS256 keys shorter than the digest size are rejected at startup.
const MIN_SECRET_LEN: usize = 32;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub firebase_credentials_path: String,
    /// Enables password verification on login. Without it login only
    /// checks that the account exists.
    pub firebase_web_api_key: Option<String>,
    pub identity_toolkit_url: String,
    /// `host:port` of a Firebase Auth emulator. When set, no credentials
    /// file is read.
    pub firebase_auth_emulator_host: Option<String>,
    pub firebase_project_id: String,
    pub port: u16,
    pub rust_log: String,
    /// File receiving every `ERROR` event in addition to stdout.
    pub error_log_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let jwt_secret = require("JWT_SECRET")?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            bail!("JWT_SECRET must be at least {MIN_SECRET_LEN} bytes long");
        }

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            database_max_connections: match lookup("DATABASE_MAX_CONNECTIONS") {
                Some(raw) => raw
                    .parse::<u32>()
                    .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
                None => DEFAULT_MAX_CONNECTIONS,
            },
            jwt_secret,
            firebase_credentials_path: lookup("FIREBASE_CREDENTIALS")
                .unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.to_string()),
            firebase_web_api_key: lookup("FIREBASE_WEB_API_KEY").filter(|v| !v.is_empty()),
            identity_toolkit_url: lookup("IDENTITY_TOOLKIT_URL")
                .unwrap_or_else(|| DEFAULT_IDENTITY_TOOLKIT_URL.to_string()),
            firebase_auth_emulator_host: lookup("FIREBASE_AUTH_EMULATOR_HOST")
                .filter(|v| !v.is_empty()),
            firebase_project_id: lookup("FIREBASE_PROJECT_ID")
                .unwrap_or_else(|| DEFAULT_EMULATOR_PROJECT.to_string()),
            port: match lookup("PORT") {
                Some(raw) => raw
                    .parse::<u16>()
                    .context("PORT must be a valid port number")?,
                None => DEFAULT_PORT,
            },
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            error_log_path: lookup("ERROR_LOG")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_ERROR_LOG.to_string()),
        })
    }
}
