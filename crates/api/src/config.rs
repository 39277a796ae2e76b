use dropwatch_provider::http::ProviderConfig;

/// Server configuration loaded from environment variables.
///
/// Network settings have sensible defaults suitable for local
/// development; the provider application credentials must be set
/// explicitly.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight reconciliation passes.
    pub shutdown_timeout_secs: u64,
    /// Storage-provider application settings (API bases, key, secret).
    ///
    /// The app secret doubles as the webhook HMAC key and the OAuth
    /// state signing key.
    pub provider: ProviderConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                  | Default                                        |
    /// |--------------------------|------------------------------------------------|
    /// | `HOST`                   | `0.0.0.0`                                      |
    /// | `PORT`                   | `3000`                                         |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`                        |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                                           |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                                           |
    /// | `PROVIDER_APP_KEY`       | — (required)                                   |
    /// | `PROVIDER_APP_SECRET`    | — (required)                                   |
    /// | `PROVIDER_API_BASE`      | `https://api.dropboxapi.com`                   |
    /// | `PROVIDER_AUTHORIZE_URL` | `https://www.dropbox.com/oauth2/authorize`     |
    /// | `OAUTH_REDIRECT_URL`     | `http://localhost:3000/api/v1/link/callback`   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let provider = ProviderConfig {
            api_base: std::env::var("PROVIDER_API_BASE")
                .unwrap_or_else(|_| "https://api.dropboxapi.com".into()),
            authorize_url: std::env::var("PROVIDER_AUTHORIZE_URL")
                .unwrap_or_else(|_| "https://www.dropbox.com/oauth2/authorize".into()),
            app_key: std::env::var("PROVIDER_APP_KEY").expect("PROVIDER_APP_KEY must be set"),
            app_secret: std::env::var("PROVIDER_APP_SECRET")
                .expect("PROVIDER_APP_SECRET must be set"),
            redirect_url: std::env::var("OAUTH_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:3000/api/v1/link/callback".into()),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            provider,
        }
    }
}
