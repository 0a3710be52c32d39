use std::env;

use gmk_common::{parse_boolean_flag, Secret};
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use razorpay_tools::RazorpayConfig;

use crate::errors::ServerError;

const DEFAULT_GMK_HOST: &str = "127.0.0.1";
const DEFAULT_GMK_PORT: u16 = 8480;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address for webhook peer
    /// logging, rather than the connection's remote address.
    pub trust_proxy_headers: bool,
    /// Razorpay gateway configuration, including the webhook signing secret.
    pub razorpay: RazorpayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_GMK_HOST.to_string(),
            port: DEFAULT_GMK_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            trust_proxy_headers: false,
            razorpay: RazorpayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("GMK_HOST").ok().unwrap_or_else(|| DEFAULT_GMK_HOST.into());
        let port = env::var("GMK_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for GMK_PORT. {e} Using the default, {DEFAULT_GMK_PORT}, instead."
                    );
                    DEFAULT_GMK_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_GMK_PORT);
        let database_url = env::var("GMK_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ GMK_DATABASE_URL is not set. Please set it to the URL for the marketplace database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let razorpay = RazorpayConfig::new_from_env_or_default();
        let trust_proxy_headers = parse_boolean_flag(env::var("GMK_TRUST_PROXY_HEADERS").ok(), false);
        Self { host, port, database_url, auth, trust_proxy_headers, razorpay }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The secret used to sign and verify access tokens (HMAC-SHA256).
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. All issued tokens \
             become invalid when the server restarts. Set GMK_JWT_SECRET for production use. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("GMK_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [GMK_JWT_SECRET]")))?;
        if secret.is_empty() {
            return Err(ServerError::ConfigurationError("GMK_JWT_SECRET is empty".to_string()));
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------

/// A subset of the server configuration that is used to configure the server's behaviour. Generally we try to keep
/// this as small as possible, and exclude secrets to avoid passing sensitive information around the system.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOptions {
    pub trust_proxy_headers: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { trust_proxy_headers: config.trust_proxy_headers }
    }
}

//-------------------------------------------------  WebhookSecret  ----------------------------------------------------

/// The webhook signing secret, wrapped so it can live in app data without colliding with other `String` entries and
/// without leaking into debug output.
#[derive(Clone, Debug)]
pub struct WebhookSecret(pub Secret<String>);

impl WebhookSecret {
    pub fn reveal(&self) -> &str {
        self.0.reveal()
    }
}
