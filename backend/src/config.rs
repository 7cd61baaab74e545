use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use dotenvy::dotenv;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    pub addr: String,
    pub port: u16,
    /// `*` allows any origin.
    pub cors_origin: String,
}

/// Where and how to reach the external identity provider (a Keycloak realm).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IdentityConfig {
    pub server_url: String,
    pub realm: String,
    pub client_id: String,
    pub admin_username: String,
    pub admin_password: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

/// Bearer token verification. A realm public key wins over the shared secret.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct JwtConfig {
    pub secret: Option<String>,
    pub public_key_pem: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub web: WebConfig,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    #[serde(default)]
    pub jwt: JwtConfig,
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web: WebConfig {
                addr: "127.0.0.1".to_string(),
                port: 8080,
                cors_origin: "*".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://hotel.db?mode=rwc".to_string(),
                max_connections: default_max_connections(),
            },
            identity: IdentityConfig {
                server_url: "http://localhost:8180".to_string(),
                realm: "hotel-booking".to_string(),
                client_id: "hotel-app".to_string(),
                admin_username: "admin".to_string(),
                admin_password: String::new(),
                connect_timeout_secs: default_connect_timeout(),
                read_timeout_secs: default_read_timeout(),
            },
            jwt: JwtConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, figment::Error> {
        dotenv().ok();

        let config: Self = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("Config.toml")) // For non-sensitive defaults
            .merge(Env::prefixed("APP_").split("__")) // e.g., APP_DATABASE__URL
            .extract()?;

        if config.jwt.secret.is_none() && config.jwt.public_key_pem.is_none() {
            return Err(figment::Error::from(
                "either APP_JWT__SECRET or APP_JWT__PUBLIC_KEY_PEM must be set".to_string(),
            ));
        }

        tracing::info!(
            addr = %config.web.addr,
            port = config.web.port,
            realm = %config.identity.realm,
            "Configuration loaded"
        );

        Ok(config)
    }
}
