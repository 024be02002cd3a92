use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub table: TableConfig,
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub table_name: String,
    /// Directory for the table snapshot; in-memory only when unset
    pub data_dir: Option<PathBuf>,
    pub record_ttl_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub user_pool_id: String,
    pub client_id: String,
    /// Header through which the upstream gateway forwards verified claims
    pub claims_header: String,
    /// Shared secret the gateway sends alongside forwarded claims. Claims
    /// headers are ignored while this is unset.
    #[serde(skip_serializing)]
    pub forward_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub object_root: PathBuf,
    /// HTTP object store endpoint; takes precedence over `object_root`
    pub object_endpoint: Option<String>,
}

impl AuthConfig {
    /// `user pool <id> (client <id>)` for startup logs, `None` when unset
    pub fn pool_summary(&self) -> Option<String> {
        if self.user_pool_id.is_empty() {
            return None;
        }
        let client = if self.client_id.is_empty() { "-" } else { self.client_id.as_str() };
        Some(format!("user pool {} (client {})", self.user_pool_id, client))
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Table overrides
        if let Ok(v) = env::var("TABLE_NAME") {
            if !v.trim().is_empty() {
                self.table.table_name = v;
            }
        }
        if let Ok(v) = env::var("WEATHER_DATA_DIR") {
            self.table.data_dir = Some(PathBuf::from(v)).filter(|p| !p.as_os_str().is_empty());
        }
        if let Ok(v) = env::var("RECORD_TTL_HOURS") {
            self.table.record_ttl_hours = v.parse().unwrap_or(self.table.record_ttl_hours);
        }

        // Identity provider overrides
        if let Ok(v) = env::var("USER_POOL_ID") {
            self.auth.user_pool_id = v;
        }
        if let Ok(v) = env::var("USER_POOL_CLIENT_ID") {
            self.auth.client_id = v;
        }
        if let Ok(v) = env::var("AUTH_CLAIMS_HEADER") {
            self.auth.claims_header = v.to_ascii_lowercase();
        }
        if let Ok(v) = env::var("AUTH_FORWARD_SECRET") {
            self.auth.forward_secret = Some(v).filter(|s| !s.trim().is_empty());
        }

        // Server overrides
        if let Some(port) = env::var("WEATHER_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Ingest overrides
        if let Ok(v) = env::var("OBJECT_STORE_ROOT") {
            self.ingest.object_root = PathBuf::from(v);
        }
        if let Ok(v) = env::var("OBJECT_STORE_ENDPOINT") {
            self.ingest.object_endpoint = Some(v).filter(|s| !s.trim().is_empty());
        }

        self
    }

    fn base(environment: Environment, enable_request_logging: bool) -> Self {
        Self {
            environment,
            table: TableConfig {
                table_name: "weather-data".to_string(),
                data_dir: None,
                record_ttl_hours: 24,
            },
            auth: AuthConfig {
                user_pool_id: String::new(),
                client_id: String::new(),
                claims_header: "x-authorizer-claims".to_string(),
                forward_secret: None,
            },
            server: ServerConfig {
                port: 3000,
                enable_request_logging,
            },
            ingest: IngestConfig {
                object_root: PathBuf::from("objects"),
                object_endpoint: None,
            },
        }
    }

    fn development() -> Self {
        Self::base(Environment::Development, true)
    }

    fn staging() -> Self {
        Self::base(Environment::Staging, true)
    }

    fn production() -> Self {
        let mut config = Self::base(Environment::Production, false);
        config.table.data_dir = Some(PathBuf::from("/var/lib/weather-api"));
        config
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
