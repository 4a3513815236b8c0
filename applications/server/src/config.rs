/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Valid bcrypt cost range (mirrors bcrypt's private `MIN_COST`/`MAX_COST`)
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default)]
    pub notifications: NotificationSettings,

    #[serde(default = "default_events")]
    pub events: EventSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_user_token_days")]
    pub user_token_days: u64,

    #[serde(default = "default_admin_token_days")]
    pub admin_token_days: u64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Admin login is disabled unless both of these are set
    #[serde(default)]
    pub admin_email: Option<String>,

    /// bcrypt hash, see `remotejob-server hash-password`
    #[serde(default)]
    pub admin_password_hash: Option<String>,
}

/// SMTP delivery of admin notifications
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub smtp_server: Option<String>,

    #[serde(default)]
    pub smtp_username: Option<String>,

    #[serde(default)]
    pub smtp_password: Option<String>,

    /// Recipient of admin notifications
    #[serde(default)]
    pub admin_email: Option<String>,

    #[serde(default = "default_from_name")]
    pub from_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventSettings {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl ServerConfig {
    /// Load configuration from `config.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit file (if given) and the environment
    ///
    /// Environment variables use the `REMOTEJOB` prefix and `__` between
    /// levels, e.g. `REMOTEJOB__AUTH__JWT_SECRET`.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from("config.toml");
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("REMOTEJOB")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set REMOTEJOB__AUTH__JWT_SECRET)".to_string(),
            ));
        }

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.auth.bcrypt_cost) {
            return Err(ServerError::Config(format!(
                "bcrypt_cost must be between {} and {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST
            )));
        }

        if self.auth.admin_email.is_some() != self.auth.admin_password_hash.is_some() {
            return Err(ServerError::Config(
                "admin_email and admin_password_hash must be set together".to_string(),
            ));
        }

        if self.notifications.enabled {
            let n = &self.notifications;
            if n.smtp_server.is_none()
                || n.smtp_username.is_none()
                || n.smtp_password.is_none()
                || n.admin_email.is_none()
            {
                return Err(ServerError::Config(
                    "notifications require smtp_server, smtp_username, smtp_password and admin_email"
                        .to_string(),
                ));
            }
        }

        if self.events.channel_capacity == 0 {
            return Err(ServerError::Config(
                "events.channel_capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/remotejob.db".to_string()
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        jwt_secret: String::new(),
        user_token_days: default_user_token_days(),
        admin_token_days: default_admin_token_days(),
        bcrypt_cost: default_bcrypt_cost(),
        admin_email: None,
        admin_password_hash: None,
    }
}

fn default_user_token_days() -> u64 {
    7
}

fn default_admin_token_days() -> u64 {
    30
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_from_name() -> String {
    "RemoteJob Platform".to_string()
}

fn default_events() -> EventSettings {
    EventSettings {
        channel_capacity: default_channel_capacity(),
    }
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            auth: default_auth(),
            notifications: NotificationSettings {
                from_name: default_from_name(),
                ..Default::default()
            },
            events: default_events(),
        }
    }
}
