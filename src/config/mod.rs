#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{RaffleError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Connection string that selects the in-memory store instead of a database.
pub const MEMORY_DATABASE_URL: &str = "memory";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub raffle: RaffleConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://raffle.db?mode=rwc".to_string(),
            max_connections: 5,
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_DATABASE_URL
    }

    /// Maintenance commands write through a real database; the in-memory store dies with the process.
    pub fn require_persistent(&self) -> Result<()> {
        if self.is_memory() {
            return Err(RaffleError::InvalidConfigValueError {
                field: "database.url".to_string(),
                value: self.url.clone(),
                reason: "this command needs a persistent database, pass --database-url".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub password_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            access_token_minutes: 60,
            refresh_token_days: 1,
            password_iterations: 260_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    Brevo,
    /// Write messages to the log instead of sending them.
    #[default]
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub backend: MailBackend,
    pub api_url: String,
    pub api_key: Option<String>,
    pub sender_email: String,
    pub sender_name: Option<String>,
    pub frontend_url: String,
    pub timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            backend: MailBackend::Log,
            api_url: "https://api.brevo.com/v3/smtp/email".to_string(),
            api_key: None,
            sender_email: "noreply@example.com".to_string(),
            sender_name: None,
            frontend_url: "http://localhost:3000".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaffleConfig {
    pub campaign_name: String,
    pub organizer: String,
    pub prize_description: String,
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            campaign_name: "Valentine's Day Raffle".to_string(),
            organizer: "The Raffle Team".to_string(),
            prize_description: "Two-night all-inclusive stay for a couple at a hotel".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub json: bool,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RaffleError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RaffleError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BREVO_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RaffleError::ConfigError {
            message: format!("invalid substitution pattern: {e}"),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.auth.jwt_secret == AuthConfig::default().jwt_secret
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("server.host", &self.server.host)?;
        validation::validate_positive_number("server.port", u64::from(self.server.port), 1)?;

        validation::validate_non_empty_string("database.url", &self.database.url)?;
        validation::validate_range("database.max_connections", self.database.max_connections, 1, 100)?;

        validation::validate_non_empty_string("auth.jwt_secret", &self.auth.jwt_secret)?;
        validation::validate_range("auth.access_token_minutes", self.auth.access_token_minutes, 1, 1440)?;
        validation::validate_range("auth.refresh_token_days", self.auth.refresh_token_days, 1, 30)?;
        validation::validate_positive_number(
            "auth.password_iterations",
            u64::from(self.auth.password_iterations),
            1_000,
        )?;

        validation::validate_url("mail.frontend_url", &self.mail.frontend_url)?;
        validation::validate_email(&self.mail.sender_email).map_err(|_| {
            RaffleError::InvalidConfigValueError {
                field: "mail.sender_email".to_string(),
                value: self.mail.sender_email.clone(),
                reason: "Invalid email address".to_string(),
            }
        })?;
        if self.mail.backend == MailBackend::Brevo {
            validation::validate_url("mail.api_url", &self.mail.api_url)?;
            let key = validation::validate_required_field("mail.api_key", &self.mail.api_key)?;
            validation::validate_non_empty_string("mail.api_key", key)?;
            validation::validate_range("mail.timeout_seconds", self.mail.timeout_seconds, 1, 120)?;
        }

        validation::validate_non_empty_string("raffle.prize_description", &self.raffle.prize_description)?;
        Ok(())
    }
}
