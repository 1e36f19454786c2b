/// Configuration management for the address directory
use crate::error::{DirectoryError, DirectoryResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub email: Option<EmailConfig>,
    pub rate_limit: RateLimitSettings,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Base URL that magic links point at
    pub public_url: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub directory_db: PathBuf,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Bearer token for the admin endpoints
    pub admin_token: String,
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from_address: String,
    pub subject: String,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub public_rps: u32,
    pub admin_rps: u32,
    pub burst_size: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

pub const DEFAULT_MAIL_SUBJECT: &str = "Your entry in the address directory";

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> DirectoryResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("ADRESSEN_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("ADRESSEN_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| DirectoryError::Validation("Invalid port number".to_string()))?;
        let public_url = env::var("ADRESSEN_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", hostname, port));

        let data_directory: PathBuf = env::var("ADRESSEN_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let directory_db = env::var("ADRESSEN_DIRECTORY_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("adressen.sqlite"));

        let admin_token = env::var("ADRESSEN_ADMIN_TOKEN")
            .map_err(|_| DirectoryError::Validation("Admin token required".to_string()))?;

        let email = if let Ok(smtp_url) = env::var("ADRESSEN_EMAIL_SMTP_URL") {
            Some(EmailConfig {
                smtp_url,
                from_address: env::var("ADRESSEN_EMAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| format!("noreply@{}", hostname)),
                subject: env::var("ADRESSEN_EMAIL_SUBJECT")
                    .unwrap_or_else(|_| DEFAULT_MAIL_SUBJECT.to_string()),
            })
        } else {
            None
        };

        let rate_limit_enabled = env::var("ADRESSEN_RATE_LIMITS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);
        let public_rps = env::var("ADRESSEN_RATE_LIMIT_PUBLIC_RPS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);
        let admin_rps = env::var("ADRESSEN_RATE_LIMIT_ADMIN_RPS")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .unwrap_or(100);
        let burst_size = env::var("ADRESSEN_RATE_LIMIT_BURST")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .unwrap_or(20);

        let log_level = env::var("ADRESSEN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_json = env::var("ADRESSEN_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                public_url,
            },
            storage: StorageConfig {
                data_directory,
                directory_db,
            },
            authentication: AuthConfig { admin_token },
            email,
            rate_limit: RateLimitSettings {
                enabled: rate_limit_enabled,
                public_rps,
                admin_rps,
                burst_size,
            },
            logging: LoggingConfig {
                level: log_level,
                json: log_json,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.service.hostname.is_empty() {
            return Err(DirectoryError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.authentication.admin_token.len() < 32 {
            return Err(DirectoryError::Validation(
                "Admin token must be at least 32 characters".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "localhost".to_string(),
            port: 8080,
            public_url: "http://adressen.test".to_string(),
        },
        storage: StorageConfig {
            data_directory: PathBuf::from("./data"),
            directory_db: PathBuf::from(":memory:"),
        },
        authentication: AuthConfig {
            admin_token: "test-admin-token-for-testing-only".to_string(),
        },
        email: None,
        rate_limit: RateLimitSettings {
            enabled: false,
            public_rps: 10,
            admin_rps: 100,
            burst_size: 20,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            json: false,
        },
    }
}
