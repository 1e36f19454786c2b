/// Application context and dependency injection
use crate::{
    clock::{Clock, SystemClock},
    config::ServerConfig,
    db,
    directory::DirectoryService,
    error::{DirectoryError, DirectoryResult},
    mailer::{MailTransport, SmtpMailer},
    notifier::Notifier,
    projection::PublicProjection,
    rate_limit::RateLimiter,
    store::{ContactStore, ExtentStore},
    token::TokenAuthority,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub store: Arc<dyn ContactStore>,
    pub directory: DirectoryService,
    pub tokens: TokenAuthority,
    pub notifier: Notifier,
    pub projection: PublicProjection,
    pub rate_limiter: Arc<RateLimiter>,
    /// Serializes mutating directory operations across requests
    pub directory_lock: Arc<Mutex<()>>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> DirectoryResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create data directory if it doesn't exist
        if !config.storage.data_directory.exists() {
            tokio::fs::create_dir_all(&config.storage.data_directory)
                .await
                .map_err(|e| {
                    DirectoryError::Internal(format!(
                        "Failed to create directory {:?}: {}",
                        config.storage.data_directory, e
                    ))
                })?;
        }

        // Initialize directory database
        let pool = db::create_pool(&config.storage.directory_db, db::DatabaseOptions::default()).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let store = Arc::new(ExtentStore::open(pool).await?);

        // Initialize mailer
        let mailer = SmtpMailer::new(config.email.clone())?;
        if !mailer.is_configured() {
            tracing::warn!("Email not configured, magic links will not be delivered");
        }

        Ok(Self::with_parts(
            config,
            store,
            Arc::new(mailer),
            Arc::new(SystemClock),
        ))
    }

    /// Assemble a context from explicit collaborators
    pub fn with_parts(
        config: ServerConfig,
        store: Arc<dyn ContactStore>,
        transport: Arc<dyn MailTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let subject = config
            .email
            .as_ref()
            .map(|e| e.subject.clone())
            .unwrap_or_else(|| crate::config::DEFAULT_MAIL_SUBJECT.to_string());

        let tokens = TokenAuthority::new(store.clone(), clock.clone());
        let notifier = Notifier::new(
            store.clone(),
            tokens.clone(),
            transport,
            clock,
            config.service.public_url.clone(),
            subject,
        );
        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limit));

        Self {
            config: Arc::new(config),
            directory: DirectoryService::new(store.clone()),
            projection: PublicProjection::new(store.clone()),
            store,
            tokens,
            notifier,
            rate_limiter,
            directory_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get service URL
    pub fn service_url(&self) -> &str {
        &self.config.service.public_url
    }
}
