/// Magic-link secret lifecycle
///
/// A record moves from "no token" to "active" when a secret is issued and
/// becomes "expired" once `secret_valid_until` has passed. Issuing again
/// makes it active with a new secret.
use crate::{
    clock::Clock,
    error::DirectoryResult,
    secret::{generate_secret, secrets_match},
    store::ContactStore,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Validity of secrets sent out by an administrator
pub const SECRET_VALIDITY_ADMIN_SENDING: Duration = Duration::days(2);

/// Validity of secrets requested by the user on the login page
pub const SECRET_VALIDITY_USER_REQUEST: Duration = Duration::minutes(15);

/// Outcome of a login check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginResult {
    Success,
    Wrong,
    Expired,
}

/// Issues and validates magic-link secrets
#[derive(Clone)]
pub struct TokenAuthority {
    store: Arc<dyn ContactStore>,
    clock: Arc<dyn Clock>,
}

impl TokenAuthority {
    pub fn new(store: Arc<dyn ContactStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create a new secret for the contact, valid for `validity`, and persist it
    ///
    /// Returns an empty string and changes nothing if the email is unknown.
    pub async fn issue(&self, email: &str, validity: Duration) -> DirectoryResult<String> {
        let secret = self.rotate(email, validity).await?;
        if !secret.is_empty() {
            self.store.persist().await?;
        }
        Ok(secret)
    }

    /// Like `issue`, but leaves the change in the working set
    ///
    /// For batch callers that persist once at the end.
    pub(crate) async fn rotate(&self, email: &str, validity: Duration) -> DirectoryResult<String> {
        let Some(mut record) = self.store.find_by_email(email).await? else {
            return Ok(String::new());
        };

        let secret = generate_secret();
        record.secret = secret.clone();
        record.secret_valid_until = Some(self.clock.now() + validity);
        self.store.save(&record).await?;

        tracing::debug!(email, "Issued new secret");
        Ok(secret)
    }

    /// Check an email/secret pair
    pub async fn validate(
        &self,
        email: Option<&str>,
        secret: Option<&str>,
    ) -> DirectoryResult<LoginResult> {
        let (Some(email), Some(secret)) = (email, secret) else {
            return Ok(LoginResult::Wrong);
        };
        if email.is_empty() || secret.is_empty() {
            return Ok(LoginResult::Wrong);
        }

        let Some(record) = self.store.find_by_email(email).await? else {
            return Ok(LoginResult::Wrong);
        };

        // An empty stored secret never matches, even against an empty input
        if record.secret.is_empty() || !secrets_match(&record.secret, secret) {
            return Ok(LoginResult::Wrong);
        }

        match record.secret_valid_until {
            Some(valid_until) if valid_until > self.clock.now() => Ok(LoginResult::Success),
            _ => Ok(LoginResult::Expired),
        }
    }
}
