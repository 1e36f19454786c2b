/// Magic-link mail dispatch with per-address throttling
use crate::{
    clock::Clock,
    error::DirectoryResult,
    mailer::MailTransport,
    store::ContactStore,
    token::TokenAuthority,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Minimum interval between two mails to the same address
pub const THROTTLE_WINDOW: Duration = Duration::seconds(60);

const MAIL_TEMPLATE: &str = include_str!("../templates/magic_link.txt");
const LINK_PLACEHOLDER: &str = "{{Link}}";

/// Outcome of a dispatch, per address or aggregated over a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendEmailResult {
    Success,
    AlreadySent,
    EmailNotKnown,
}

/// Outcome for one address of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressOutcome {
    pub email: String,
    pub result: SendEmailResult,
}

/// Result of a batch dispatch
///
/// `result` is the last non-success outcome of the batch, or `Success`
/// when there was none. `outcomes` lists every address that contained
/// an `@`, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub result: SendEmailResult,
    pub outcomes: Vec<AddressOutcome>,
}

/// Sends magic-link mails
#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn ContactStore>,
    tokens: TokenAuthority,
    transport: Arc<dyn MailTransport>,
    clock: Arc<dyn Clock>,
    public_url: String,
    subject: String,
}

impl Notifier {
    pub fn new(
        store: Arc<dyn ContactStore>,
        tokens: TokenAuthority,
        transport: Arc<dyn MailTransport>,
        clock: Arc<dyn Clock>,
        public_url: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            store,
            tokens,
            transport,
            clock,
            public_url: public_url.into(),
            subject: subject.into(),
        }
    }

    /// Send magic links to the given addresses, returning the aggregate result
    pub async fn dispatch(
        &self,
        emails: &[String],
        validity: Duration,
    ) -> DirectoryResult<SendEmailResult> {
        Ok(self.dispatch_detailed(emails, validity).await?.result)
    }

    /// Send magic links to the given addresses
    ///
    /// Every known address gets a fresh secret, even when the mail itself is
    /// held back by the throttle. The send timestamp is written before the
    /// transport is called, so a failed attempt still counts for the
    /// throttle. Changes are persisted once after the batch, also when the
    /// transport fails part way through.
    pub async fn dispatch_detailed(
        &self,
        emails: &[String],
        validity: Duration,
    ) -> DirectoryResult<DispatchReport> {
        let report = self.send_all(emails, validity).await;
        let persisted = self.store.persist().await;

        let report = report?;
        persisted?;

        Ok(report)
    }

    async fn send_all(&self, emails: &[String], validity: Duration) -> DirectoryResult<DispatchReport> {
        let mut report = DispatchReport {
            result: SendEmailResult::Success,
            outcomes: Vec::new(),
        };

        for email in emails.iter().map(|e| e.trim()) {
            if !email.contains('@') {
                continue;
            }

            let result = self.send_one(email, validity).await?;
            if result != SendEmailResult::Success {
                report.result = result;
            }
            report.outcomes.push(AddressOutcome {
                email: email.to_string(),
                result,
            });
        }

        Ok(report)
    }

    async fn send_one(&self, email: &str, validity: Duration) -> DirectoryResult<SendEmailResult> {
        self.tokens.rotate(email, validity).await?;

        let Some(mut record) = self.store.find_by_email(email).await? else {
            tracing::debug!(email, "Mail requested for unknown address");
            return Ok(SendEmailResult::EmailNotKnown);
        };

        let now = self.clock.now();
        if record
            .last_email_sent_out
            .is_some_and(|last| last > now - THROTTLE_WINDOW)
        {
            tracing::debug!(email, "Mail already sent within the throttle window");
            return Ok(SendEmailResult::AlreadySent);
        }

        record.last_email_sent_out = Some(now);
        self.store.save(&record).await?;

        let body = self.render_body(email, &record.secret);
        self.transport.send(email, &self.subject, &body).await?;

        tracing::info!("Sending mail to: {}", email);
        Ok(SendEmailResult::Success)
    }

    /// Deep link that logs the holder in
    pub fn login_link(&self, email: &str, secret: &str) -> String {
        format!(
            "{}/UserLogin/{}/{}",
            self.public_url.trim_end_matches('/'),
            urlencoding::encode(email),
            secret
        )
    }

    fn render_body(&self, email: &str, secret: &str) -> String {
        MAIL_TEMPLATE.replace(LINK_PLACEHOLDER, &self.login_link(email, secret))
    }
}
