//! Outbound transactional email
//!
//! The only mail this service sends is the account verification code. The
//! transport sits behind a trait so request handlers can be exercised without
//! a relay.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;
use tvr_common::{Error, Result};

/// Transactional mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Send the verification code to a freshly registered (or re-requesting) user
pub async fn send_verification_email(mailer: &dyn Mailer, email: &str, code: &str) -> Result<()> {
    let subject = "Verify your account";
    let body = format!("Your verification code is: {}", code);
    mailer.send(email, subject, &body).await
}

/// SMTP-backed mailer
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build from environment variables
    ///
    /// Reads TVR_SMTP_RELAY, TVR_SMTP_USERNAME, TVR_SMTP_PASSWORD and
    /// TVR_MAIL_FROM. Returns None when no relay is configured, in which case
    /// the caller should fall back to [`LogMailer`].
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(relay) = std::env::var("TVR_SMTP_RELAY") else {
            return Ok(None);
        };

        let from: Mailbox = std::env::var("TVR_MAIL_FROM")
            .unwrap_or_else(|_| "no-reply@tvr.example".to_string())
            .parse()
            .map_err(|e| Error::Config(format!("Invalid TVR_MAIL_FROM: {}", e)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&relay)
            .map_err(|e| Error::Config(format!("Invalid SMTP relay '{}': {}", relay, e)))?;

        if let (Ok(username), Ok(password)) = (
            std::env::var("TVR_SMTP_USERNAME"),
            std::env::var("TVR_SMTP_PASSWORD"),
        ) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Some(Self {
            transport: builder.build(),
            from,
        }))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| Error::InvalidInput(format!("Invalid recipient '{}': {}", to, e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| Error::Internal(format!("Failed to build message: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| Error::Internal(format!("Failed to send mail: {}", e)))?;

        Ok(())
    }
}

/// Development fallback that logs instead of sending
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        info!("Mail to {} [{}]: {}", to, subject, body);
        Ok(())
    }
}
