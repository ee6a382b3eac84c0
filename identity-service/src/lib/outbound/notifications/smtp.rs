use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::Message;
use lettre::SmtpTransport;
use lettre::Transport;

use crate::config::SmtpConfig;
use crate::domain::auth::errors::DeliveryError;
use crate::domain::auth::ports::Notifier;
use crate::domain::identity::models::Identity;

/// SMTP-backed notifier.
///
/// The transport is blocking; sends run on the blocking thread pool so the
/// async runtime is never stalled on the mail server.
pub struct SmtpNotifier {
    mailer: SmtpTransport,
    from: Mailbox,
    client_url: String,
    verify_expiration_minutes: i64,
}

impl SmtpNotifier {
    pub fn new(
        config: &SmtpConfig,
        verify_expiration_minutes: i64,
    ) -> Result<Self, anyhow::Error> {
        let mailer = SmtpTransport::relay(&config.host)?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .port(config.port)
            .build();

        let from: Mailbox = config.from.parse()?;

        Ok(Self {
            mailer,
            from,
            client_url: config.client_url.clone(),
            verify_expiration_minutes,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_verification_email(
        &self,
        identity: &Identity,
        raw_token: &str,
    ) -> Result<(), DeliveryError> {
        let verification_url = format!(
            "{}/auth/verify-email?token={}",
            self.client_url, raw_token
        );

        let email = Message::builder()
            .from(self.from.clone())
            .to(identity
                .email
                .as_str()
                .parse()
                .map_err(|e| DeliveryError(format!("Invalid recipient address: {}", e)))?)
            .subject("Verify your email address")
            .header(ContentType::TEXT_HTML)
            .body(format!(
                "<h1>Email Verification</h1>\
                 <p>Please click the link below to verify your email address:</p>\
                 <a href=\"{}\">Verify Email</a>\
                 <p>This link will expire in {} minutes.</p>",
                verification_url, self.verify_expiration_minutes
            ))
            .map_err(|e| DeliveryError(format!("Failed to build email: {}", e)))?;

        let mailer = self.mailer.clone();
        let outcome = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| DeliveryError(format!("Send task failed: {}", e)))?;

        outcome.map_err(|e| DeliveryError(e.to_string()))?;

        tracing::info!(identity_id = %identity.id, "Verification email sent");
        Ok(())
    }
}
