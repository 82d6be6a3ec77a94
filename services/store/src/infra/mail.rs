//! SMTP delivery for outbox emails.

use anyhow::Context as _;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::domain::repository::MailSender;
use crate::domain::types::MailMessage;

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    /// Build the pooled STARTTLS transport. Connections are opened lazily.
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .with_context(|| format!("smtp relay {}", config.host))?
            .port(config.port);
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            from: config.from.clone(),
        })
    }
}

impl MailSender for SmtpMailer {
    async fn send(&self, message: &MailMessage) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(self.from.parse().context("parse MAIL_FROM")?)
            .to(message.to.parse().context("parse recipient")?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .context("build email")?;
        self.transport.send(email).await.context("smtp send")?;
        Ok(())
    }
}
