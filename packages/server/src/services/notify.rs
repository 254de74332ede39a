//! Outbound email. Sending happens after the transaction that produced the
//! emails has committed; failures are logged and never reach the caller.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use common::{ActivityType, TargetKind};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use sea_orm::DatabaseConnection;

use crate::config::EmailConfig;
use crate::services::activity::{ActivityService, NewActivity};

/// An email ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub recipient_id: i32,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

/// SMTP delivery through lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.smtp_host.as_str())
                .port(config.smtp_port);
        if let (Some(user), Some(pass)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        let from = config
            .from_address
            .parse()
            .with_context(|| format!("invalid from address '{}'", config.from_address))?;
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let to: Mailbox = email
            .to
            .parse()
            .with_context(|| format!("invalid recipient address '{}'", email.to))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .body(email.body.clone())?;
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Used when email is disabled: logs instead of sending.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        tracing::info!(
            recipient_id = email.recipient_id,
            subject = %email.subject,
            "email delivery disabled, not sending"
        );
        Ok(())
    }
}

pub fn build_mailer(config: &EmailConfig) -> Result<Arc<dyn Mailer>> {
    if config.enabled {
        Ok(Arc::new(SmtpMailer::new(config)?))
    } else {
        Ok(Arc::new(LogMailer))
    }
}

/// Send `emails` in a background task.
///
/// Each successful send is recorded as an `email_update_sent` activity for
/// the recipient. A failed send is logged and the next recipient is tried.
pub fn dispatch(db: DatabaseConnection, mailer: Arc<dyn Mailer>, emails: Vec<OutgoingEmail>) {
    if emails.is_empty() {
        return;
    }
    tokio::spawn(async move {
        deliver(&db, mailer.as_ref(), emails).await;
    });
}

async fn deliver(db: &DatabaseConnection, mailer: &dyn Mailer, emails: Vec<OutgoingEmail>) {
    for email in emails {
        if let Err(e) = mailer.send(&email).await {
            tracing::warn!(
                recipient_id = email.recipient_id,
                error = %e,
                "failed to send email update"
            );
            continue;
        }
        let sent = NewActivity {
            actor_id: email.recipient_id,
            activity_type: ActivityType::EmailUpdateSent,
            target_kind: TargetKind::User,
            target_id: email.recipient_id,
            question_id: None,
            receivers: Vec::new(),
        };
        if let Err(e) = ActivityService::new(db).record(sent, Utc::now()).await {
            tracing::warn!(
                recipient_id = email.recipient_id,
                error = %e,
                "failed to record sent email"
            );
        }
    }
}
