//! User-to-user email notifications.

use std::sync::Arc;

use domains::{
    parse_record_id, CallerIdentity, DomainError, EmailRequest, Mailbox, Mailer, OutboundEmail,
    Result, UserRepository,
};

pub struct NotificationService {
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
    /// Application identity every notification is sent from
    sender: Mailbox,
}

impl NotificationService {
    pub fn new(users: Arc<dyn UserRepository>, mailer: Arc<dyn Mailer>, sender: Mailbox) -> Self {
        Self {
            users,
            mailer,
            sender,
        }
    }

    #[tracing::instrument(skip_all, fields(subject = %caller.subject_id))]
    pub async fn send(&self, caller: &CallerIdentity, request: EmailRequest) -> Result<()> {
        let recipient_id = request
            .recipient_id
            .as_deref()
            .ok_or_else(|| DomainError::invalid("Invalid recipient ID"))
            .and_then(|raw| parse_record_id(raw, "Invalid recipient ID"))?;

        let (sender, recipient) = tokio::join!(
            self.users.find_by_subject(&caller.subject_id),
            self.users.find_by_id(recipient_id),
        );

        let sender = sender?.ok_or_else(|| {
            tracing::warn!("sender has no local profile");
            DomainError::not_found("Sender not found")
        })?;
        let recipient = recipient?.ok_or_else(|| {
            tracing::warn!(%recipient_id, "recipient not found");
            DomainError::not_found("Recipient not found")
        })?;

        let email = OutboundEmail {
            to: recipient.email,
            from: self.sender.clone(),
            reply_to: sender.email.clone(),
            text: format!(
                "From: {}\n\nSubject: {}\n\nMessage: {}",
                sender.email, request.subject, request.message
            ),
            subject: request.subject,
        };

        self.mailer.send(&email).await.inspect_err(|e| {
            tracing::error!(error = %e, "email delivery failed");
        })?;
        tracing::info!(%recipient_id, "notification sent");
        Ok(())
    }
}
