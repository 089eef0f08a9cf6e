//! Email service for sending transactional emails.
//!
//! One [`EmailService`] wraps whichever transport the configuration selects:
//! the Resend HTTP API, an SMTP relay through `lettre`, or a logging sink for
//! development. The SMTP transport is built on first use.

use std::sync::Arc;

use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::{EmailConfig, EmailProviderKind};
use crate::error::AppError;

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// The selected transport is missing required settings.
    #[error("Email service is not configured: {0}")]
    NotConfigured(String),
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
    /// The provider accepted the request but refused the message.
    #[error("Email provider error: {0}")]
    Provider(String),
}

impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::NotConfigured(_) => Self::NotConfigured(err.to_string()),
            EmailError::InvalidAddress(_) => Self::Validation(err.to_string()),
            EmailError::BuildError(_) | EmailError::SendError(_) | EmailError::Provider(_) => {
                Self::ExternalService(err.to_string())
            }
        }
    }
}

/// Returns true for addresses lettre can deliver to whose domain has a dot
/// (`local@domain.tld`).
#[must_use]
pub fn is_valid_email(address: &str) -> bool {
    address
        .parse::<Address>()
        .is_ok_and(|parsed| parsed.domain().contains('.'))
}

/// A message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipients.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: Option<String>,
    /// Plain-text body.
    pub text: Option<String>,
}

impl OutgoingEmail {
    /// Creates a message with both an HTML and a plain-text body.
    #[must_use]
    pub fn new(to: impl Into<String>, subject: impl Into<String>, text: String, html: String) -> Self {
        Self {
            to: vec![to.into()],
            subject: subject.into(),
            html: Some(html),
            text: Some(text),
        }
    }

    /// HTML body, falling back to the text body.
    #[must_use]
    pub fn html_body(&self) -> &str {
        self.html
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or_default()
    }

    /// Text body, falling back to the HTML body.
    #[must_use]
    pub fn text_body(&self) -> &str {
        self.text
            .as_deref()
            .or(self.html.as_deref())
            .unwrap_or_default()
    }

    fn validate(&self) -> Result<(), EmailError> {
        if self.to.is_empty() {
            return Err(EmailError::InvalidAddress("no recipients".to_string()));
        }
        if let Some(bad) = self.to.iter().find(|addr| !is_valid_email(addr)) {
            return Err(EmailError::InvalidAddress(bad.clone()));
        }
        Ok(())
    }
}

/// Provider acknowledgement for a delivered message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailReceipt {
    /// Provider-assigned message id, when the provider returns one.
    pub id: Option<String>,
}

enum Transport {
    Resend { client: reqwest::Client },
    Smtp(OnceCell<AsyncSmtpTransport<Tokio1Executor>>),
    Log,
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Deserialize)]
struct ResendResponse {
    id: Option<String>,
}

#[derive(Deserialize)]
struct ResendErrorBody {
    message: Option<String>,
    name: Option<String>,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
    transport: Arc<Transport>,
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub fn new(config: EmailConfig) -> Self {
        let transport = match config.provider {
            EmailProviderKind::Resend => Transport::Resend {
                client: reqwest::Client::new(),
            },
            EmailProviderKind::Smtp => Transport::Smtp(OnceCell::new()),
            EmailProviderKind::Log => Transport::Log,
        };
        Self {
            config,
            transport: Arc::new(transport),
        }
    }

    /// Returns the configured transport kind.
    #[must_use]
    pub fn provider(&self) -> EmailProviderKind {
        self.config.provider
    }

    /// Checks that the selected transport has everything it needs.
    pub fn ensure_configured(&self) -> Result<(), EmailError> {
        match self.config.provider {
            EmailProviderKind::Log => Ok(()),
            EmailProviderKind::Resend if self.config.resend_api_key.is_none() => Err(
                EmailError::NotConfigured("resend_api_key is not set".to_string()),
            ),
            EmailProviderKind::Resend | EmailProviderKind::Smtp => {
                if self.config.from_email.is_none() {
                    Err(EmailError::NotConfigured("from_email is not set".to_string()))
                } else {
                    Ok(())
                }
            }
        }
    }

    fn from_address(&self) -> String {
        let email = self
            .config
            .from_email
            .as_deref()
            .unwrap_or("noreply@localhost");
        format!("{} <{}>", self.config.from_name, email)
    }

    /// Creates an SMTP transport.
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let builder = if self.config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
                .map_err(|e| EmailError::SendError(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_host)
        };
        let builder = builder.port(self.config.smtp_port);
        let builder = match (&self.config.smtp_username, &self.config.smtp_password) {
            (Some(user), Some(pass)) => {
                builder.credentials(Credentials::new(user.clone(), pass.clone()))
            }
            _ => builder,
        };
        Ok(builder.build())
    }

    /// Sends a message through the configured transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is not configured, a recipient is
    /// invalid, or the provider refuses the message.
    pub async fn send(&self, email: &OutgoingEmail) -> Result<EmailReceipt, EmailError> {
        self.ensure_configured()?;
        email.validate()?;

        let receipt = match self.transport.as_ref() {
            Transport::Resend { client } => self.send_resend(client, email).await?,
            Transport::Smtp(cell) => {
                let transport = cell
                    .get_or_try_init(|| async { self.create_transport() })
                    .await?;
                self.send_smtp(transport, email).await?
            }
            Transport::Log => {
                info!(
                    to = ?email.to,
                    subject = %email.subject,
                    body = %email.text_body(),
                    "Email delivery disabled, message logged"
                );
                EmailReceipt::default()
            }
        };

        debug!(to = ?email.to, id = ?receipt.id, "Email sent");
        Ok(receipt)
    }

    async fn send_resend(
        &self,
        client: &reqwest::Client,
        email: &OutgoingEmail,
    ) -> Result<EmailReceipt, EmailError> {
        let api_key = self
            .config
            .resend_api_key
            .as_deref()
            .ok_or_else(|| EmailError::NotConfigured("resend_api_key is not set".to_string()))?;
        let from = self.from_address();
        let body = ResendRequest {
            from: &from,
            to: &email.to,
            subject: &email.subject,
            html: email.html_body(),
            text: email.text_body(),
            reply_to: self.config.reply_to.as_deref(),
        };

        let url = format!("{}/emails", self.config.resend_base_url.trim_end_matches('/'));
        let response = client
            .post(url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ResendErrorBody>(&text)
                .ok()
                .and_then(|b| match (b.message, b.name) {
                    (Some(m), _) => Some(m),
                    (None, Some(n)) => Some(format!("{n}: Unknown error")),
                    (None, None) => None,
                })
                .unwrap_or_else(|| format!("Failed to send email (status {status})"));
            warn!(status = %status, error = %message, "Resend API error");
            return Err(EmailError::Provider(message));
        }

        let id = serde_json::from_str::<ResendResponse>(&text)
            .ok()
            .and_then(|r| r.id);
        Ok(EmailReceipt { id })
    }

    async fn send_smtp(
        &self,
        transport: &AsyncSmtpTransport<Tokio1Executor>,
        email: &OutgoingEmail,
    ) -> Result<EmailReceipt, EmailError> {
        let message = self.build_message(email)?;
        let response = transport
            .send(message)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;
        debug!(code = %response.code(), "SMTP relay accepted message");
        Ok(EmailReceipt::default())
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, EmailError> {
        let from: Mailbox = self
            .from_address()
            .parse()
            .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?;

        let mut builder = Message::builder().from(from).subject(email.subject.clone());
        if let Some(reply_to) = &self.config.reply_to {
            builder = builder.reply_to(
                reply_to
                    .parse()
                    .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?,
            );
        }
        for recipient in &email.to {
            builder = builder.to(recipient
                .parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?);
        }

        builder
            .multipart(MultiPart::alternative_plain_html(
                email.text_body().to_string(),
                email.html_body().to_string(),
            ))
            .map_err(|e| EmailError::BuildError(e.to_string()))
    }

    /// Confirms receipt of a membership application.
    pub async fn send_application_received(&self, to: &str) -> Result<EmailReceipt, EmailError> {
        self.send(&notification(
            to,
            "Voice Anchors Application Received",
            "Application received",
            &[
                "We have received your Voice Anchors application.",
                "Please wait for further updates.",
            ],
        ))
        .await
    }

    /// Notifies an applicant of approval.
    pub async fn send_application_approved(&self, to: &str) -> Result<EmailReceipt, EmailError> {
        self.send(&notification(
            to,
            "Voice Anchors Application Approved",
            "Congratulations!",
            &[
                "Your Voice Anchors application has been approved.",
                "Please wait for your membership account details via email.",
            ],
        ))
        .await
    }

    /// Notifies an applicant of rejection.
    pub async fn send_application_rejected(&self, to: &str) -> Result<EmailReceipt, EmailError> {
        self.send(&notification(
            to,
            "Voice Anchors Application Status",
            "Application update",
            &[
                "Thank you for your interest in Voice Anchors.",
                "Unfortunately, your application was not approved at this time.",
            ],
        ))
        .await
    }

    /// Welcomes a newly created member.
    pub async fn send_welcome(&self, to: &str, username: &str) -> Result<EmailReceipt, EmailError> {
        let greeting = format!("Dear {username},");
        let login = format!("Your username is {username}. Use the password provided by your administrator to sign in.");
        self.send(&notification(
            to,
            "Welcome to Voice Anchors Community",
            "Welcome to Voice Anchors!",
            &[
                greeting.as_str(),
                "Your account has been created successfully.",
                login.as_str(),
            ],
        ))
        .await
    }

    /// Sends a password reset link.
    pub async fn send_password_reset(
        &self,
        to: &str,
        reset_link: &str,
    ) -> Result<EmailReceipt, EmailError> {
        self.send(&notification(
            to,
            "Voice Anchors - Password Reset",
            "Password reset",
            &[
                "You requested a password reset for your Voice Anchors account. Use the link below to reset your password:",
                reset_link,
                "This link will expire in 24 hours.",
                "If you did not request this reset, please ignore this email.",
            ],
        ))
        .await
    }

    /// Sends a configuration check message.
    pub async fn send_test(&self, to: &str) -> Result<EmailReceipt, EmailError> {
        let timestamp = format!("Timestamp: {}", chrono::Utc::now().to_rfc3339());
        self.send(&notification(
            to,
            "Test Email from Voice Anchors",
            "Test Email",
            &[
                "This is a test email from Voice Anchors.",
                "If you received this email, your email configuration is working correctly!",
                timestamp.as_str(),
            ],
        ))
        .await
    }
}

fn notification(to: &str, subject: &str, heading: &str, paragraphs: &[&str]) -> OutgoingEmail {
    let text = format!(
        "{heading}\n\n{}\n\nBest regards,\nThe Voice Anchors Team",
        paragraphs.join("\n\n")
    );
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<p>{}</p>", escape_html(p)))
        .collect();
    let html = format!(
        "<!DOCTYPE html><html><body><h1>{}</h1>{body}<p>Best regards,<br>The Voice Anchors Team</p></body></html>",
        escape_html(heading)
    );
    OutgoingEmail::new(to, subject, text, html)
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "email_tests.rs"]
mod tests;
