//! # Mail Dispatch
//!
//! Outbound email behind the [`Mailer`] trait. The server picks
//! [`BrevoMailer`] when `BREVO_API_KEY` is configured and [`LogMailer`]
//! otherwise.
//!
//! ## Messages
//!
//! - [`verification_email`] - link to confirm an address after registration
//! - [`password_reset_email`] - link to choose a new password
//! - [`password_changed_email`] - notice after a reset or change

pub mod brevo;

pub use brevo::BrevoMailer;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// A rendered email ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport failed: {0}")]
    Transport(String),

    #[error("mail request timed out")]
    Timeout,

    #[error("mail provider rejected message (status={status}): {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Writes messages to the log instead of delivering them. Used when no
/// provider is configured.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        info!(
            to = %message.to_email,
            subject = %message.subject,
            "[MAIL] Delivery disabled, message follows:\n{}",
            message.text
        );
        Ok(())
    }
}

// region: --- Templates

fn greeting(first_name: &str) -> String {
    if first_name.trim().is_empty() {
        "Hello,".to_string()
    } else {
        format!("Hello {},", first_name.trim())
    }
}

/// Escape text for an HTML body or a quoted attribute value.
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render(to_email: &str, first_name: &str, subject: &str, lines: &[String], link: Option<&str>) -> MailMessage {
    let mut text = format!("{}\n\n", greeting(first_name));
    // The greeting carries the user-supplied name
    let mut html = format!("<p>{}</p>", escape_html(&greeting(first_name)));

    for line in lines {
        text.push_str(line);
        text.push_str("\n\n");
        html.push_str(&format!("<p>{}</p>", escape_html(line)));
    }
    if let Some(link) = link {
        text.push_str(link);
        text.push('\n');
        let link = escape_html(link);
        html.push_str(&format!("<p><a href=\"{link}\">{link}</a></p>"));
    }

    MailMessage {
        to_email: to_email.to_string(),
        to_name: Some(first_name.to_string()).filter(|n| !n.trim().is_empty()),
        subject: subject.to_string(),
        html,
        text,
    }
}

/// Link to `{app_url}/verify-email?token=...`.
pub fn verification_email(
    app_url: &str,
    to_email: &str,
    first_name: &str,
    token: &str,
    ttl_minutes: i64,
) -> MailMessage {
    let link = format!("{}/verify-email?token={}", app_url, token);
    render(
        to_email,
        first_name,
        "Verify your email address",
        &[
            "Thanks for signing up. Confirm your email address to activate your account.".to_string(),
            format!("The link below expires in {} minutes.", ttl_minutes),
        ],
        Some(&link),
    )
}

/// Link to `{app_url}/reset-password?token=...`.
pub fn password_reset_email(
    app_url: &str,
    to_email: &str,
    first_name: &str,
    token: &str,
    ttl_minutes: i64,
) -> MailMessage {
    let link = format!("{}/reset-password?token={}", app_url, token);
    render(
        to_email,
        first_name,
        "Reset your password",
        &[
            "We received a request to reset your password.".to_string(),
            format!(
                "The link below expires in {} minutes. If you did not ask for this, ignore this email.",
                ttl_minutes
            ),
        ],
        Some(&link),
    )
}

pub fn password_changed_email(to_email: &str, first_name: &str) -> MailMessage {
    render(
        to_email,
        first_name,
        "Your password was changed",
        &["The password of your account was just changed. If this was not you, reset your password immediately.".to_string()],
        None,
    )
}

// endregion: --- Templates
