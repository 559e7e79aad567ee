//! Email notification service.
//!
//! Sends the new-report notification to all administrators. Delivery is
//! best-effort: the submission path never waits on or fails with it.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use serde::{Deserialize, Serialize};

use komuna_common::{AppError, AppResult};

/// Email provider configuration.
#[derive(Debug, Clone)]
pub enum EmailProvider {
    /// Resend HTTP API.
    Resend(ResendConfig),
    /// SMTP relay.
    Smtp(SmtpConfig),
}

/// Resend configuration.
#[derive(Debug, Clone)]
pub struct ResendConfig {
    /// Resend API key.
    pub api_key: String,
}

/// SMTP configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP host
    pub host: String,
    /// SMTP port
    pub port: u16,
    /// Username
    pub username: Option<String>,
    /// Password
    pub password: Option<String>,
}

/// Email configuration.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Email provider
    pub provider: EmailProvider,
    /// From address
    pub from_address: String,
    /// From name
    pub from_name: String,
    /// Instance name (for templates)
    pub instance_name: String,
    /// Instance URL (for templates)
    pub instance_url: String,
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient email addresses
    pub to: Vec<String>,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub text_body: String,
    /// HTML body (optional)
    pub html_body: Option<String>,
}

/// Payload of the new-report notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportNotification {
    /// Report title.
    pub title: String,
    /// Report description.
    pub description: String,
    /// Tracking code assigned at submission.
    pub tracking_code: String,
    /// Resolved neighborhood, if a location was shared.
    pub neighborhood: Option<String>,
    /// Whether a location was shared.
    pub has_location: bool,
    /// Reporter name, if provided.
    pub reporter_name: Option<String>,
}

/// Email delivery result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDeliveryResult {
    /// Whether the email was sent successfully
    pub success: bool,
    /// Message ID from provider (if available)
    pub message_id: Option<String>,
    /// Error message (if failed)
    pub error: Option<String>,
}

/// Email service.
#[derive(Clone)]
pub struct EmailService {
    config: Option<EmailConfig>,
    http_client: reqwest::Client,
}

impl EmailService {
    /// Create a new email service.
    #[must_use]
    pub fn new(config: Option<EmailConfig>) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Check if email service is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Send an email.
    pub async fn send(&self, message: EmailMessage) -> AppResult<EmailDeliveryResult> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("Email service not configured".to_string()))?;

        match &config.provider {
            EmailProvider::Resend(resend) => self.send_resend(resend, config, message).await,
            EmailProvider::Smtp(smtp) => Self::send_smtp(smtp, config, message).await,
        }
    }

    /// Send the new-report notification to the given admin addresses.
    pub async fn send_report_notification(
        &self,
        to: Vec<String>,
        notification: &ReportNotification,
    ) -> AppResult<EmailDeliveryResult> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("Email service not configured".to_string()))?;

        let (subject, text_body, html_body) = render_report_notification(notification, config);

        self.send(EmailMessage {
            to,
            subject,
            text_body,
            html_body: Some(html_body),
        })
        .await
    }

    async fn send_resend(
        &self,
        resend: &ResendConfig,
        config: &EmailConfig,
        message: EmailMessage,
    ) -> AppResult<EmailDeliveryResult> {
        let body = serde_json::json!({
            "from": format!("{} <{}>", config.from_name, config.from_address),
            "to": message.to,
            "subject": message.subject,
            "text": message.text_body,
            "html": message.html_body.unwrap_or_default(),
        });

        let response = self
            .http_client
            .post("https://api.resend.com/emails")
            .header("Authorization", format!("Bearer {}", resend.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Resend request failed: {e}")))?;

        if response.status().is_success() {
            #[derive(Deserialize)]
            struct ResendResponse {
                id: Option<String>,
            }
            let result: ResendResponse =
                response.json().await.unwrap_or(ResendResponse { id: None });
            Ok(EmailDeliveryResult {
                success: true,
                message_id: result.id,
                error: None,
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Ok(EmailDeliveryResult {
                success: false,
                message_id: None,
                error: Some(error_text),
            })
        }
    }

    async fn send_smtp(
        smtp: &SmtpConfig,
        config: &EmailConfig,
        message: EmailMessage,
    ) -> AppResult<EmailDeliveryResult> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_address)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid from address: {e}")))?;

        let mut builder = Message::builder().from(from).subject(&message.subject);
        for recipient in &message.to {
            let to: Mailbox = recipient
                .parse()
                .map_err(|e| AppError::BadRequest(format!("Invalid recipient: {e}")))?;
            builder = builder.to(to);
        }

        let email = builder
            .multipart(MultiPart::alternative_plain_html(
                message.text_body,
                message.html_body.unwrap_or_default(),
            ))
            .map_err(|e| AppError::Internal(format!("Failed to build email: {e}")))?;

        let mut transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
            .map_err(|e| AppError::Config(format!("Invalid SMTP relay: {e}")))?
            .port(smtp.port);

        if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
            transport = transport.credentials(Credentials::new(username.clone(), password.clone()));
        }

        match transport.build().send(email).await {
            Ok(response) => Ok(EmailDeliveryResult {
                success: response.is_positive(),
                // SMTP relays do not hand back a message ID.
                message_id: None,
                error: None,
            }),
            Err(e) => Ok(EmailDeliveryResult {
                success: false,
                message_id: None,
                error: Some(e.to_string()),
            }),
        }
    }
}

/// Render the new-report notification email.
fn render_report_notification(
    notification: &ReportNotification,
    config: &EmailConfig,
) -> (String, String, String) {
    let subject = format!(
        "Raport i Ri: {} [{}]",
        notification.title, notification.tracking_code
    );

    let location_line = if notification.has_location {
        "E përfshirë"
    } else {
        "Jo e përfshirë"
    };

    let mut text = format!(
        "Raport i ri në {}.\n\nKodi: {}\nTitulli: {}\nPërshkrimi: {}\n",
        config.instance_name,
        notification.tracking_code,
        notification.title,
        notification.description,
    );
    if let Some(ref neighborhood) = notification.neighborhood {
        text.push_str(&format!("Lagja: {neighborhood}\n"));
    }
    if let Some(ref name) = notification.reporter_name {
        text.push_str(&format!("Raportuar nga: {name}\n"));
    }
    text.push_str(&format!(
        "Vendndodhja: {location_line}\n\nShiko në dashboard: {}/login\n",
        config.instance_url
    ));

    let mut details = format!(
        "<div class=\"tracking-code\">{}</div>\
        <div class=\"detail\"><div class=\"label\">Titulli</div><div class=\"value\">{}</div></div>\
        <div class=\"detail\"><div class=\"label\">Përshkrimi</div><div class=\"value\">{}</div></div>",
        notification.tracking_code, notification.title, notification.description
    );
    if let Some(ref neighborhood) = notification.neighborhood {
        details.push_str(&format!(
            "<div class=\"detail\"><div class=\"label\">Lagja</div><div class=\"value\">{neighborhood}</div></div>"
        ));
    }
    if let Some(ref name) = notification.reporter_name {
        details.push_str(&format!(
            "<div class=\"detail\"><div class=\"label\">Raportuar nga</div><div class=\"value\">{name}</div></div>"
        ));
    }
    details.push_str(&format!(
        "<div class=\"detail\"><div class=\"label\">Vendndodhja</div><div class=\"value\">{location_line}</div></div>\
        <p style=\"text-align:center;\"><a href=\"{}/login\" class=\"button\">Shiko në Dashboard</a></p>",
        config.instance_url
    ));

    let html = wrap_html(&details, config);

    (subject, text, html)
}

/// Wrap HTML content in the notification email template.
fn wrap_html(content: &str, config: &EmailConfig) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
        a {{ color: #6366f1; }}
        .tracking-code {{ background: #eef; padding: 12px 24px; border-radius: 8px; font-family: monospace; font-size: 24px; text-align: center; color: #6366f1; margin: 16px 0; }}
        .detail {{ padding: 12px 0; border-bottom: 1px solid #e9ecef; }}
        .label {{ color: #888; font-size: 12px; text-transform: uppercase; }}
        .value {{ font-size: 16px; margin-top: 4px; }}
        .button {{ display: inline-block; background: #6366f1; color: #fff; padding: 12px 24px; border-radius: 8px; text-decoration: none; font-weight: 600; margin-top: 24px; }}
    </style>
</head>
<body>
    {}
    <hr style="margin-top: 40px; border: none; border-top: 1px solid #e9ecef;">
    <p style="font-size: 12px; color: #6c757d;">
        {} — Platformë për raportimin e problemeve qytetare.<br>
        <a href="{}">{}</a>
    </p>
</body>
</html>"#,
        content, config.instance_name, config.instance_url, config.instance_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EmailConfig {
        EmailConfig {
            provider: EmailProvider::Resend(ResendConfig {
                api_key: "re_test".to_string(),
            }),
            from_address: "njoftime@example.com".to_string(),
            from_name: "Komuna".to_string(),
            instance_name: "Komuna Elbasan".to_string(),
            instance_url: "https://raporto.example.com".to_string(),
        }
    }

    fn test_notification() -> ReportNotification {
        ReportNotification {
            title: "Ndriçim i prishur".to_string(),
            description: "Llamba nuk ndizet prej një jave".to_string(),
            tracking_code: "K7M2P9X1".to_string(),
            neighborhood: Some("Lagja Kala".to_string()),
            has_location: true,
            reporter_name: None,
        }
    }

    #[test]
    fn disabled_without_config() {
        let service = EmailService::new(None);
        assert!(!service.is_enabled());
    }

    #[tokio::test]
    async fn send_without_config_is_an_error() {
        let service = EmailService::new(None);
        let err = service
            .send(EmailMessage {
                to: vec!["admin@example.com".to_string()],
                subject: "s".to_string(),
                text_body: "t".to_string(),
                html_body: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn notification_template_carries_report_fields() {
        let config = test_config();
        let (subject, text, html) = render_report_notification(&test_notification(), &config);

        assert!(subject.contains("K7M2P9X1"));
        assert!(subject.contains("Ndriçim i prishur"));
        assert!(text.contains("Lagja Kala"));
        assert!(text.contains("E përfshirë"));
        assert!(html.contains("K7M2P9X1"));
        assert!(html.contains("Lagja Kala"));
        // No reporter name given, so the section is absent.
        assert!(!html.contains("Raportuar nga"));
    }

    #[test]
    fn notification_template_includes_reporter_when_present() {
        let config = test_config();
        let notification = ReportNotification {
            reporter_name: Some("Arben Hoxha".to_string()),
            has_location: false,
            neighborhood: None,
            ..test_notification()
        };

        let (_, text, html) = render_report_notification(&notification, &config);
        assert!(text.contains("Arben Hoxha"));
        assert!(html.contains("Arben Hoxha"));
        assert!(text.contains("Jo e përfshirë"));
        assert!(!html.contains(">Lagja<"));
    }
}
