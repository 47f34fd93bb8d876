//! Outbound transactional mail over SMTP.

use anyhow::Context;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::model::MailConfig;

#[derive(Clone)]
pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailService {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let mut builder = if config.ssl_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)
                .context("invalid SMTP relay configuration")?
        } else if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
                .context("invalid SMTP STARTTLS configuration")?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.server)
        };
        builder = builder.port(config.port);

        if config.use_credentials {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        let from = format!("{} <{}>", config.from_name, config.from)
            .parse()
            .context("invalid sender mailbox")?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    pub async fn send_verification_email(&self, to: &str, code: &str) -> anyhow::Result<()> {
        self.send(to, "Account Verification", verification_body(code))
            .await
    }

    pub async fn send_reset_password_email(&self, to: &str, code: &str) -> anyhow::Result<()> {
        self.send(to, "Password Reset - Verification Code", reset_body(code))
            .await
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse().context("invalid recipient address")?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)?;

        self.transport.send(message).await?;
        info!("Sent '{}' email to {}", subject, to);
        Ok(())
    }
}

fn verification_body(code: &str) -> String {
    format!("Your verification code is: {}", code)
}

fn reset_body(code: &str) -> String {
    format!(
        r##"<h2>Password Reset Request</h2>
<p>Your 6-digit verification code is: <strong style="font-size: 24px; color: #8B5CF6;">{}</strong></p>
<p>This code will expire in 15 minutes.</p>
<p>If you didn't request this, please ignore this email.</p>"##,
        code
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::MailConfig;

    fn test_config() -> MailConfig {
        MailConfig {
            username: "noreply@souq.tn".to_string(),
            password: "secret".to_string(),
            from: "noreply@souq.tn".to_string(),
            from_name: "Souq".to_string(),
            server: "smtp.gmail.com".to_string(),
            port: 587,
            starttls: true,
            ssl_tls: false,
            use_credentials: true,
        }
    }

    #[test]
    fn test_service_builds_from_config() {
        assert!(EmailService::new(&test_config()).is_ok());
    }

    #[test]
    fn test_rejects_invalid_sender() {
        let mut config = test_config();
        config.from = "not a mailbox".to_string();
        assert!(EmailService::new(&config).is_err());
    }

    #[test]
    fn test_verification_body_contains_code() {
        assert_eq!(
            verification_body("a1b2c3"),
            "Your verification code is: a1b2c3"
        );
    }

    #[test]
    fn test_reset_body_wording() {
        let body = reset_body("123456");
        assert!(body.contains("<h2>Password Reset Request</h2>"));
        assert!(body.contains("Your 6-digit verification code is:"));
        assert!(body.contains(r##"<strong style="font-size: 24px; color: #8B5CF6;">123456</strong>"##));
        assert!(body.contains("This code will expire in 15 minutes."));
        assert!(body.contains("If you didn't request this, please ignore this email."));
    }
}
