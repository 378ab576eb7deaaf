use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::time::{sleep, Duration};

use crate::config::Config;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl Mailer {
    pub fn new(config: &Config) -> Result<Self, String> {
        let credentials =
            Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| format!("SMTP relay setup failed: {}", e))?
            .credentials(credentials)
            .build();

        Ok(Mailer {
            transport,
            from: config.smtp_from.clone(),
        })
    }

    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), String> {
        if to_email.is_empty() || !to_email.contains('@') {
            return Err(format!("Invalid email address: {}", to_email));
        }

        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match self.try_send(to_email, subject, html_body).await {
                Ok(()) => {
                    tracing::info!("email sent to {}", to_email);
                    return Ok(());
                }
                Err(e) => {
                    last_error = Some(e);
                    if attempt < MAX_RETRIES {
                        let delay = RETRY_DELAY_MS * 2_u64.pow(attempt - 1);
                        tracing::warn!(
                            "email attempt {} failed for {}, retrying in {}ms",
                            attempt,
                            to_email,
                            delay
                        );
                        sleep(Duration::from_millis(delay)).await;
                    }
                }
            }
        }

        let message = last_error.unwrap_or_else(|| "unknown email error".to_string());
        tracing::error!("email failed for {}: {}", to_email, message);
        Err(message)
    }

    async fn try_send(
        &self,
        to_email: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), String> {
        let email = Message::builder()
            .from(self.from.parse().map_err(|e| format!("bad from address: {}", e))?)
            .to(to_email.parse().map_err(|e| format!("bad to address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| format!("failed to build email: {}", e))?;

        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| format!("SMTP error: {}", e))
    }
}
