use std::time::Duration;

use anyhow::Context as _;

use crate::domain::repository::Mailer;
use crate::domain::types::{MAIL_TIMEOUT_SECS, MailKind, OutgoingMail};
use crate::error::ApiError;

/// Mail delivery over the provider's HTTP API (SendGrid v3 wire format).
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender: String,
}

impl HttpMailer {
    pub fn new(api_base: &str, api_key: &str, sender: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(MAIL_TIMEOUT_SECS))
            .timeout(Duration::from_secs(MAIL_TIMEOUT_SECS))
            .build()
            .context("build mail http client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/v3/mail/send", api_base.trim_end_matches('/')),
            api_key: api_key.to_owned(),
            sender: sender.to_owned(),
        })
    }

    fn payload(&self, mail: &OutgoingMail) -> serde_json::Value {
        serde_json::json!({
            "personalizations": [{
                "to": [{ "email": mail.to_email, "name": mail.to_name }],
            }],
            "from": { "email": self.sender },
            "subject": subject(mail),
            "content": [{ "type": "text/plain", "value": body_text(mail) }],
        })
    }
}

fn subject(mail: &OutgoingMail) -> String {
    match mail.kind {
        MailKind::RegistrationConfirmation => {
            format!("Registration confirmed: {}", mail.event.title)
        }
        MailKind::WeekReminder => format!("One week to go: {}", mail.event.title),
        MailKind::DayReminder => format!("Happening tomorrow: {}", mail.event.title),
    }
}

fn body_text(mail: &OutgoingMail) -> String {
    format!(
        "Hi {},\n\n{} ({}) takes place on {} at {}.\n\nSee you there!\n",
        mail.to_name,
        mail.event.title,
        mail.event.category,
        mail.event.starts_at.format("%Y-%m-%d %H:%M UTC"),
        mail.event.location,
    )
}

impl Mailer for HttpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), ApiError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.payload(mail))
            .send()
            .await
            .context("send mail request")?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "mail provider returned {status}"
            )));
        }
        Ok(())
    }
}
