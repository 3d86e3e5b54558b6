// Thin client for the transactional email API. Template rendering and
// delivery live on the provider side; we only post recipients plus their
// substitution variables and read back the failure list.

use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Student;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("email api request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("email api returned {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Serialize, Debug, Clone)]
pub struct EmailRecipient {
    pub email: String,
    pub variables: HashMap<String, String>,
}

impl EmailRecipient {
    pub fn for_student(student: &Student) -> Self {
        let mut variables = HashMap::new();
        variables.insert("name".into(), student.name.clone());
        variables.insert("email".into(), student.email.clone());
        EmailRecipient {
            email: student.email.clone(),
            variables,
        }
    }
}

#[derive(Serialize, Debug)]
struct DispatchReq<'a> {
    template_id: &'a str,
    recipients: &'a [EmailRecipient],
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FailedRecipient {
    pub email: String,
    pub reason: String,
}

#[derive(Deserialize, Debug)]
struct DispatchRes {
    sent: Option<usize>,
    #[serde(default)]
    failures: Vec<FailedRecipient>,
}

#[derive(Serialize, Debug)]
pub struct SendReport {
    pub batch_id: Uuid,
    pub requested: usize,
    pub sent: usize,
    pub failures: Vec<FailedRecipient>,
}

#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl Mailer {
    pub fn from_env() -> Self {
        let api_url = env::var("EMAIL_API_URL").expect("EMAIL_API_URL not set");
        let api_key = env::var("EMAIL_API_KEY").expect("EMAIL_API_KEY not set");
        Self::new(api_url, api_key)
    }

    pub fn new(api_url: String, api_key: String) -> Self {
        Mailer {
            http: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }

    pub async fn send_bulk(
        &self,
        template_id: &str,
        recipients: &[EmailRecipient],
    ) -> Result<SendReport, MailerError> {
        let batch_id = Uuid::new_v4();
        let requested = recipients.len();
        let res = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&DispatchReq {
                template_id,
                recipients,
            })
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(MailerError::Status(res.status()));
        }
        let parsed: DispatchRes = res.json().await?;
        let failures = parsed.failures;
        let sent = parsed
            .sent
            .unwrap_or_else(|| requested.saturating_sub(failures.len()));
        tracing::info!(
            %batch_id,
            template_id,
            requested,
            sent,
            failed = failures.len(),
            "bulk email dispatched"
        );
        Ok(SendReport {
            batch_id,
            requested,
            sent,
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Student;

    #[test]
    fn recipient_variables_carry_name_and_email() {
        let student = Student {
            id: 1,
            name: "Kim Jiwoo".into(),
            email: "jiwoo@example.com".into(),
            phone: "010-1234-5678".into(),
        };
        let r = EmailRecipient::for_student(&student);
        assert_eq!(r.email, "jiwoo@example.com");
        assert_eq!(r.variables["name"], "Kim Jiwoo");
        assert_eq!(r.variables["email"], "jiwoo@example.com");
    }

    #[test]
    fn dispatch_response_parses_failure_list() {
        let json = r#"{"sent": 2, "failures": [{"email": "x@y.co", "reason": "bounced"}]}"#;
        let res: DispatchRes = serde_json::from_str(json).unwrap();
        assert_eq!(res.sent, Some(2));
        assert_eq!(res.failures.len(), 1);
        assert_eq!(res.failures[0].reason, "bounced");
    }

    #[test]
    fn dispatch_response_without_counts_still_parses() {
        let res: DispatchRes = serde_json::from_str("{}").unwrap();
        assert_eq!(res.sent, None);
        assert!(res.failures.is_empty());
    }
}
