//! Notification collaborator: posts contact-form messages to an
//! HTTP email relay.

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::config::ContactConfig;

#[derive(Debug, Serialize)]
struct SendRequest {
    service_id: String,
    template_id: String,
    user_id: String,
    template_params: TemplateParams,
}

#[derive(Debug, Serialize)]
struct TemplateParams {
    to_email: String,
    from_name: String,
    from_email: String,
    message: String,
}

/// Fire-and-forget message sender; callers surface success or failure
/// as inline form status and retry by resubmitting.
#[derive(Clone)]
pub struct Messenger {
    endpoint: String,
    service_id: String,
    template_id: String,
    user_id: String,
    to_email: String,
}

impl Messenger {
    pub fn from_config(config: &ContactConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            service_id: config.service_id.clone(),
            template_id: config.template_id.clone(),
            user_id: config.user_id.clone(),
            to_email: config.to_email.clone(),
        }
    }

    /// True when the relay has been configured with a user id.
    pub fn is_configured(&self) -> bool {
        !self.user_id.is_empty()
    }

    pub fn send(&self, name: &str, email: &str, message: &str) -> Result<()> {
        let request = self.build_request(name, email, message);

        let response = ureq::post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(&request)
            .map_err(|e| anyhow!("message relay request failed: {}", e))?;

        if response.status() >= 200 && response.status() < 300 {
            Ok(())
        } else {
            Err(anyhow!("message relay returned status {}", response.status()))
        }
    }

    fn build_request(&self, name: &str, email: &str, message: &str) -> SendRequest {
        SendRequest {
            service_id: self.service_id.clone(),
            template_id: self.template_id.clone(),
            user_id: self.user_id.clone(),
            template_params: TemplateParams {
                to_email: self.to_email.clone(),
                from_name: name.to_string(),
                from_email: email.to_string(),
                message: message.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messenger() -> Messenger {
        Messenger {
            endpoint: "https://relay.example/send".to_string(),
            service_id: "default_service".to_string(),
            template_id: "template_default".to_string(),
            user_id: "user-1".to_string(),
            to_email: "bookings@example.com".to_string(),
        }
    }

    #[test]
    fn request_carries_sender_and_recipient() {
        let request = messenger().build_request("Jo", "jo@example.com", "hello");
        assert_eq!(request.service_id, "default_service");
        assert_eq!(request.template_params.to_email, "bookings@example.com");
        assert_eq!(request.template_params.from_name, "Jo");
        assert_eq!(request.template_params.from_email, "jo@example.com");
        assert_eq!(request.template_params.message, "hello");
    }

    #[test]
    fn configured_requires_user_id() {
        let mut m = messenger();
        assert!(m.is_configured());
        m.user_id.clear();
        assert!(!m.is_configured());
    }
}
