//! Booking submission.

use super::{error_code, error_message, BoxFuture, ClinicApi, BOOKING_ENDPOINT};
use anyhow::{anyhow, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

const MAX_REASON_LENGTH: usize = 1000;
const MAX_NAME_LENGTH: usize = 100;
const MAX_PHONE_LENGTH: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientType {
    New,
    Returning,
    Discovery,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Virtual,
    InPerson,
    Phone,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Selections collected by the booking wizard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub patient_type: PatientType,
    pub patient_details: PatientDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<u64>,
    /// `YYYY-MM-DD`
    pub scheduled_date: String,
    /// `HH:MM` or `HH:MM:SS`
    pub scheduled_time: String,
    pub modality: Modality,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Honeypot. Hidden from people, so anything in it came from a bot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl BookingRequest {
    /// Shape checks done before bothering the backend. Date ranges and slot
    /// availability are the backend's call.
    ///
    /// # Errors
    /// Returns the first problem found, worded for the patient.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.website.as_deref().is_some_and(|website| !website.is_empty()) {
            return Err("Invalid submission".to_string());
        }

        if self.patient_details.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }

        if self.patient_details.name.chars().count() > MAX_NAME_LENGTH {
            return Err(format!("Name must be at most {MAX_NAME_LENGTH} characters"));
        }

        if !valid_email(&self.patient_details.email) {
            return Err("Enter a valid email address".to_string());
        }

        if self.patient_details.phone.trim().is_empty() {
            return Err("Phone number is required".to_string());
        }

        if !valid_phone(&self.patient_details.phone) {
            return Err("Enter a valid phone number".to_string());
        }

        if self.patient_details.phone.chars().count() > MAX_PHONE_LENGTH {
            return Err(format!(
                "Phone number must be at most {MAX_PHONE_LENGTH} characters"
            ));
        }

        if !Regex::new(r"^\d{4}-\d{2}-\d{2}$").is_ok_and(|re| re.is_match(&self.scheduled_date)) {
            return Err("Scheduled date must be YYYY-MM-DD".to_string());
        }

        if !Regex::new(r"^\d{2}:\d{2}(:\d{2})?$").is_ok_and(|re| re.is_match(&self.scheduled_time))
        {
            return Err("Scheduled time must be HH:MM".to_string());
        }

        if self
            .reason
            .as_ref()
            .is_some_and(|reason| reason.chars().count() > MAX_REASON_LENGTH)
        {
            return Err(format!(
                "Reason must be at most {MAX_REASON_LENGTH} characters"
            ));
        }

        Ok(())
    }
}

/// Digits, spaces, dashes and parentheses, at least ten of them, with an
/// optional leading `+`.
pub fn valid_phone(phone: &str) -> bool {
    Regex::new(r"^\+?[\d\s()-]{10,}$").is_ok_and(|re| re.is_match(phone))
}

/// Lightweight email sanity check; the backend does the real validation.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub reference_id: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingOutcome {
    Confirmed(BookingConfirmation),
    Rejected {
        status: u16,
        code: String,
        message: String,
    },
}

/// Submit booking selections, receive a confirmation or a refusal.
pub trait BookingService: Send + Sync {
    fn submit<'a>(&'a self, request: &'a BookingRequest) -> BoxFuture<'a, Result<BookingOutcome>>;
}

impl ClinicApi {
    #[instrument(skip_all, fields(modality = ?request.modality, date = %request.scheduled_date))]
    async fn book(&self, request: &BookingRequest) -> Result<BookingOutcome> {
        let url = self.endpoint_url(BOOKING_ENDPOINT)?;

        let response = self.client().post(url).json(request).send().await?;
        let status = response.status();

        if status.is_server_error() {
            error!("Booking request failed: {}", status);

            return Err(anyhow!("booking endpoint returned {status}"));
        }

        let body: Value = response.json().await.unwrap_or_default();

        if !status.is_success() || body["success"].as_bool() == Some(false) {
            let code = error_code(&body).unwrap_or_else(|| "BOOKING_REJECTED".to_string());
            let message = error_message(&body)
                .unwrap_or_else(|| "The booking request was not accepted".to_string());

            warn!("Booking rejected: {} {} - {}", status, code, message);

            return Ok(BookingOutcome::Rejected {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let reference_id = body["reference_id"]
            .as_str()
            .ok_or_else(|| anyhow!("Error parsing JSON response: no reference_id found"))?;
        let message = body["message"].as_str().unwrap_or_default();

        info!("Booking confirmed: {}", reference_id);

        Ok(BookingOutcome::Confirmed(BookingConfirmation {
            reference_id: reference_id.to_string(),
            message: message.to_string(),
        }))
    }
}

impl BookingService for ClinicApi {
    fn submit<'a>(&'a self, request: &'a BookingRequest) -> BoxFuture<'a, Result<BookingOutcome>> {
        Box::pin(self.book(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn request() -> BookingRequest {
        BookingRequest {
            patient_type: PatientType::New,
            patient_details: PatientDetails {
                name: "Ada Moreno".to_string(),
                email: "ada@example.com".to_string(),
                phone: "+1 555 0100".to_string(),
            },
            service_id: Some(4),
            scheduled_date: "2026-11-02".to_string(),
            scheduled_time: "09:30".to_string(),
            modality: Modality::InPerson,
            timezone: default_timezone(),
            reason: None,
            website: None,
        }
    }

    #[test]
    fn wizard_payload_deserializes_with_defaults() -> Result<()> {
        let request: BookingRequest = serde_json::from_value(json!({
            "patient_type": "returning",
            "patient_details": {"name": "Ada", "email": "ada@example.com", "phone": "(555) 010-0199"},
            "scheduled_date": "2026-11-02",
            "scheduled_time": "09:30:00",
            "modality": "in_person"
        }))?;
        assert_eq!(request.patient_type, PatientType::Returning);
        assert_eq!(request.modality, Modality::InPerson);
        assert_eq!(request.timezone, "UTC");
        assert_eq!(request.service_id, None);
        assert_eq!(request.website, None);
        assert!(request.validate().is_ok());
        Ok(())
    }

    #[test]
    fn validate_reports_first_problem() {
        let mut bad = request();
        bad.patient_details.email = "not-an-email".to_string();
        assert_eq!(bad.validate(), Err("Enter a valid email address".to_string()));

        let mut bad = request();
        bad.patient_details.name = "  ".to_string();
        assert_eq!(bad.validate(), Err("Name is required".to_string()));

        let mut bad = request();
        bad.patient_details.name = "A".repeat(101);
        assert!(bad.validate().is_err());

        let mut bad = request();
        bad.patient_details.phone = "1".to_string();
        assert_eq!(bad.validate(), Err("Enter a valid phone number".to_string()));

        let mut bad = request();
        bad.patient_details.phone = "+1 (555) 010-0199 x12".to_string();
        assert!(bad.validate().is_err());

        let mut bad = request();
        bad.patient_details.phone = "+1 555 0100 0199 0199".to_string();
        assert!(bad.validate().is_err());

        let mut bad = request();
        bad.scheduled_date = "02/11/2026".to_string();
        assert!(bad.validate().is_err());

        let mut bad = request();
        bad.reason = Some("x".repeat(MAX_REASON_LENGTH + 1));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn filled_honeypot_is_rejected() {
        let mut bot = request();
        bot.website = Some("http://spam.example".to_string());
        assert_eq!(bot.validate(), Err("Invalid submission".to_string()));

        let mut person = request();
        person.website = Some(String::new());
        assert!(person.validate().is_ok());
    }

    #[test]
    fn test_valid_phone() {
        assert!(valid_phone("+1 555 010 0199"));
        assert!(valid_phone("(555) 010-0199"));
        assert!(!valid_phone("555-0199"));
        assert!(!valid_phone("call me maybe"));
    }

    #[test]
    fn test_valid_email() {
        assert!(valid_email("front.desk@tfwellfare.com"));
        assert!(!valid_email("front desk@tfwellfare.com"));
        assert!(!valid_email("tfwellfare.com"));
    }

    #[tokio::test]
    async fn submit_returns_confirmation() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BOOKING_ENDPOINT))
            .and(body_partial_json(json!({
                "patient_type": "new",
                "modality": "in_person",
                "timezone": "UTC"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "reference_id": "TFW-8K2Q",
                "message": "Your appointment request has been received."
            })))
            .mount(&server)
            .await;

        let api = ClinicApi::new(&server.uri())?;
        let outcome = api.submit(&request()).await?;
        assert_eq!(
            outcome,
            BookingOutcome::Confirmed(BookingConfirmation {
                reference_id: "TFW-8K2Q".to_string(),
                message: "Your appointment request has been received.".to_string(),
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn slot_conflict_is_a_rejection() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BOOKING_ENDPOINT))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "success": false,
                "error": {
                    "code": "SLOT_UNAVAILABLE",
                    "message": "This time slot is no longer available. Please select another time."
                }
            })))
            .mount(&server)
            .await;

        let api = ClinicApi::new(&server.uri())?;
        match api.submit(&request()).await? {
            BookingOutcome::Rejected {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(code, "SLOT_UNAVAILABLE");
                assert!(message.starts_with("This time slot"));
            }
            other => return Err(anyhow!("expected rejection, got {other:?}")),
        }
        Ok(())
    }

    #[tokio::test]
    async fn backend_outage_is_an_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BOOKING_ENDPOINT))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let api = ClinicApi::new(&server.uri())?;
        assert!(api.submit(&request()).await.is_err());
        Ok(())
    }
}
