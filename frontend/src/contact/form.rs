use std::collections::BTreeMap;
use std::future::Future;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::i18n::routes::Language;

pub const CONTACT_ENDPOINT_DEV: &str =
    "http://127.0.0.1:5001/henq-web/europe-west3/contactFormSubmit";
pub const CONTACT_ENDPOINT: &str =
    "https://europe-west3-henq-web.cloudfunctions.net/contactFormSubmit";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub fn contact_endpoint(dev: bool) -> &'static str {
    if dev {
        CONTACT_ENDPOINT_DEV
    } else {
        CONTACT_ENDPOINT
    }
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFormData {
    pub name: String,
    pub email: String,
    pub message: String,
    pub consent: bool,
    pub newsletter: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContactField {
    Name,
    Email,
    Message,
    Consent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    NameRequired,
    EmailRequired,
    EmailInvalid,
    MessageRequired,
    ConsentRequired,
}

impl FieldError {
    /// Translation key shown under the field.
    pub fn translation_key(&self) -> &'static str {
        match self {
            FieldError::NameRequired => "contact.form.nameRequired",
            FieldError::EmailRequired => "contact.form.emailRequired",
            FieldError::EmailInvalid => "contact.form.emailInvalid",
            FieldError::MessageRequired => "contact.form.messageRequired",
            FieldError::ConsentRequired => "contact.form.consentRequired",
        }
    }
}

pub type FieldErrors = BTreeMap<ContactField, FieldError>;

pub fn validate_form(data: &ContactFormData) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if data.name.trim().is_empty() {
        errors.insert(ContactField::Name, FieldError::NameRequired);
    }
    if data.email.trim().is_empty() {
        errors.insert(ContactField::Email, FieldError::EmailRequired);
    } else if !validate_email(&data.email) {
        errors.insert(ContactField::Email, FieldError::EmailInvalid);
    }
    if data.message.trim().is_empty() {
        errors.insert(ContactField::Message, FieldError::MessageRequired);
    }
    if !data.consent {
        errors.insert(ContactField::Consent, FieldError::ConsentRequired);
    }
    errors
}

/// Body of `POST /contactFormSubmit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRequest {
    #[serde(flatten)]
    pub data: ContactFormData,
    pub language: String,
}

/// Either response shape the intake service sends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

pub const SUBMIT_ERROR_KEY: &str = "contact.error.message";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub data: ContactFormData,
    pub errors: FieldErrors,
    pub is_submitting: bool,
    pub is_submitted: bool,
    /// Translation key of the banner shown after a failed submission.
    pub submit_error: Option<&'static str>,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, value: &str) {
        self.data.name = value.to_string();
        self.errors.remove(&ContactField::Name);
    }

    pub fn set_email(&mut self, value: &str) {
        self.data.email = value.to_string();
        self.errors.remove(&ContactField::Email);
    }

    pub fn set_message(&mut self, value: &str) {
        self.data.message = value.to_string();
        self.errors.remove(&ContactField::Message);
    }

    pub fn set_consent(&mut self, value: bool) {
        self.data.consent = value;
        self.errors.remove(&ContactField::Consent);
    }

    pub fn set_newsletter(&mut self, value: bool) {
        self.data.newsletter = value;
    }

    /// Validates and, if clean, moves to submitting and returns the request body.
    pub fn begin_submit(&mut self, language: Language) -> Option<ContactRequest> {
        let errors = validate_form(&self.data);
        if !errors.is_empty() {
            self.errors = errors;
            return None;
        }
        self.errors.clear();
        self.is_submitting = true;
        self.submit_error = None;
        Some(ContactRequest {
            data: self.data.clone(),
            language: language.code().to_string(),
        })
    }

    /// Records the outcome. `status_ok` is the HTTP-level result; a missing or
    /// unparseable body counts as failure. Returns whether the submission succeeded.
    pub fn finish_submit(&mut self, status_ok: bool, response: Option<ContactResponse>) -> bool {
        self.is_submitting = false;
        let success = status_ok && response.as_ref().is_some_and(|r| r.success);
        if success {
            self.is_submitted = true;
        } else {
            let reason = response
                .and_then(|r| r.error)
                .unwrap_or_else(|| "Failed to submit form".to_string());
            log::error!("Contact form submission error: {}", reason);
            self.submit_error = Some(SUBMIT_ERROR_KEY);
        }
        success
    }
}

/// What came back from the intake service: HTTP-level success plus the body, if it parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactReply {
    pub status_ok: bool,
    pub response: Option<ContactResponse>,
}

/// Runs one submission through `send`. A transport error counts as a failed submission.
/// Returns whether it succeeded, which is what gets reported to analytics.
pub async fn submit_with<F, Fut, E>(form: &mut ContactForm, language: Language, send: F) -> bool
where
    F: FnOnce(ContactRequest) -> Fut,
    Fut: Future<Output = Result<ContactReply, E>>,
    E: std::fmt::Display,
{
    let Some(request) = form.begin_submit(language) else {
        return false;
    };
    match send(request).await {
        Ok(reply) => form.finish_submit(reply.status_ok, reply.response),
        Err(e) => {
            log::error!("Contact form request failed: {}", e);
            form.finish_submit(false, None)
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{send_contact_request, submit_contact};

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{contact_endpoint, submit_with, ContactForm, ContactReply, ContactRequest};
    use crate::i18n::routes::Language;
    use gloo_net::http::Request;

    pub async fn send_contact_request(
        request: ContactRequest,
        dev: bool,
    ) -> Result<ContactReply, gloo_net::Error> {
        let response = Request::post(contact_endpoint(dev))
            .header("Content-Type", "application/json")
            .json(&request)?
            .send()
            .await?;
        let status_ok = response.ok();
        let response = match response.json().await {
            Ok(body) => Some(body),
            Err(e) => {
                log::warn!("Unreadable contact response: {}", e);
                None
            }
        };
        Ok(ContactReply {
            status_ok,
            response,
        })
    }

    /// POSTs the form to the intake service and records the outcome on `form`.
    pub async fn submit_contact(form: &mut ContactForm, language: Language, dev: bool) -> bool {
        submit_with(form, language, |request| send_contact_request(request, dev)).await
    }
}
