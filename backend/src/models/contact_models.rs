use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use serde_json::Value;

use crate::models::language::Language;
use crate::schema::contacts;
use crate::utils::sanitize::{is_truthy, sanitize_input};

/// A submission after sanitization. Every free-text field has been through the
/// sanitizer before this exists, so nothing downstream sees raw input.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    pub newsletter: bool,
    pub language: Language,
    pub timestamp: DateTime<Utc>,
}

impl ContactSubmission {
    pub fn from_payload(payload: &Value, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: sanitize_input(payload.get("name")),
            email: sanitize_input(payload.get("email")),
            message: sanitize_input(payload.get("message")),
            newsletter: is_truthy(payload.get("newsletter")),
            language: Language::from_code(&sanitize_input(payload.get("language"))),
            timestamp,
        }
    }

    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn to_new_contact(&self) -> NewContact {
        NewContact {
            name: self.name.clone(),
            email: self.email.clone(),
            message: self.message.clone(),
            newsletter: self.newsletter,
            language: self.language.code().to_string(),
            created_at: self.timestamp_iso(),
        }
    }
}

/// What the handler hands to the store; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub message: String,
    pub newsletter: bool,
    pub language: String,
    pub created_at: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = contacts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub newsletter: bool,
    pub language: String,
    pub created_at: String, // ISO-8601, set server-side
}

impl Contact {
    pub fn from_new(id: String, new_contact: &NewContact) -> Self {
        Self {
            id,
            name: new_contact.name.clone(),
            email: new_contact.email.clone(),
            message: new_contact.message.clone(),
            newsletter: new_contact.newsletter,
            language: new_contact.language.clone(),
            created_at: new_contact.created_at.clone(),
        }
    }
}
