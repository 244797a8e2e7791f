use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    En,
}

impl Language {
    /// Unknown or empty codes fall back to German.
    pub fn from_code(code: &str) -> Self {
        match code {
            "en" => Language::En,
            _ => Language::De,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }

    pub fn thank_you_message(&self) -> &'static str {
        match self {
            Language::De => "Vielen Dank für Ihre Nachricht! Wir melden uns bald bei Ihnen.",
            Language::En => "Thank you for your message! We will get back to you soon.",
        }
    }
}
