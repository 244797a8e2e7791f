use axum::http::HeaderValue;
use std::{env, fmt, time::Duration};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_CONTACT_RECIPIENT: &str = "kontakt@henq-technologies.de";
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 5] = [
    "http://localhost:3000",
    "http://localhost:3001",
    "https://henq-technologies.com",
    "https://henq-web.web.app",
    "https://henq-web.firebaseapp.com",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid {key} value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub development: bool,
    /// `None` means submissions are not persisted (development without a database).
    pub database_url: Option<String>,
    /// `None` means mail is only logged (development without credentials).
    pub smtp: Option<SmtpConfig>,
    pub contact_recipient: String,
    pub allowed_origins: Vec<HeaderValue>,
    pub sentry_dsn: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let development = var("ENVIRONMENT").as_deref() == Some("development");

        let database_url = match var("DATABASE_URL") {
            Some(url) => Some(url),
            None if development => {
                warn!("DATABASE_URL not set, contact submissions will not be persisted");
                None
            }
            None => return Err(ConfigError::Missing("DATABASE_URL")),
        };

        let smtp = match (var("EMAIL_USER"), var("EMAIL_PASS")) {
            (Some(username), Some(password)) => Some(SmtpConfig {
                server: var("SMTP_SERVER").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                port: parse_or("SMTP_PORT", var("SMTP_PORT"), 587)?,
                username,
                password,
                timeout: Duration::from_secs(parse_or(
                    "MAIL_TIMEOUT_SECS",
                    var("MAIL_TIMEOUT_SECS"),
                    30,
                )?),
            }),
            _ if development => {
                warn!("EMAIL_USER/EMAIL_PASS not set, notification emails will only be logged");
                None
            }
            (None, _) => return Err(ConfigError::Missing("EMAIL_USER")),
            (_, None) => return Err(ConfigError::Missing("EMAIL_PASS")),
        };

        let allowed_origins = match var("ALLOWED_ORIGINS") {
            Some(raw) => parse_origins(raw.split(','))?,
            None => parse_origins(DEFAULT_ALLOWED_ORIGINS.into_iter())?,
        };

        let contact_recipient = var("CONTACT_RECIPIENT").unwrap_or_else(|| {
            info!("CONTACT_RECIPIENT not set, using default: {DEFAULT_CONTACT_RECIPIENT}");
            DEFAULT_CONTACT_RECIPIENT.to_string()
        });

        Ok(Self {
            port: parse_or("PORT", var("PORT"), 3000)?,
            development,
            database_url,
            smtp,
            contact_recipient,
            allowed_origins,
            sentry_dsn: var("SENTRY_DSN"),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_origins<'a, I>(origins: I) -> Result<Vec<HeaderValue>, ConfigError>
where
    I: Iterator<Item = &'a str>,
{
    origins
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ConfigError::Invalid {
                key: "ALLOWED_ORIGINS",
                value: origin.to_string(),
            })
        })
        .collect()
}
