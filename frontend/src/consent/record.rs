use serde::{Deserialize, Serialize};

/// Bumping this invalidates every stored decision and brings the banner back.
pub const CONSENT_VERSION: &str = "1.0";
pub const CONSENT_STORAGE_KEY: &str = "henq-cookie-consent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsentCategory {
    Necessary,
    Statistics,
    Functional,
    Marketing,
}

impl ConsentCategory {
    pub const ALL: [ConsentCategory; 4] = [
        ConsentCategory::Necessary,
        ConsentCategory::Statistics,
        ConsentCategory::Functional,
        ConsentCategory::Marketing,
    ];

    pub fn is_optional(&self) -> bool {
        !matches!(self, ConsentCategory::Necessary)
    }
}

/// The persisted decision. Field names match the JSON the site has always stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    pub necessary: bool,
    pub statistics: bool,
    pub functional: bool,
    pub marketing: bool,
    pub consent_version: String,
    /// Epoch milliseconds of the last update.
    pub timestamp: i64,
}

impl ConsentRecord {
    /// Nothing optional granted.
    pub fn defaults(timestamp: i64) -> Self {
        Self {
            necessary: true,
            statistics: false,
            functional: false,
            marketing: false,
            consent_version: CONSENT_VERSION.to_string(),
            timestamp,
        }
    }

    /// Merges `update` over the defaults. `necessary` is forced on whatever the update says.
    pub fn from_update(update: &ConsentUpdate, timestamp: i64) -> Self {
        let defaults = Self::defaults(timestamp);
        Self {
            necessary: true,
            statistics: update.statistics.unwrap_or(defaults.statistics),
            functional: update.functional.unwrap_or(defaults.functional),
            marketing: update.marketing.unwrap_or(defaults.marketing),
            ..defaults
        }
    }

    pub fn allows(&self, category: ConsentCategory) -> bool {
        match category {
            ConsentCategory::Necessary => self.necessary,
            ConsentCategory::Statistics => self.statistics,
            ConsentCategory::Functional => self.functional,
            ConsentCategory::Marketing => self.marketing,
        }
    }

    pub fn set(&mut self, category: ConsentCategory, value: bool) {
        match category {
            ConsentCategory::Necessary => {}
            ConsentCategory::Statistics => self.statistics = value,
            ConsentCategory::Functional => self.functional = value,
            ConsentCategory::Marketing => self.marketing = value,
        }
    }

    pub fn is_current(&self) -> bool {
        self.consent_version == CONSENT_VERSION
    }
}

/// A partial selection; unset categories take their default (denied).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsentUpdate {
    pub necessary: Option<bool>,
    pub statistics: Option<bool>,
    pub functional: Option<bool>,
    pub marketing: Option<bool>,
}

impl ConsentUpdate {
    pub fn all() -> Self {
        Self {
            necessary: Some(true),
            statistics: Some(true),
            functional: Some(true),
            marketing: Some(true),
        }
    }

    pub fn necessary_only() -> Self {
        Self {
            necessary: Some(true),
            statistics: Some(false),
            functional: Some(false),
            marketing: Some(false),
        }
    }

    pub fn from_record(record: &ConsentRecord) -> Self {
        Self {
            necessary: Some(record.necessary),
            statistics: Some(record.statistics),
            functional: Some(record.functional),
            marketing: Some(record.marketing),
        }
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_cannot_disable_necessary() {
        let update = ConsentUpdate {
            necessary: Some(false),
            statistics: Some(true),
            ..Default::default()
        };
        let record = ConsentRecord::from_update(&update, 7);
        assert!(record.necessary);
        assert!(record.statistics);
        assert!(!record.functional);
        assert!(!record.marketing);
        assert_eq!(record.consent_version, CONSENT_VERSION);
        assert_eq!(record.timestamp, 7);
    }

    #[test]
    fn set_ignores_necessary() {
        let mut record = ConsentRecord::defaults(0);
        record.set(ConsentCategory::Necessary, false);
        record.set(ConsentCategory::Marketing, true);
        assert!(record.allows(ConsentCategory::Necessary));
        assert!(record.allows(ConsentCategory::Marketing));
    }

    #[test]
    fn serializes_with_the_stored_field_names() {
        let json = serde_json::to_value(ConsentRecord::defaults(1700000000000)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "necessary": true,
                "statistics": false,
                "functional": false,
                "marketing": false,
                "consentVersion": "1.0",
                "timestamp": 1700000000000i64,
            })
        );
    }
}
