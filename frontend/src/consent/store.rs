use crate::consent::bus::ConsentBus;
use crate::consent::record::{
    now_millis, ConsentCategory, ConsentRecord, ConsentUpdate, CONSENT_STORAGE_KEY,
};
use crate::consent::storage::{ConsentStorage, StorageError};

/// Durable consent decision plus its change broadcast.
///
/// Reads never fail: anything unreadable, unparseable or from an older consent
/// version is reported as "no decision". Writes replace the whole record and,
/// once persisted, broadcast it.
#[derive(Clone)]
pub struct ConsentStore<S: ConsentStorage> {
    storage: S,
    bus: ConsentBus,
}

impl<S: ConsentStorage> ConsentStore<S> {
    pub fn new(storage: S, bus: ConsentBus) -> Self {
        Self { storage, bus }
    }

    pub fn bus(&self) -> &ConsentBus {
        &self.bus
    }

    pub fn load(&self) -> Option<ConsentRecord> {
        let raw = match self.storage.get_item(CONSENT_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::error!("Error reading cookie consent: {}", e);
                return None;
            }
        };
        let record: ConsentRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                log::error!("Error reading cookie consent: {}", e);
                return None;
            }
        };
        // A stale record stays in storage until the next save overwrites it.
        record.is_current().then_some(record)
    }

    pub fn has_user_made_choice(&self) -> bool {
        self.load().is_some()
    }

    /// Fail closed: no decision means no consent. `Necessary` is always granted.
    pub fn has_consent(&self, category: ConsentCategory) -> bool {
        if !category.is_optional() {
            return true;
        }
        self.load().is_some_and(|record| record.allows(category))
    }

    pub fn save(&self, update: &ConsentUpdate) -> Result<ConsentRecord, StorageError> {
        let record = ConsentRecord::from_update(update, now_millis());
        let raw = serde_json::to_string(&record)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        self.storage.set_item(CONSENT_STORAGE_KEY, &raw)?;
        self.bus.notify(Some(&record));
        Ok(record)
    }

    pub fn accept_all(&self) -> Result<ConsentRecord, StorageError> {
        self.save(&ConsentUpdate::all())
    }

    pub fn accept_necessary_only(&self) -> Result<ConsentRecord, StorageError> {
        self.save(&ConsentUpdate::necessary_only())
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(CONSENT_STORAGE_KEY)?;
        self.bus.notify(None);
        Ok(())
    }
}
