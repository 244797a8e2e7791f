use diesel::prelude::*;
use diesel::result::Error as DieselError;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    db::DbPool,
    models::contact_models::{Contact, NewContact},
    schema::contacts,
};

/// Id handed back when persistence is deliberately skipped.
pub const LOCAL_SENTINEL_ID: &str = "local_test_id";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to get DB connection: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("Database error: {0}")]
    Database(#[from] DieselError),
}

/// Append-only home of contact submissions.
#[cfg_attr(test, mockall::automock)]
pub trait ContactStore: Send + Sync {
    /// Stores the record and returns the id the store assigned to it.
    fn insert(&self, contact: &NewContact) -> Result<String, StoreError>;
}

pub struct DieselContactStore {
    pool: DbPool,
}

impl DieselContactStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

// Read paths only exist for checking what `insert` wrote.
#[cfg(test)]
impl DieselContactStore {
    pub fn find_by_id(&self, contact_id: &str) -> Result<Option<Contact>, StoreError> {
        let mut conn = self.pool.get()?;
        let contact = contacts::table
            .find(contact_id)
            .select(Contact::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(contact)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        let mut conn = self.pool.get()?;
        Ok(contacts::table.count().get_result(&mut conn)?)
    }
}

impl ContactStore for DieselContactStore {
    fn insert(&self, contact: &NewContact) -> Result<String, StoreError> {
        let mut conn = self.pool.get()?;
        let row = Contact::from_new(Uuid::new_v4().to_string(), contact);
        diesel::insert_into(contacts::table)
            .values(&row)
            .execute(&mut conn)?;
        tracing::info!(
            id = %row.id,
            email = %row.email,
            language = %row.language,
            "Contact form submission saved"
        );
        Ok(row.id)
    }
}

/// Used when no database is configured (local development). Nothing is written.
pub struct SkippedContactStore;

impl ContactStore for SkippedContactStore {
    fn insert(&self, _contact: &NewContact) -> Result<String, StoreError> {
        tracing::warn!("Skipping contact store write: no database configured");
        Ok(LOCAL_SENTINEL_ID.to_string())
    }
}
