/// Directory service: bulk import, deletion and self-service updates
use crate::{
    error::DirectoryResult,
    store::{truncate, ContactRecord, ContactStore, ContactUpdate, NewContact, MAX_FIELD_LENGTH},
};
use std::sync::Arc;

/// User-facing CRUD surface over the contact store
#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<dyn ContactStore>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// All records in store order
    pub async fn list_all(&self) -> DirectoryResult<Vec<ContactRecord>> {
        self.store.list_all().await
    }

    /// Get a contact by email, `None` if unknown
    pub async fn get_by_email(&self, email: &str) -> DirectoryResult<Option<ContactRecord>> {
        self.store.find_by_email(email).await
    }

    /// Create a contact from full data
    ///
    /// If the email is already present, the existing record is returned
    /// unchanged.
    pub async fn create_contact(&self, data: NewContact) -> DirectoryResult<ContactRecord> {
        if let Some(existing) = self.store.find_by_email(&data.email).await? {
            return Ok(existing);
        }

        let record = self.store.create(Some(data)).await?;
        self.store.persist().await?;

        Ok(record)
    }

    /// Add contacts from a semicolon separated list of addresses
    ///
    /// Returns one record per accepted address: the existing one if the
    /// email is already known, otherwise a newly created one. Entries
    /// without `@` are skipped. The batch is persisted once at the end.
    pub async fn add_by_email_list(&self, email_list: &str) -> DirectoryResult<Vec<ContactRecord>> {
        let mut records = Vec::new();

        for email in email_list.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            if let Some(record) = self.add_by_email(email).await? {
                records.push(record);
            }
        }

        self.store.persist().await?;
        tracing::info!(count = records.len(), "Added contacts by email list");

        Ok(records)
    }

    async fn add_by_email(&self, email: &str) -> DirectoryResult<Option<ContactRecord>> {
        if !email.contains('@') {
            tracing::debug!(email, "Skipping address without @");
            return Ok(None);
        }

        if let Some(existing) = self.store.find_by_email(email).await? {
            return Ok(Some(existing));
        }

        let record = self
            .store
            .create(Some(NewContact {
                email: email.to_string(),
                ..Default::default()
            }))
            .await?;

        Ok(Some(record))
    }

    /// Delete the contact with the given email
    ///
    /// Persists even when nothing was removed.
    pub async fn delete_by_email(&self, email: &str) -> DirectoryResult<bool> {
        let removed = self.store.delete(email).await?;
        self.store.persist().await?;

        if removed {
            tracing::info!(email, "Deleted contact");
        }

        Ok(removed)
    }

    /// Overwrite the user-editable data of a contact
    ///
    /// Text fields are cut to 100 characters. Email, secret and the
    /// timestamps are left alone. Returns false if the email is empty or
    /// unknown.
    pub async fn update_record(&self, email: &str, data: &ContactUpdate) -> DirectoryResult<bool> {
        if email.is_empty() {
            return Ok(false);
        }

        let Some(mut record) = self.store.find_by_email(email).await? else {
            return Ok(false);
        };

        record.name = truncate(data.name.as_deref(), MAX_FIELD_LENGTH);
        record.prename = truncate(data.prename.as_deref(), MAX_FIELD_LENGTH);
        record.street = truncate(data.street.as_deref(), MAX_FIELD_LENGTH);
        record.zipcode = truncate(data.zipcode.as_deref(), MAX_FIELD_LENGTH);
        record.city = truncate(data.city.as_deref(), MAX_FIELD_LENGTH);
        record.country = truncate(data.country.as_deref(), MAX_FIELD_LENGTH);
        record.phone = truncate(data.phone.as_deref(), MAX_FIELD_LENGTH);
        record.is_name_visible = data.is_name_visible;
        record.is_email_visible = data.is_email_visible;
        record.is_address_visible = data.is_address_visible;
        record.is_phone_visible = data.is_phone_visible;

        self.store.save(&record).await?;
        self.store.persist().await?;

        Ok(true)
    }
}
