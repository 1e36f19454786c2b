/// Public view of the directory
///
/// Only data the contact chose to share leaves this module. Secrets,
/// ids and timestamps have no field in `PublicContactView`.
use crate::{
    error::DirectoryResult,
    store::{ContactRecord, ContactStore},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Publicly visible subset of a contact record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicContactView {
    pub name: String,
    pub prename: String,
    pub email: String,
    pub street: String,
    pub zipcode: String,
    pub city: String,
    pub country: String,
    pub phone: String,
    pub is_email_visible: bool,
    pub is_address_visible: bool,
    pub is_phone_visible: bool,
}

/// Project a record to its public form, `None` if the name is hidden
pub fn public_contact(record: &ContactRecord) -> Option<PublicContactView> {
    if !record.is_name_visible {
        return None;
    }

    let shown = |visible: bool, value: &str| {
        if visible {
            value.to_string()
        } else {
            String::new()
        }
    };

    Some(PublicContactView {
        name: record.name.clone(),
        prename: record.prename.clone(),
        email: shown(record.is_email_visible, &record.email),
        street: shown(record.is_address_visible, &record.street),
        zipcode: shown(record.is_address_visible, &record.zipcode),
        city: shown(record.is_address_visible, &record.city),
        country: shown(record.is_address_visible, &record.country),
        phone: shown(record.is_phone_visible, &record.phone),
        is_email_visible: record.is_email_visible,
        is_address_visible: record.is_address_visible,
        is_phone_visible: record.is_phone_visible,
    })
}

/// Read-only public listing over the contact store
#[derive(Clone)]
pub struct PublicProjection {
    store: Arc<dyn ContactStore>,
}

impl PublicProjection {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// Public data of all contacts with a visible name, sorted by name
    ///
    /// Names are compared byte-wise, not by locale.
    pub async fn public_view(&self) -> DirectoryResult<Vec<PublicContactView>> {
        let records = self.store.list_all().await?;

        let mut view: Vec<PublicContactView> = records.iter().filter_map(public_contact).collect();
        view.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

        Ok(view)
    }
}
