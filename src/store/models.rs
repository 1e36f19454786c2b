/// Contact record models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound for every free-text field written through the update path
pub const MAX_FIELD_LENGTH: usize = 100;

/// A contact record in the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Store-internal identity, stable across saves
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub prename: String,
    pub street: String,
    pub zipcode: String,
    pub city: String,
    pub country: String,
    pub phone: String,
    pub is_name_visible: bool,
    pub is_email_visible: bool,
    pub is_address_visible: bool,
    pub is_phone_visible: bool,
    /// Secret of the current magic link
    #[serde(skip_serializing, default)]
    pub secret: String,
    pub secret_valid_until: Option<DateTime<Utc>>,
    pub last_email_sent_out: Option<DateTime<Utc>>,
}

impl ContactRecord {
    /// Create an empty record carrying the given secret
    pub fn new(secret: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: String::new(),
            name: String::new(),
            prename: String::new(),
            street: String::new(),
            zipcode: String::new(),
            city: String::new(),
            country: String::new(),
            phone: String::new(),
            is_name_visible: false,
            is_email_visible: false,
            is_address_visible: false,
            is_phone_visible: false,
            secret,
            secret_valid_until: None,
            last_email_sent_out: None,
        }
    }

    /// Copy the supplied initial data into this record
    pub fn apply_new(&mut self, data: NewContact) {
        self.email = data.email;
        self.name = data.name;
        self.prename = data.prename;
        self.street = data.street;
        self.zipcode = data.zipcode;
        self.city = data.city;
        self.country = data.country;
        self.phone = data.phone;
        self.is_name_visible = data.is_name_visible;
        self.is_email_visible = data.is_email_visible;
        self.is_address_visible = data.is_address_visible;
        self.is_phone_visible = data.is_phone_visible;
    }
}

/// Initial data for an explicitly created record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewContact {
    pub email: String,
    pub name: String,
    pub prename: String,
    pub street: String,
    pub zipcode: String,
    pub city: String,
    pub country: String,
    pub phone: String,
    pub is_name_visible: bool,
    pub is_email_visible: bool,
    pub is_address_visible: bool,
    pub is_phone_visible: bool,
}

/// User-supplied changes to a record
///
/// Absent strings are stored as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub prename: Option<String>,
    pub street: Option<String>,
    pub zipcode: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub is_name_visible: bool,
    pub is_email_visible: bool,
    pub is_address_visible: bool,
    pub is_phone_visible: bool,
}

/// Keep the first `max_length` characters of `value`
pub fn truncate(value: Option<&str>, max_length: usize) -> String {
    match value {
        Some(value) => value.chars().take(max_length).collect(),
        None => String::new(),
    }
}
