/// In-memory working set of contact records with SQLite write-back
use super::{ContactRecord, ContactStore, NewContact};
use crate::{
    error::{DirectoryError, DirectoryResult},
    secret::generate_secret,
};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Contact store keeping all records in memory
///
/// Records are loaded once when the store is opened. `persist` replaces
/// the content of the `contact` table with the working set inside one
/// transaction, so the table only ever reflects complete flushes.
pub struct ExtentStore {
    records: RwLock<Vec<ContactRecord>>,
    backing: Option<SqlitePool>,
}

impl ExtentStore {
    /// Create a store without durable backing
    pub fn in_memory() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            backing: None,
        }
    }

    /// Open a store backed by the `contact` table of the given pool
    pub async fn open(pool: SqlitePool) -> DirectoryResult<Self> {
        let records = load_contacts(&pool).await?;
        tracing::info!(count = records.len(), "Loaded contact records");

        Ok(Self {
            records: RwLock::new(records),
            backing: Some(pool),
        })
    }

    /// Number of records in the working set
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ContactStore for ExtentStore {
    async fn create(&self, initial: Option<NewContact>) -> DirectoryResult<ContactRecord> {
        let mut record = ContactRecord::new(generate_secret());
        if let Some(data) = initial {
            record.apply_new(data);
        }

        self.records.write().await.push(record.clone());
        tracing::debug!(id = %record.id, "Created contact record");

        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<ContactRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.email == email).cloned())
    }

    async fn list_all(&self) -> DirectoryResult<Vec<ContactRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn save(&self, record: &ContactRecord) -> DirectoryResult<()> {
        let mut records = self.records.write().await;
        let slot = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| DirectoryError::NotFound(format!("Contact {} not found", record.id)))?;

        *slot = record.clone();
        Ok(())
    }

    async fn delete(&self, email: &str) -> DirectoryResult<bool> {
        let mut records = self.records.write().await;
        match records.iter().position(|r| r.email == email) {
            Some(index) => {
                records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn persist(&self) -> DirectoryResult<()> {
        let Some(pool) = &self.backing else {
            return Ok(());
        };

        let records = self.records.read().await;
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM contact").execute(&mut *tx).await?;

        for (position, record) in records.iter().enumerate() {
            sqlx::query(
                "INSERT INTO contact (id, position, email, name, prename, street, zipcode, city, country, phone,
                                      is_name_visible, is_email_visible, is_address_visible, is_phone_visible,
                                      secret, secret_valid_until, last_email_sent_out)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            )
            .bind(record.id.to_string())
            .bind(position as i64)
            .bind(&record.email)
            .bind(&record.name)
            .bind(&record.prename)
            .bind(&record.street)
            .bind(&record.zipcode)
            .bind(&record.city)
            .bind(&record.country)
            .bind(&record.phone)
            .bind(record.is_name_visible)
            .bind(record.is_email_visible)
            .bind(record.is_address_visible)
            .bind(record.is_phone_visible)
            .bind(&record.secret)
            .bind(record.secret_valid_until)
            .bind(record.last_email_sent_out)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(count = records.len(), "Persisted contact records");

        Ok(())
    }
}

/// Read all contact rows in their stored order
async fn load_contacts(pool: &SqlitePool) -> DirectoryResult<Vec<ContactRecord>> {
    let rows = sqlx::query(
        "SELECT id, email, name, prename, street, zipcode, city, country, phone,
                is_name_visible, is_email_visible, is_address_visible, is_phone_visible,
                secret, secret_valid_until, last_email_sent_out
         FROM contact ORDER BY position",
    )
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let id: String = row.try_get("id")?;
        let id = Uuid::parse_str(&id)
            .map_err(|e| DirectoryError::Internal(format!("Invalid contact id {}: {}", id, e)))?;

        records.push(ContactRecord {
            id,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            prename: row.try_get("prename")?,
            street: row.try_get("street")?,
            zipcode: row.try_get("zipcode")?,
            city: row.try_get("city")?,
            country: row.try_get("country")?,
            phone: row.try_get("phone")?,
            is_name_visible: row.try_get("is_name_visible")?,
            is_email_visible: row.try_get("is_email_visible")?,
            is_address_visible: row.try_get("is_address_visible")?,
            is_phone_visible: row.try_get("is_phone_visible")?,
            secret: row.try_get("secret")?,
            secret_valid_until: row.try_get("secret_valid_until")?,
            last_email_sent_out: row.try_get("last_email_sent_out")?,
        });
    }

    Ok(records)
}
