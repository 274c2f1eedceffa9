use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::database::manager::DatabaseError;
use crate::database::models::{AccountRecord, CommunityRecord, CommunitySubmission, NewImage, NewUser, StoredImage};
use crate::database::store::SubmissionStore;
use crate::types::{CommunityLookup, WorkerRef, COMMUNITY_WORKER_ROLE};

/// In-memory stand-in for PostgreSQL used by router tests
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
    failing: AtomicBool,
}

#[derive(Default)]
struct Tables {
    users: Vec<Value>,
    accounts: Vec<Map<String, Value>>,
    images: Vec<StoredImage>,
    community: Option<Vec<CommunityRecord>>,
    patient_seq: i32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail like a lost connection
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn community_table_exists(&self) -> bool {
        self.tables().community.is_some()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(driver_error("connection refused"));
        }
        Ok(())
    }
}

/// What a TEXT column hands back for a JSON value
fn as_text(value: &Option<Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::Null,
        Some(Value::String(s)) => Value::String(s.clone()),
        Some(other) => Value::String(other.to_string()),
    }
}

fn driver_error(message: &str) -> DatabaseError {
    DatabaseError::Sqlx(sqlx::Error::Protocol(message.to_string()))
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check()
    }

    async fn insert_user(&self, user: &NewUser) -> Result<Value, DatabaseError> {
        self.check()?;
        let mut tables = self.tables();
        let row = json!({
            "id": tables.users.len() + 1,
            "email": as_text(&user.email),
            "mobile": as_text(&user.mobile),
            "otp": as_text(&user.otp),
        });
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn insert_account(&self, account: &AccountRecord) -> Result<Value, DatabaseError> {
        self.check()?;
        let mut tables = self.tables();
        let mut row = Map::new();
        row.insert("personid".to_string(), json!(tables.accounts.len() + 1));
        for column in account.columns {
            let value = account.values.get(*column).cloned().unwrap_or(Value::Null);
            row.insert(column.to_string(), value);
        }
        tables.accounts.push(row.clone());
        Ok(Value::Object(row))
    }

    async fn insert_image(&self, image: &NewImage) -> Result<i32, DatabaseError> {
        self.check()?;
        let mut tables = self.tables();
        let id = tables.images.len() as i32 + 1;
        tables.images.push(StoredImage {
            id,
            name: image.name.clone(),
            data: image.data.clone(),
            mimetype: image.mimetype.clone(),
        });
        Ok(id)
    }

    async fn find_image(&self, id: i32) -> Result<Option<StoredImage>, DatabaseError> {
        self.check()?;
        Ok(self.tables().images.iter().find(|img| img.id == id).cloned())
    }

    async fn is_community_worker(&self, worker: &WorkerRef) -> Result<bool, DatabaseError> {
        self.check()?;
        let tables = self.tables();
        Ok(tables.accounts.iter().any(|row| {
            let matches_id = match worker {
                WorkerRef::PersonId(id) => row.get("personid") == Some(&json!(id)),
                WorkerRef::AbhaId(abha) => row.get("abhaid") == Some(&json!(abha)),
            };
            matches_id && row.get("userrole") == Some(&json!(COMMUNITY_WORKER_ROLE))
        }))
    }

    async fn ensure_community_table(&self) -> Result<(), DatabaseError> {
        self.check()?;
        self.tables().community.get_or_insert_with(Vec::new);
        Ok(())
    }

    async fn insert_community(&self, submission: &CommunitySubmission) -> Result<(), DatabaseError> {
        self.check()?;
        let mut tables = self.tables();
        tables.patient_seq += 1;
        let patient_id = submission.patient_id.unwrap_or(tables.patient_seq);
        let rows = tables
            .community
            .as_mut()
            .ok_or_else(|| driver_error("relation \"community_data\" does not exist"))?;
        let id = rows.len() as i32 + 1;
        rows.push(CommunityRecord::from_submission(id, patient_id, submission));
        Ok(())
    }

    async fn find_community(&self, lookup: &CommunityLookup) -> Result<Vec<CommunityRecord>, DatabaseError> {
        self.check()?;
        let tables = self.tables();
        let rows = tables
            .community
            .as_ref()
            .ok_or_else(|| driver_error("relation \"community_data\" does not exist"))?;
        Ok(rows
            .iter()
            .filter(|row| match lookup {
                CommunityLookup::Household(h) => row.householdid.as_deref() == Some(h.as_str()),
                CommunityLookup::Patient(p) => row.patient_id == Some(*p),
            })
            .cloned()
            .collect())
    }
}
