use async_trait::async_trait;
use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::models::{AccountRecord, CommunityRecord, CommunitySubmission, NewImage, NewUser, StoredImage};
use crate::types::{CommunityLookup, WorkerRef};

/// Everything the routes need from the database, one call per route step
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Connectivity check for /health
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// Insert into `users`, returning the full stored row as JSON
    async fn insert_user(&self, user: &NewUser) -> Result<Value, DatabaseError>;

    /// Insert into `userdetails`, returning the full stored row as JSON
    async fn insert_account(&self, account: &AccountRecord) -> Result<Value, DatabaseError>;

    async fn insert_image(&self, image: &NewImage) -> Result<i32, DatabaseError>;

    async fn find_image(&self, id: i32) -> Result<Option<StoredImage>, DatabaseError>;

    /// True when a `userdetails` row matches and carries the community worker role
    async fn is_community_worker(&self, worker: &WorkerRef) -> Result<bool, DatabaseError>;

    /// Create `community_data` if it does not exist yet
    async fn ensure_community_table(&self) -> Result<(), DatabaseError>;

    async fn insert_community(&self, submission: &CommunitySubmission) -> Result<(), DatabaseError>;

    async fn find_community(&self, lookup: &CommunityLookup) -> Result<Vec<CommunityRecord>, DatabaseError>;
}
