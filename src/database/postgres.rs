use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::config::DatabaseConfig;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    AccountRecord, CommunityRecord, CommunitySubmission, NewImage, NewUser, StoredImage, USER_COLUMNS,
};
use crate::database::store::SubmissionStore;
use crate::types::{CommunityLookup, WorkerRef, COMMUNITY_WORKER_ROLE};

const CREATE_COMMUNITY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS community_data (
    id SERIAL PRIMARY KEY,
    householdid TEXT,
    date_of_visit DATE,
    village TEXT,
    state TEXT,
    district TEXT,
    household_size INTEGER,
    symptoms TEXT,
    mode_of_medication TEXT,
    antibiotics TEXT,
    patient_id SERIAL,
    name TEXT,
    age INTEGER,
    gender TEXT,
    occupation TEXT,
    antibiotic_image BYTEA,
    image_mimetype TEXT,
    obtained_from TEXT,
    date_of_antibiotic_used DATE,
    dosage TEXT,
    unit TEXT,
    duration INTEGER,
    full_course_taken BOOLEAN,
    doctor TEXT,
    antibiotic_misuse TEXT,
    antibiotic_resistance TEXT,
    want_info BOOLEAN
)
"#;

// patient_id is SERIAL (NOT NULL); an omitted value draws from its sequence
const INSERT_COMMUNITY: &str = r#"
INSERT INTO community_data (
    householdid, date_of_visit, village, state, district,
    household_size, symptoms, mode_of_medication, antibiotics, patient_id,
    name, age, gender, occupation, antibiotic_image, image_mimetype,
    obtained_from, date_of_antibiotic_used, dosage, unit, duration,
    full_course_taken, doctor, antibiotic_misuse, antibiotic_resistance, want_info
)
VALUES (
    $1, $2, $3, $4, $5,
    $6, $7, $8, $9, COALESCE($10, nextval(pg_get_serial_sequence('community_data', 'patient_id'))::integer),
    $11, $12, $13, $14, $15, $16,
    $17, $18, $19, $20, $21,
    $22, $23, $24, $25, $26
)
"#;

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    slow_query_threshold: Option<Duration>,
}

impl PgStore {
    pub fn new(pool: PgPool, config: &DatabaseConfig) -> Self {
        let slow_query_threshold = config
            .enable_slow_query_warning
            .then(|| Duration::from_millis(config.slow_query_threshold_ms));
        Self { pool, slow_query_threshold }
    }

    async fn timed<T, F>(&self, label: &'static str, fut: F) -> Result<T, DatabaseError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let started = Instant::now();
        let result = fut.await;
        let elapsed = started.elapsed();

        if let Some(threshold) = self.slow_query_threshold {
            if elapsed > threshold {
                tracing::warn!(query = label, elapsed_ms = elapsed.as_millis() as u64, "slow query");
            }
        }

        result.map_err(DatabaseError::from)
    }
}

/// Insert one row from a JSON object bound as `$1`, letting PostgreSQL coerce
/// each value to its column type, and hand the stored row back as JSON.
/// Table and column names come from fixed lists, never from the request.
fn populate_insert_sql(table: &str, columns: &[&str]) -> String {
    let columns = columns.join(", ");
    format!(
        "WITH inserted AS (\
            INSERT INTO {table} ({columns}) \
            SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1) \
            RETURNING *\
        ) SELECT row_to_json(inserted) AS row FROM inserted"
    )
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn insert_user(&self, user: &NewUser) -> Result<Value, DatabaseError> {
        let sql = populate_insert_sql("users", USER_COLUMNS);
        let row = self
            .timed(
                "insert_user",
                sqlx::query(&sql)
                    .bind(Json(user.values()))
                    .fetch_one(&self.pool),
            )
            .await?;

        Ok(row.try_get("row")?)
    }

    async fn insert_account(&self, account: &AccountRecord) -> Result<Value, DatabaseError> {
        let sql = populate_insert_sql("userdetails", account.columns);
        let row = self
            .timed(
                "insert_account",
                sqlx::query(&sql)
                    .bind(Json(&account.values))
                    .fetch_one(&self.pool),
            )
            .await?;

        Ok(row.try_get("row")?)
    }

    async fn insert_image(&self, image: &NewImage) -> Result<i32, DatabaseError> {
        let id = self
            .timed(
                "insert_image",
                sqlx::query_scalar::<_, i32>(
                    "INSERT INTO images (name, data, mimetype) VALUES ($1, $2, $3) RETURNING id",
                )
                .bind(&image.name)
                .bind(&image.data)
                .bind(&image.mimetype)
                .fetch_one(&self.pool),
            )
            .await?;

        Ok(id)
    }

    async fn find_image(&self, id: i32) -> Result<Option<StoredImage>, DatabaseError> {
        self.timed(
            "find_image",
            sqlx::query_as::<_, StoredImage>("SELECT id, name, data, mimetype FROM images WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn is_community_worker(&self, worker: &WorkerRef) -> Result<bool, DatabaseError> {
        let query = match worker {
            WorkerRef::PersonId(id) => sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM userdetails WHERE personid = $1 AND userrole = $2)",
            )
            .bind(*id),
            WorkerRef::AbhaId(abha) => sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM userdetails WHERE abhaid = $1 AND userrole = $2)",
            )
            .bind(abha.as_str()),
        };

        self.timed(
            "is_community_worker",
            query.bind(COMMUNITY_WORKER_ROLE).fetch_one(&self.pool),
        )
        .await
    }

    async fn ensure_community_table(&self) -> Result<(), DatabaseError> {
        self.timed(
            "ensure_community_table",
            sqlx::query(CREATE_COMMUNITY_TABLE).execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn insert_community(&self, s: &CommunitySubmission) -> Result<(), DatabaseError> {
        let query = sqlx::query(INSERT_COMMUNITY)
            .bind(&s.householdid)
            .bind(s.date_of_visit)
            .bind(&s.village)
            .bind(&s.state)
            .bind(&s.district)
            .bind(s.household_size)
            .bind(&s.symptoms)
            .bind(&s.mode_of_medication)
            .bind(&s.antibiotics)
            .bind(s.patient_id)
            .bind(&s.name)
            .bind(s.age)
            .bind(&s.gender)
            .bind(&s.occupation)
            .bind(&s.antibiotic_image)
            .bind(&s.image_mimetype)
            .bind(&s.obtained_from)
            .bind(s.date_of_antibiotic_used)
            .bind(&s.dosage)
            .bind(&s.unit)
            .bind(s.duration)
            .bind(s.full_course_taken)
            .bind(&s.doctor)
            .bind(&s.antibiotic_misuse)
            .bind(&s.antibiotic_resistance)
            .bind(s.want_info);

        self.timed("insert_community", query.execute(&self.pool)).await?;
        Ok(())
    }

    async fn find_community(&self, lookup: &CommunityLookup) -> Result<Vec<CommunityRecord>, DatabaseError> {
        let query = match lookup {
            CommunityLookup::Household(householdid) => {
                sqlx::query_as::<_, CommunityRecord>("SELECT * FROM community_data WHERE householdid = $1 ORDER BY id")
                    .bind(householdid.as_str())
            }
            CommunityLookup::Patient(patient_id) => {
                sqlx::query_as::<_, CommunityRecord>("SELECT * FROM community_data WHERE patient_id = $1 ORDER BY id")
                    .bind(*patient_id)
            }
        };

        self.timed("find_community", query.fetch_all(&self.pool)).await
    }
}
