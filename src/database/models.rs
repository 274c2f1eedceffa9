use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use sqlx::FromRow;

use crate::config::Instance;

/// Columns written to `users` by POST /register
pub const USER_COLUMNS: &[&str] = &["email", "mobile", "otp"];

/// Body of POST /register
///
/// Loosely typed like [`NewAccount`]: a numeric `otp` or `mobile` is stored
/// as its text form by PostgreSQL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub email: Option<Value>,
    pub mobile: Option<Value>,
    pub otp: Option<Value>,
}

impl NewUser {
    pub fn values(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Body of POST /createAccount
///
/// Values stay loosely typed: PostgreSQL coerces them into the column types
/// when the row is populated, so `"age": "31"` and `"age": 31` both work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAccount {
    pub fullname: Option<Value>,
    pub age: Option<Value>,
    pub mobile: Option<Value>,
    pub dob: Option<Value>,
    pub gender: Option<Value>,
    #[serde(rename = "abhaid", alias = "abhaID")]
    pub abhaid: Option<Value>,
    pub userrole: Option<Value>,
}

impl NewAccount {
    /// Restrict the payload to the columns this instance writes
    pub fn for_instance(&self, instance: Instance) -> AccountRecord {
        let mut values = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let columns = instance.account_columns();
        values.retain(|key, _| columns.contains(&key.as_str()));

        AccountRecord { columns, values }
    }
}

/// Column list plus JSON values ready for `jsonb_populate_record`
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub columns: &'static [&'static str],
    pub values: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub name: Option<String>,
    pub data: Vec<u8>,
    pub mimetype: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct StoredImage {
    pub id: i32,
    pub name: Option<String>,
    pub data: Vec<u8>,
    pub mimetype: Option<String>,
}

/// One household visit as submitted by a community worker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommunitySubmission {
    pub householdid: Option<String>,
    pub date_of_visit: Option<NaiveDate>,
    pub village: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub household_size: Option<i32>,
    pub symptoms: Option<String>,
    pub mode_of_medication: Option<String>,
    pub antibiotics: Option<String>,
    /// Falls back to the serial sequence when absent
    pub patient_id: Option<i32>,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub occupation: Option<String>,
    pub antibiotic_image: Option<Vec<u8>>,
    pub image_mimetype: Option<String>,
    pub obtained_from: Option<String>,
    pub date_of_antibiotic_used: Option<NaiveDate>,
    pub dosage: Option<String>,
    pub unit: Option<String>,
    pub duration: Option<i32>,
    pub full_course_taken: bool,
    pub doctor: Option<String>,
    pub antibiotic_misuse: Option<String>,
    pub antibiotic_resistance: Option<String>,
    pub want_info: bool,
}

/// Stored `community_data` row; the image goes out as base64
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CommunityRecord {
    pub id: i32,
    pub householdid: Option<String>,
    pub date_of_visit: Option<NaiveDate>,
    pub village: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub household_size: Option<i32>,
    pub symptoms: Option<String>,
    pub mode_of_medication: Option<String>,
    pub antibiotics: Option<String>,
    pub patient_id: Option<i32>,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub occupation: Option<String>,
    #[serde(serialize_with = "serialize_base64")]
    pub antibiotic_image: Option<Vec<u8>>,
    pub image_mimetype: Option<String>,
    pub obtained_from: Option<String>,
    pub date_of_antibiotic_used: Option<NaiveDate>,
    pub dosage: Option<String>,
    pub unit: Option<String>,
    pub duration: Option<i32>,
    pub full_course_taken: Option<bool>,
    pub doctor: Option<String>,
    pub antibiotic_misuse: Option<String>,
    pub antibiotic_resistance: Option<String>,
    pub want_info: Option<bool>,
}

impl CommunityRecord {
    pub fn from_submission(id: i32, patient_id: i32, s: &CommunitySubmission) -> Self {
        Self {
            id,
            householdid: s.householdid.clone(),
            date_of_visit: s.date_of_visit,
            village: s.village.clone(),
            state: s.state.clone(),
            district: s.district.clone(),
            household_size: s.household_size,
            symptoms: s.symptoms.clone(),
            mode_of_medication: s.mode_of_medication.clone(),
            antibiotics: s.antibiotics.clone(),
            patient_id: Some(patient_id),
            name: s.name.clone(),
            age: s.age,
            gender: s.gender.clone(),
            occupation: s.occupation.clone(),
            antibiotic_image: s.antibiotic_image.clone(),
            image_mimetype: s.image_mimetype.clone(),
            obtained_from: s.obtained_from.clone(),
            date_of_antibiotic_used: s.date_of_antibiotic_used,
            dosage: s.dosage.clone(),
            unit: s.unit.clone(),
            duration: s.duration,
            full_course_taken: Some(s.full_course_taken),
            doctor: s.doctor.clone(),
            antibiotic_misuse: s.antibiotic_misuse.clone(),
            antibiotic_resistance: s.antibiotic_resistance.clone(),
            want_info: Some(s.want_info),
        }
    }
}

fn serialize_base64<S: Serializer>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match bytes {
        Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
        None => serializer.serialize_none(),
    }
}
