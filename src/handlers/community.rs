// handlers/community.rs - community worker household submissions
//
// POST /community/:id/upload   multipart (or JSON) survey + optional antibiotic photo
// GET  /getCommunityDetails    ?householdid=... or ?personid=...

use axum::extract::{Path, Query, Request, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::CommunitySubmission;
use crate::error::ApiError;
use crate::handlers::form::{FormData, FormError};
use crate::middleware::{ApiMessage, ApiResult};
use crate::types::{CommunityLookup, WorkerRef};

const IMAGE_FIELD: &str = "antibiotic_image";

/// POST /community/:id/upload
///
/// `:id` is either a numeric person id or an ABHA id; the matching
/// `userdetails` row must have the community worker role. The worker is
/// checked before the body is read.
pub async fn upload(State(state): State<AppState>, Path(id): Path<String>, request: Request) -> ApiResult {
    let worker = WorkerRef::parse(&id);

    let is_worker = state
        .store
        .is_community_worker(&worker)
        .await
        .map_err(|e| ApiError::database("Upload failed", e))?;
    if !is_worker {
        tracing::info!(?worker, "rejected upload from non community worker");
        return Err(ApiError::bad_request("Not a valid community worker"));
    }

    state
        .store
        .ensure_community_table()
        .await
        .map_err(|e| ApiError::database("Upload failed", e))?;

    let form = FormData::from_request(request, IMAGE_FIELD)
        .await
        .map_err(|e| ApiError::form("Upload failed", e))?;
    let submission = submission_from_form(form).map_err(|e| ApiError::form("Upload failed", e))?;

    state
        .store
        .insert_community(&submission)
        .await
        .map_err(|e| ApiError::database("Upload failed", e))?;

    tracing::info!(?worker, householdid = ?submission.householdid, "stored community submission");
    Ok(ApiMessage::ok("Data uploaded successfully"))
}

fn submission_from_form(form: FormData) -> Result<CommunitySubmission, FormError> {
    let (antibiotic_image, image_mimetype) = match &form.file {
        Some(file) => (Some(file.bytes.clone()), file.content_type.clone()),
        None => (None, None),
    };

    Ok(CommunitySubmission {
        householdid: form.text("householdid"),
        date_of_visit: form.date("date_of_visit")?,
        village: form.text("village"),
        state: form.text("state"),
        district: form.text("district"),
        household_size: form.int("household_size")?,
        symptoms: form.text("symptoms"),
        mode_of_medication: form.text("mode_of_medication"),
        antibiotics: form.text("antibiotics"),
        patient_id: form.int("patient_id")?,
        name: form.text("name"),
        age: form.int("age")?,
        gender: form.text("gender"),
        occupation: form.text("occupation"),
        antibiotic_image,
        image_mimetype,
        obtained_from: form.text("obtained_from"),
        date_of_antibiotic_used: form.date("date_of_antibiotic_used")?,
        dosage: form.text("dosage"),
        unit: form.text("unit"),
        duration: form.int("duration")?,
        full_course_taken: form.flag("full_course_taken"),
        doctor: form.text("doctor"),
        antibiotic_misuse: form.text("antibiotic_misuse"),
        antibiotic_resistance: form.text("antibiotic_resistance"),
        want_info: form.flag("want_info"),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailsQuery {
    pub householdid: Option<String>,
    pub personid: Option<String>,
}

impl DetailsQuery {
    /// householdid wins when both are present; blank values count as missing
    pub fn lookup(&self) -> Result<CommunityLookup, ApiError> {
        let present = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

        if let Some(householdid) = present(&self.householdid) {
            return Ok(CommunityLookup::Household(householdid));
        }
        match present(&self.personid) {
            Some(personid) => personid
                .parse()
                .map(CommunityLookup::Patient)
                .map_err(|_| ApiError::bad_request("personid must be an integer")),
            None => Err(ApiError::bad_request("householdid or personid is required")),
        }
    }
}

/// GET /getCommunityDetails - stored rows with the image as base64
pub async fn details(State(state): State<AppState>, Query(query): Query<DetailsQuery>) -> ApiResult {
    let lookup = query.lookup()?;

    let rows = state
        .store
        .find_community(&lookup)
        .await
        .map_err(|e| ApiError::database("Database error", e))?;

    if rows.is_empty() {
        return Err(ApiError::not_found("No community details found"));
    }

    Ok(ApiMessage::ok("Community details fetched").with("data", rows))
}
