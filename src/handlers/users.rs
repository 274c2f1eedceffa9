// handlers/users.rs - POST /register and POST /createAccount

use axum::extract::State;

use crate::app::AppState;
use crate::database::models::{NewAccount, NewUser};
use crate::error::ApiError;
use crate::middleware::{ApiMessage, ApiResult, LooseJson};

/// POST /register - store email, mobile and otp in `users`
///
/// ```json
/// { "email": "string", "mobile": "string", "otp": "string" }
/// ```
///
/// Numbers are accepted for `mobile` and `otp` and stored as text.
pub async fn register(State(state): State<AppState>, LooseJson(user): LooseJson<NewUser>) -> ApiResult {
    let row = state
        .store
        .insert_user(&user)
        .await
        .map_err(|e| ApiError::database("Database error", e))?;

    tracing::info!("registered user");
    Ok(ApiMessage::ok("User registered").with("user", row))
}

/// POST /createAccount - store profile details in `userdetails`
///
/// The accepted keys are `fullname, age, mobile, dob, gender, abhaID, userrole`;
/// the basic instance writes only the first five.
pub async fn create_account(State(state): State<AppState>, LooseJson(account): LooseJson<NewAccount>) -> ApiResult {
    let record = account.for_instance(state.instance);
    let row = state
        .store
        .insert_account(&record)
        .await
        .map_err(|e| ApiError::database("Database error", e))?;

    tracing::info!(instance = state.instance.as_str(), "created account");
    Ok(ApiMessage::ok("User registered").with("user", row))
}
