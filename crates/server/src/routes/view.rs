//! Routes driving the view controller
//!
//! Search and compare answer 202 as soon as the request is dispatched; the
//! outcome arrives through `/api/events` and `/api/state`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use compass_core::College;
use orchestrator::{SearchForm, StoreSnapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StateResponse {
    pub state: StoreSnapshot,
    pub form: SearchForm,
}

impl StateResponse {
    fn current(state: &AppState) -> Self {
        Self {
            state: state.store().snapshot(),
            form: state.controller.form(),
        }
    }
}

/// Form fields to change; absent fields keep their value
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct FormUpdate {
    pub job: Option<String>,
    pub location: Option<String>,
}

impl FormUpdate {
    fn apply(self, state: &AppState) {
        if let Some(job) = self.job {
            state.controller.set_job(job);
        }
        if let Some(location) = self.location {
            state.controller.set_location(location);
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToggleSaveResponse {
    /// Whether the college is saved after the toggle
    pub saved: bool,
    pub state: StoreSnapshot,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VisibilityRequest {
    pub visible: bool,
}

#[utoipa::path(
    get,
    path = "/api/state",
    responses(
        (status = 200, description = "Current view state and search form", body = StateResponse)
    ),
    tag = "view"
)]
pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    Json(StateResponse::current(&state))
}

#[utoipa::path(
    put,
    path = "/api/form",
    request_body = FormUpdate,
    responses(
        (status = 200, description = "Updated search form", body = SearchForm)
    ),
    tag = "view"
)]
pub async fn update_form(
    State(state): State<AppState>,
    Json(payload): Json<FormUpdate>,
) -> Json<SearchForm> {
    payload.apply(&state);
    Json(state.controller.form())
}

#[utoipa::path(
    post,
    path = "/api/search",
    request_body(content = FormUpdate, description = "Optional form fields to change before searching"),
    responses(
        (status = 202, description = "Search dispatched", body = StateResponse),
        (status = 400, description = "Job or location is blank", body = crate::error::ErrorResponse)
    ),
    tag = "view"
)]
pub async fn search(
    State(state): State<AppState>,
    payload: Option<Json<FormUpdate>>,
) -> Result<(StatusCode, Json<StateResponse>), AppError> {
    if let Some(Json(update)) = payload {
        update.apply(&state);
    }

    let Some(pending) = state.controller.dispatch_search() else {
        return Err(AppError::BadRequest(
            "Both job and location are required".to_string(),
        ));
    };

    let ticket = pending.ticket();
    tokio::spawn(async move {
        // Outcome is published to the store; failures are logged by run
        if pending.run().await.is_ok() {
            debug!(ticket, "Background search finished");
        }
    });

    Ok((StatusCode::ACCEPTED, Json(StateResponse::current(&state))))
}

#[utoipa::path(
    post,
    path = "/api/saved/toggle",
    request_body = College,
    responses(
        (status = 200, description = "College saved or unsaved", body = ToggleSaveResponse),
        (status = 422, description = "College holds invalid values", body = crate::error::ErrorResponse)
    ),
    tag = "view"
)]
pub async fn toggle_saved(
    State(state): State<AppState>,
    Json(college): Json<College>,
) -> Result<Json<ToggleSaveResponse>, AppError> {
    college.validate()?;

    let saved = state.controller.on_toggle_save(college);

    Ok(Json(ToggleSaveResponse {
        saved,
        state: state.store().snapshot(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/compare",
    responses(
        (status = 202, description = "Comparison dispatched, or panel shown if fewer than two colleges are saved", body = StateResponse)
    ),
    tag = "view"
)]
pub async fn compare(State(state): State<AppState>) -> (StatusCode, Json<StateResponse>) {
    if let Some(pending) = state.controller.dispatch_compare() {
        let ticket = pending.ticket();
        tokio::spawn(async move {
            if pending.run().await.is_ok() {
                debug!(ticket, "Background comparison finished");
            }
        });
    }

    (StatusCode::ACCEPTED, Json(StateResponse::current(&state)))
}

#[utoipa::path(
    put,
    path = "/api/comparison/visibility",
    request_body = VisibilityRequest,
    responses(
        (status = 200, description = "Comparison panel shown or hidden", body = StateResponse)
    ),
    tag = "view"
)]
pub async fn set_comparison_visibility(
    State(state): State<AppState>,
    Json(payload): Json<VisibilityRequest>,
) -> Json<StateResponse> {
    state.controller.set_show_comparison(payload.visible);
    Json(StateResponse::current(&state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_update_accepts_partial_body() {
        let update: FormUpdate = serde_json::from_str(r#"{"job":"nurse"}"#).unwrap();
        assert_eq!(update.job.as_deref(), Some("nurse"));
        assert!(update.location.is_none());

        let empty: FormUpdate = serde_json::from_str("{}").unwrap();
        assert!(empty.job.is_none() && empty.location.is_none());
    }
}
