//! HTTP boundary for lifecycle commands, list queries and metrics reads
//!
//! Identity always arrives as an explicit company identifier in the path or
//! query, never from ambient session state.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::metrics::{self, OrgAverages, RateSummary};
use crate::models::{
    Collaboration, CreateEvaluation, CreateRequest, DeclineRequest, DeclinedEntry, EditRequest,
    Evaluation, Request, RequestStatus, UpdateEvaluation, UpdateProgress,
};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/api/requests", post(create_request))
        .route(
            "/api/requests/:id",
            put(edit_request).delete(remove_request),
        )
        .route("/api/requests/:id/accept", put(accept_request))
        .route("/api/requests/:id/decline", put(decline_request))
        .route("/api/requests/:id/complete", put(complete_request))
        .route("/api/requests/pending/:company_id", get(pending_requests))
        .route(
            "/api/requests/completed/:company_id",
            get(completed_requests),
        )
        .route("/api/requests/ongoing", get(ongoing_requests))
        .route("/api/requests/assigned/:company_id", get(assigned_pending))
        .route("/api/requests/ongoing/:company_id", get(assigned_ongoing))
        .route("/api/requests/declined/:company_id", get(assigned_declined))
        .route("/api/collaborations", get(list_collaborations))
        .route("/api/collaborations/:id/progress", put(update_progress))
        .route("/api/declined", get(list_declined_entries))
        .route("/api/declined/:id", delete(delete_declined_entry))
        .route("/api/evaluations", post(create_evaluation))
        .route(
            "/api/evaluations/:selector",
            get(evaluations_for_month)
                .put(update_evaluation)
                .delete(delete_evaluation),
        )
        .route("/api/stats", get(organization_stats))
        .route("/api/stats/:company_id", get(employee_stats))
}

async fn health() -> &'static str {
    "ok"
}

// Lifecycle commands

async fn create_request(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Request>)> {
    let request = state.lifecycle.create(payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn edit_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<EditRequest>,
) -> Result<Json<Request>> {
    Ok(Json(state.lifecycle.edit(id, patch).await?))
}

async fn accept_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Request>> {
    Ok(Json(state.lifecycle.accept(id).await?))
}

async fn decline_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeclineRequest>,
) -> Result<Json<Request>> {
    Ok(Json(state.lifecycle.decline(id, payload).await?))
}

async fn complete_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Request>> {
    Ok(Json(state.lifecycle.complete(id).await?))
}

async fn remove_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    state.lifecycle.remove(id).await?;
    Ok(Json(serde_json::json!({ "message": "Request deleted" })))
}

// List queries

async fn pending_requests(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<Request>>> {
    Ok(Json(state.lifecycle.pending_authored_by(&company_id).await?))
}

async fn completed_requests(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<Request>>> {
    Ok(Json(
        state.lifecycle.completed_authored_by(&company_id).await?,
    ))
}

async fn ongoing_requests(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Request>>> {
    Ok(Json(state.lifecycle.ongoing().await?))
}

async fn assigned_pending(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<Request>>> {
    Ok(Json(
        state
            .lifecycle
            .assigned_with_status(&company_id, RequestStatus::Pending)
            .await?,
    ))
}

async fn assigned_ongoing(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<Request>>> {
    Ok(Json(
        state
            .lifecycle
            .assigned_with_status(&company_id, RequestStatus::Ongoing)
            .await?,
    ))
}

async fn assigned_declined(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<Request>>> {
    Ok(Json(
        state
            .lifecycle
            .assigned_with_status(&company_id, RequestStatus::Declined)
            .await?,
    ))
}

// Collaborations (read + progress only; creation and deletion belong to the
// lifecycle engine)

async fn list_collaborations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Collaboration>>> {
    Ok(Json(state.store.list_collaborations().await?))
}

async fn update_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProgress>,
) -> Result<StatusCode> {
    if !(0..=100).contains(&payload.progress) {
        return Err(AppError::Validation(format!(
            "Progress must be between 0 and 100, got {}",
            payload.progress
        )));
    }
    state
        .store
        .update_collaboration_progress(id, payload.progress)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// Declined entries

async fn list_declined_entries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DeclinedEntry>>> {
    Ok(Json(state.store.list_declined_entries().await?))
}

async fn delete_declined_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.store.delete_declined_entry(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Evaluations

async fn create_evaluation(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateEvaluation>,
) -> Result<(StatusCode, Json<Evaluation>)> {
    if metrics::month_window(&payload.month).is_none() {
        return Err(AppError::Validation(format!(
            "Invalid month label: {}",
            payload.month
        )));
    }
    let evaluation = state.store.create_evaluation(&payload).await?;
    Ok((StatusCode::CREATED, Json(evaluation)))
}

/// GET lists a month ("August 2026"); PUT/DELETE address one evaluation by id.
async fn evaluations_for_month(
    State(state): State<Arc<AppState>>,
    Path(month): Path<String>,
) -> Result<Json<Vec<Evaluation>>> {
    Ok(Json(state.store.list_evaluations_for_month(&month).await?))
}

async fn update_evaluation(
    State(state): State<Arc<AppState>>,
    Path(selector): Path<String>,
    Json(patch): Json<UpdateEvaluation>,
) -> Result<Json<Evaluation>> {
    let id = parse_id(&selector)?;
    Ok(Json(state.store.update_evaluation(id, &patch).await?))
}

async fn delete_evaluation(
    State(state): State<Arc<AppState>>,
    Path(selector): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&selector)?;
    state.store.delete_evaluation(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Metrics

#[derive(Debug, Deserialize)]
struct StatsQuery {
    /// Calendar-month label, e.g. "August 2026"
    month: String,
    /// Comma-separated company identifiers (organization stats only)
    employees: Option<String>,
}

async fn employee_stats(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<RateSummary>> {
    let (start, end) = parse_month(&query.month)?;
    Ok(Json(state.lifecycle.rates_for(&company_id, start, end).await?))
}

async fn organization_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<OrgAverages>> {
    let (start, end) = parse_month(&query.month)?;

    let mut summaries = Vec::new();
    for employee in query
        .employees
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        summaries.push(state.lifecycle.rates_for(employee, start, end).await?);
    }

    Ok(Json(metrics::organization_average(&summaries)))
}

fn parse_month(label: &str) -> Result<(chrono::NaiveDate, chrono::NaiveDate)> {
    metrics::month_window(label)
        .ok_or_else(|| AppError::Validation(format!("Invalid month label: {}", label)))
}

fn parse_id(selector: &str) -> Result<Uuid> {
    Uuid::parse_str(selector)
        .map_err(|_| AppError::Validation(format!("Invalid evaluation id: {}", selector)))
}
