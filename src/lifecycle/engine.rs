//! Request lifecycle engine
//!
//! Owns the state machine: `pending` → `ongoing` → `completed`, with
//! `pending` → `declined` as the other terminal branch. No transition leaves
//! a terminal status. Side effects on Collaboration and DeclinedEntry go
//! through the [`Coordinator`].

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::metrics::{self, RateSummary};
use crate::models::{CreateRequest, DeclineRequest, EditRequest, Priority, Request, RequestStatus};
use crate::store::Store;

use super::coordinator::Coordinator;

#[derive(Clone)]
pub struct LifecycleEngine {
    store: Store,
    coordinator: Coordinator,
}

impl LifecycleEngine {
    pub fn new(store: Store) -> Self {
        let coordinator = Coordinator::new(store.clone());
        Self { store, coordinator }
    }

    /// Create a new request in `pending` status.
    pub async fn create(&self, payload: CreateRequest) -> Result<Request> {
        let priority = validate_create(&payload)?;

        let request = self
            .store
            .create_request(
                &payload.task_name,
                &payload.description,
                priority,
                payload.deadline,
                &payload.assignee,
                &payload.assigned_by,
            )
            .await?;

        tracing::info!(request_id = %request.id, assignee = %request.assignee, "request created");
        Ok(request)
    }

    /// Update descriptive fields of a request. Only valid while `pending`;
    /// status and side tables are never touched.
    pub async fn edit(&self, id: Uuid, patch: EditRequest) -> Result<Request> {
        let mut request = self.store.get_request(id).await?;

        if request.status != RequestStatus::Pending {
            return Err(AppError::Validation(format!(
                "Only pending requests can be edited, request {} is '{}'",
                id, request.status
            )));
        }

        if let Some(task_name) = patch.task_name {
            request.task_name = task_name;
        }
        if let Some(description) = patch.description {
            request.description = description;
        }
        if let Some(priority) = patch.priority {
            request.priority = priority
                .parse::<Priority>()
                .map_err(AppError::Validation)?;
        }
        if let Some(deadline) = patch.deadline {
            request.deadline = deadline;
        }
        if let Some(assignee) = patch.assignee {
            request.assignee = assignee;
        }
        request.updated_at = Utc::now();

        self.store.update_request(&request).await?;
        Ok(request)
    }

    /// Accept a pending request: status becomes `ongoing` and the active
    /// collaboration projection is spawned.
    pub async fn accept(&self, id: Uuid) -> Result<Request> {
        let mut request = self.store.get_request(id).await?;

        if request.status != RequestStatus::Pending {
            return Err(AppError::InvalidTransition {
                action: "accept",
                from: request.status,
            });
        }

        let now = Utc::now();
        self.store.mark_accepted(id, now).await?;
        request.status = RequestStatus::Ongoing;
        request.accepted_on = Some(now);
        request.updated_at = now;

        // Second, non-transactional write; failure here leaves the request
        // ongoing without its projection and surfaces as SideEffect.
        self.coordinator.attach_collaboration(&request).await?;

        tracing::info!(request_id = %id, "request accepted");
        Ok(request)
    }

    /// Decline a pending request, archiving the reason and the proposed
    /// alternative date.
    pub async fn decline(&self, id: Uuid, payload: DeclineRequest) -> Result<Request> {
        if payload.declined_reason.trim().is_empty() {
            return Err(AppError::Validation(
                "A decline reason is required".to_string(),
            ));
        }
        // Day granularity: declining with today's date as the alternative is fine.
        let today = Utc::now().date_naive();
        if payload.alternative_date < today {
            return Err(AppError::Validation(format!(
                "Alternative date {} is in the past",
                payload.alternative_date
            )));
        }

        let mut request = self.store.get_request(id).await?;

        if request.status != RequestStatus::Pending {
            return Err(AppError::InvalidTransition {
                action: "decline",
                from: request.status,
            });
        }

        let now = Utc::now();
        self.store.mark_declined(id, now).await?;
        request.status = RequestStatus::Declined;
        request.declined_on = Some(now);
        request.updated_at = now;

        self.coordinator
            .record_decline(&request, &payload.declined_reason, payload.alternative_date, now)
            .await?;

        tracing::info!(request_id = %id, "request declined");
        Ok(request)
    }

    /// Complete an ongoing request and retire its collaboration projection.
    pub async fn complete(&self, id: Uuid) -> Result<Request> {
        let mut request = self.store.get_request(id).await?;

        if request.status != RequestStatus::Ongoing {
            return Err(AppError::InvalidTransition {
                action: "complete",
                from: request.status,
            });
        }

        let now = Utc::now();
        self.store.mark_completed(id, now).await?;
        request.status = RequestStatus::Completed;
        request.completed_on = Some(now);
        request.updated_at = now;

        self.coordinator.retire_collaboration(&request).await?;

        tracing::info!(request_id = %id, "request completed");
        Ok(request)
    }

    /// Hard-delete a request in any status. Does not cascade: Collaboration
    /// and DeclinedEntry records are independently owned once created.
    pub async fn remove(&self, id: Uuid) -> Result<()> {
        self.store.delete_request(id).await?;
        tracing::info!(request_id = %id, "request removed");
        Ok(())
    }

    // Read-side queries. Ordering is a presentation concern, not guaranteed.

    pub async fn pending_authored_by(&self, company_id: &str) -> Result<Vec<Request>> {
        self.store.list_pending_by_author(company_id).await
    }

    pub async fn completed_authored_by(&self, company_id: &str) -> Result<Vec<Request>> {
        self.store.list_completed_by_author(company_id).await
    }

    pub async fn ongoing(&self) -> Result<Vec<Request>> {
        self.store.list_ongoing().await
    }

    pub async fn assigned_with_status(
        &self,
        company_id: &str,
        status: RequestStatus,
    ) -> Result<Vec<Request>> {
        self.store.list_assigned(company_id, status).await
    }

    /// Derived rates for one employee over [start, end) days, computed over
    /// a point-in-time snapshot of that employee's requests.
    pub async fn rates_for(
        &self,
        company_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RateSummary> {
        let start = start.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = end.and_time(chrono::NaiveTime::MIN).and_utc();
        let requests = self
            .store
            .list_for_assignee_between(company_id, start, end)
            .await?;

        Ok(metrics::summarize(&requests))
    }
}

fn validate_create(payload: &CreateRequest) -> Result<Priority> {
    if payload.task_name.trim().is_empty()
        || payload.description.trim().is_empty()
        || payload.assignee.trim().is_empty()
        || payload.assigned_by.trim().is_empty()
    {
        return Err(AppError::Validation(
            "All fields are required".to_string(),
        ));
    }

    payload
        .priority
        .parse::<Priority>()
        .map_err(AppError::Validation)
}
