//! Consistency coordinator for lifecycle side effects
//!
//! Collaboration and DeclinedEntry rows are stored as independent records
//! with no cascade support from the store, so every transition that implies a
//! paired write or delete goes through here. The status update and the side
//! write are sequential operations, not one transaction: if the second write
//! fails the request keeps its new status and the failure surfaces as
//! [`AppError::SideEffect`] so the orphaned pair is operator-visible.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{AppError, Result};
use crate::models::{Collaboration, DeclinedEntry, Request};
use crate::store::Store;

#[derive(Clone)]
pub struct Coordinator {
    store: Store,
}

impl Coordinator {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Persist the active-state projection for a freshly accepted request.
    pub async fn attach_collaboration(&self, request: &Request) -> Result<Collaboration> {
        self.store
            .create_collaboration(request)
            .await
            .map_err(|e| {
                AppError::SideEffect(format!(
                    "request {} is ongoing but its collaboration was not created: {}",
                    request.id, e
                ))
            })
    }

    /// Persist the archival record for a freshly declined request.
    pub async fn record_decline(
        &self,
        request: &Request,
        declined_reason: &str,
        alternative_date: NaiveDate,
        declined_on: DateTime<Utc>,
    ) -> Result<DeclinedEntry> {
        self.store
            .create_declined_entry(request, declined_reason, alternative_date, declined_on)
            .await
            .map_err(|e| {
                AppError::SideEffect(format!(
                    "request {} is declined but its declined entry was not created: {}",
                    request.id, e
                ))
            })
    }

    /// Remove the projection correlated to a completed request.
    ///
    /// Keyed by originating request id. A missing projection is not an error:
    /// the request's terminal state stands on its own, so the cleanup is
    /// idempotent.
    pub async fn retire_collaboration(&self, request: &Request) -> Result<()> {
        let removed = self
            .store
            .delete_collaborations_for_request(request.id)
            .await
            .map_err(|e| {
                AppError::SideEffect(format!(
                    "request {} is completed but its collaboration was not removed: {}",
                    request.id, e
                ))
            })?;

        if removed == 0 {
            tracing::debug!(request_id = %request.id, "no collaboration to retire");
        }

        Ok(())
    }
}
