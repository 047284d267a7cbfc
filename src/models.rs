//! Data models for requests, collaborations, declined entries and evaluations

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a work request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Proposed but not yet answered by the assignee
    Pending,
    /// Accepted and actively being worked on
    Ongoing,
    /// Finished work, terminal
    Completed,
    /// Turned down by the assignee, terminal
    Declined,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Ongoing => "ongoing",
            RequestStatus::Completed => "completed",
            RequestStatus::Declined => "declined",
        }
    }

    /// Check if this is a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Declined)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "ongoing" => Ok(RequestStatus::Ongoing),
            "completed" => Ok(RequestStatus::Completed),
            "declined" => Ok(RequestStatus::Declined),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

/// Priority level for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Priority::Low),
            "Medium" => Ok(Priority::Medium),
            "High" => Ok(Priority::High),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// A work request exchanged between two employees.
///
/// The request row is the source of truth for lifecycle state; Collaboration
/// and DeclinedEntry are projections spawned by its transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: Uuid,
    pub task_name: String,
    pub description: String,
    pub priority: Priority,
    pub deadline: NaiveDate,
    /// Company identifier of the employee the work is assigned to
    pub assignee: String,
    /// Company identifier of the requester
    pub assigned_by: String,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declined_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_on: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Active-state projection of an accepted request, kept for dashboards that
/// must not re-derive status from the request table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaboration {
    pub id: Uuid,
    /// Originating request, used as the correlation key for cleanup
    pub request_id: Uuid,
    pub task_name: String,
    pub assigned_by: String,
    pub assignee: String,
    pub deadline: NaiveDate,
    /// Copied from the originating request's created_at
    pub created_at: DateTime<Utc>,
    /// Completion percentage, 0-100
    pub progress: i64,
}

/// Archival record of a decline decision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclinedEntry {
    pub id: Uuid,
    pub request_id: Uuid,
    pub title: String,
    pub description: String,
    pub assignee: String,
    pub assigned_by: String,
    pub declined_on: DateTime<Utc>,
    pub declined_reason: String,
    /// Date the assignee proposed instead; never in the past at creation time
    pub alternative_date: NaiveDate,
}

/// Monthly performance record for one employee
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: Uuid,
    pub employee: String,
    /// Calendar-month label, e.g. "August 2026"
    pub month: String,
    pub grade: String,
    pub notes: String,
    pub further_action: String,
}

// API payloads

/// Request to create a new work request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub task_name: String,
    pub description: String,
    pub priority: String,
    pub deadline: NaiveDate,
    pub assignee: String,
    pub assigned_by: String,
}

/// Partial update of a pending request's descriptive fields
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub task_name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub assignee: Option<String>,
}

/// Payload accompanying a decline transition
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclineRequest {
    pub declined_reason: String,
    pub alternative_date: NaiveDate,
}

/// Progress update for an active collaboration
#[derive(Debug, Deserialize)]
pub struct UpdateProgress {
    pub progress: i64,
}

/// Request to create an evaluation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvaluation {
    pub employee: String,
    pub month: String,
    pub grade: String,
    pub notes: String,
    pub further_action: String,
}

/// Partial update of an evaluation
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvaluation {
    pub grade: Option<String>,
    pub notes: Option<String>,
    pub further_action: Option<String>,
}
