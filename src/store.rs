//! Database store for requests, collaborations, declined entries and evaluations
//!
//! Pure persistence: every method is a single create/read/update/delete or
//! filtered query. Lifecycle rules live in [`crate::lifecycle`].

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    Collaboration, CreateEvaluation, DeclinedEntry, Evaluation, Priority, Request, RequestStatus,
    UpdateEvaluation,
};

/// Database store
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

const REQUEST_COLUMNS: &str = "id, task_name, description, priority, deadline, assignee, \
     assigned_by, status, accepted_on, declined_on, completed_on, created_at, updated_at";

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Request operations

    pub async fn create_request(
        &self,
        task_name: &str,
        description: &str,
        priority: Priority,
        deadline: NaiveDate,
        assignee: &str,
        assigned_by: &str,
    ) -> Result<Request> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO requests (id, task_name, description, priority, deadline, assignee,
                                  assigned_by, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(task_name)
        .bind(description)
        .bind(priority.as_str())
        .bind(deadline)
        .bind(assignee)
        .bind(assigned_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Request {
            id,
            task_name: task_name.to_string(),
            description: description.to_string(),
            priority,
            deadline,
            assignee: assignee.to_string(),
            assigned_by: assigned_by.to_string(),
            status: RequestStatus::Pending,
            accepted_on: None,
            declined_on: None,
            completed_on: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_request(&self, id: Uuid) -> Result<Request> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests WHERE id = ?",
            REQUEST_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))?;

        row.try_into()
    }

    /// Write back descriptive fields of a pending request
    pub async fn update_request(&self, request: &Request) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE requests
            SET task_name = ?, description = ?, priority = ?, deadline = ?, assignee = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&request.task_name)
        .bind(&request.description)
        .bind(request.priority.as_str())
        .bind(request.deadline)
        .bind(&request.assignee)
        .bind(request.updated_at)
        .bind(request.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn mark_accepted(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE requests SET status = 'ongoing', accepted_on = ?, updated_at = ? WHERE id = ?",
        )
        .bind(at)
        .bind(at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn mark_declined(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE requests SET status = 'declined', declined_on = ?, updated_at = ? WHERE id = ?",
        )
        .bind(at)
        .bind(at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn mark_completed(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE requests SET status = 'completed', completed_on = ?, updated_at = ? WHERE id = ?",
        )
        .bind(at)
        .bind(at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_request(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM requests WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Request {} not found", id)));
        }

        Ok(())
    }

    pub async fn list_pending_by_author(&self, assigned_by: &str) -> Result<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests WHERE status = 'pending' AND assigned_by = ?",
            REQUEST_COLUMNS
        ))
        .bind(assigned_by)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn list_completed_by_author(&self, assigned_by: &str) -> Result<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests WHERE status = 'completed' AND assigned_by = ?",
            REQUEST_COLUMNS
        ))
        .bind(assigned_by)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn list_ongoing(&self) -> Result<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests WHERE status = 'ongoing'",
            REQUEST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn list_assigned(
        &self,
        assignee: &str,
        status: RequestStatus,
    ) -> Result<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests WHERE assignee = ? AND status = ?",
            REQUEST_COLUMNS
        ))
        .bind(assignee)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Requests assigned to an employee with created_at in [start, end)
    pub async fn list_for_assignee_between(
        &self,
        assignee: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM requests WHERE assignee = ? AND created_at >= ? AND created_at < ?",
            REQUEST_COLUMNS
        ))
        .bind(assignee)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    // Collaboration operations

    pub async fn create_collaboration(&self, request: &Request) -> Result<Collaboration> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO collaborations (id, request_id, task_name, assigned_by, assignee,
                                        deadline, created_at, progress)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(id.to_string())
        .bind(request.id.to_string())
        .bind(&request.task_name)
        .bind(&request.assigned_by)
        .bind(&request.assignee)
        .bind(request.deadline)
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;

        Ok(Collaboration {
            id,
            request_id: request.id,
            task_name: request.task_name.clone(),
            assigned_by: request.assigned_by.clone(),
            assignee: request.assignee.clone(),
            deadline: request.deadline,
            created_at: request.created_at,
            progress: 0,
        })
    }

    pub async fn list_collaborations(&self) -> Result<Vec<Collaboration>> {
        let rows = sqlx::query_as::<_, CollaborationRow>(
            r#"
            SELECT id, request_id, task_name, assigned_by, assignee, deadline, created_at, progress
            FROM collaborations
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn update_collaboration_progress(&self, id: Uuid, progress: i64) -> Result<()> {
        let result = sqlx::query("UPDATE collaborations SET progress = ? WHERE id = ?")
            .bind(progress)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Collaboration {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Delete the projection(s) correlated to a request, returning how many
    /// rows were removed. Zero rows is not an error.
    pub async fn delete_collaborations_for_request(&self, request_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM collaborations WHERE request_id = ?")
            .bind(request_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // Declined entry operations

    pub async fn create_declined_entry(
        &self,
        request: &Request,
        declined_reason: &str,
        alternative_date: NaiveDate,
        declined_on: DateTime<Utc>,
    ) -> Result<DeclinedEntry> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO declined_entries (id, request_id, title, description, assignee,
                                          assigned_by, declined_on, declined_reason, alternative_date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(request.id.to_string())
        .bind(&request.task_name)
        .bind(&request.description)
        .bind(&request.assignee)
        .bind(&request.assigned_by)
        .bind(declined_on)
        .bind(declined_reason)
        .bind(alternative_date)
        .execute(&self.pool)
        .await?;

        Ok(DeclinedEntry {
            id,
            request_id: request.id,
            title: request.task_name.clone(),
            description: request.description.clone(),
            assignee: request.assignee.clone(),
            assigned_by: request.assigned_by.clone(),
            declined_on,
            declined_reason: declined_reason.to_string(),
            alternative_date,
        })
    }

    pub async fn list_declined_entries(&self) -> Result<Vec<DeclinedEntry>> {
        let rows = sqlx::query_as::<_, DeclinedEntryRow>(
            r#"
            SELECT id, request_id, title, description, assignee, assigned_by,
                   declined_on, declined_reason, alternative_date
            FROM declined_entries
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn delete_declined_entry(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM declined_entries WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Declined entry {} not found",
                id
            )));
        }

        Ok(())
    }

    // Evaluation operations

    pub async fn create_evaluation(&self, payload: &CreateEvaluation) -> Result<Evaluation> {
        let id = Uuid::new_v4();

        let result = sqlx::query(
            r#"
            INSERT INTO evaluations (id, employee, month, grade, notes, further_action)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&payload.employee)
        .bind(&payload.month)
        .bind(&payload.grade)
        .bind(&payload.notes)
        .bind(&payload.further_action)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(Evaluation {
                id,
                employee: payload.employee.clone(),
                month: payload.month.clone(),
                grade: payload.grade.clone(),
                notes: payload.notes.clone(),
                further_action: payload.further_action.clone(),
            }),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::Validation(format!(
                    "An evaluation for {} in {} already exists",
                    payload.employee, payload.month
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_evaluation(&self, id: Uuid) -> Result<Evaluation> {
        let row = sqlx::query_as::<_, EvaluationRow>(
            "SELECT id, employee, month, grade, notes, further_action FROM evaluations WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Evaluation {} not found", id)))?;

        row.try_into()
    }

    pub async fn list_evaluations_for_month(&self, month: &str) -> Result<Vec<Evaluation>> {
        let rows = sqlx::query_as::<_, EvaluationRow>(
            "SELECT id, employee, month, grade, notes, further_action FROM evaluations WHERE month = ?",
        )
        .bind(month)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn update_evaluation(&self, id: Uuid, patch: &UpdateEvaluation) -> Result<Evaluation> {
        let mut evaluation = self.get_evaluation(id).await?;

        if let Some(grade) = &patch.grade {
            evaluation.grade = grade.clone();
        }
        if let Some(notes) = &patch.notes {
            evaluation.notes = notes.clone();
        }
        if let Some(further_action) = &patch.further_action {
            evaluation.further_action = further_action.clone();
        }

        sqlx::query("UPDATE evaluations SET grade = ?, notes = ?, further_action = ? WHERE id = ?")
            .bind(&evaluation.grade)
            .bind(&evaluation.notes)
            .bind(&evaluation.further_action)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(evaluation)
    }

    pub async fn delete_evaluation(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM evaluations WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Evaluation {} not found", id)));
        }

        Ok(())
    }
}

// Internal row types for sqlx

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: String,
    task_name: String,
    description: String,
    priority: String,
    deadline: NaiveDate,
    assignee: String,
    assigned_by: String,
    status: String,
    accepted_on: Option<DateTime<Utc>>,
    declined_on: Option<DateTime<Utc>>,
    completed_on: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for Request {
    type Error = AppError;

    fn try_from(row: RequestRow) -> Result<Self> {
        Ok(Request {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| AppError::Validation(format!("Invalid UUID: {}", e)))?,
            task_name: row.task_name,
            description: row.description,
            priority: row
                .priority
                .parse()
                .map_err(|e: String| AppError::Validation(e))?,
            deadline: row.deadline,
            assignee: row.assignee,
            assigned_by: row.assigned_by,
            status: row
                .status
                .parse()
                .map_err(|e: String| AppError::Validation(e))?,
            accepted_on: row.accepted_on,
            declined_on: row.declined_on,
            completed_on: row.completed_on,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CollaborationRow {
    id: String,
    request_id: String,
    task_name: String,
    assigned_by: String,
    assignee: String,
    deadline: NaiveDate,
    created_at: DateTime<Utc>,
    progress: i64,
}

impl TryFrom<CollaborationRow> for Collaboration {
    type Error = AppError;

    fn try_from(row: CollaborationRow) -> Result<Self> {
        Ok(Collaboration {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| AppError::Validation(format!("Invalid UUID: {}", e)))?,
            request_id: Uuid::parse_str(&row.request_id)
                .map_err(|e| AppError::Validation(format!("Invalid UUID: {}", e)))?,
            task_name: row.task_name,
            assigned_by: row.assigned_by,
            assignee: row.assignee,
            deadline: row.deadline,
            created_at: row.created_at,
            progress: row.progress,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DeclinedEntryRow {
    id: String,
    request_id: String,
    title: String,
    description: String,
    assignee: String,
    assigned_by: String,
    declined_on: DateTime<Utc>,
    declined_reason: String,
    alternative_date: NaiveDate,
}

impl TryFrom<DeclinedEntryRow> for DeclinedEntry {
    type Error = AppError;

    fn try_from(row: DeclinedEntryRow) -> Result<Self> {
        Ok(DeclinedEntry {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| AppError::Validation(format!("Invalid UUID: {}", e)))?,
            request_id: Uuid::parse_str(&row.request_id)
                .map_err(|e| AppError::Validation(format!("Invalid UUID: {}", e)))?,
            title: row.title,
            description: row.description,
            assignee: row.assignee,
            assigned_by: row.assigned_by,
            declined_on: row.declined_on,
            declined_reason: row.declined_reason,
            alternative_date: row.alternative_date,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EvaluationRow {
    id: String,
    employee: String,
    month: String,
    grade: String,
    notes: String,
    further_action: String,
}

impl TryFrom<EvaluationRow> for Evaluation {
    type Error = AppError;

    fn try_from(row: EvaluationRow) -> Result<Self> {
        Ok(Evaluation {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| AppError::Validation(format!("Invalid UUID: {}", e)))?,
            employee: row.employee,
            month: row.month,
            grade: row.grade,
            notes: row.notes,
            further_action: row.further_action,
        })
    }
}
