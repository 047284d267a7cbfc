//! Derived performance metrics
//!
//! Pure aggregation over a queried request set: no hidden state, so rates are
//! testable without a store and reflect whatever snapshot the caller passed
//! in. All rates are percentages in [0, 100] and fall back to 0 (never NaN)
//! on an empty denominator.

use chrono::{Datelike, Month, NaiveDate};
use serde::Serialize;

use crate::models::{Request, RequestStatus};

/// Rate figures for one employee over a time window
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSummary {
    /// Requests currently accepted (status `ongoing`) in the window
    pub accepted: usize,
    pub declined: usize,
    pub completed: usize,
    /// Every request in the window regardless of status
    pub total: usize,
    pub acceptance_rate: f64,
    pub completion_rate: f64,
    pub on_time_rate: f64,
}

/// Organization-wide averages: unweighted mean across employees, one sample
/// per employee regardless of request volume.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgAverages {
    pub employees: usize,
    pub acceptance_rate: f64,
    pub completion_rate: f64,
    pub on_time_rate: f64,
}

/// Compute rate figures from one employee's requests within a window.
pub fn summarize(requests: &[Request]) -> RateSummary {
    let accepted = requests
        .iter()
        .filter(|r| r.status == RequestStatus::Ongoing)
        .count();
    let declined = requests
        .iter()
        .filter(|r| r.status == RequestStatus::Declined)
        .count();
    let completed = requests
        .iter()
        .filter(|r| r.status == RequestStatus::Completed)
        .count();
    let on_time = requests
        .iter()
        .filter(|r| {
            r.status == RequestStatus::Completed
                && r.completed_on
                    .map(|done| done.date_naive() <= r.deadline)
                    .unwrap_or(false)
        })
        .count();
    let total = requests.len();

    RateSummary {
        accepted,
        declined,
        completed,
        total,
        acceptance_rate: percentage(accepted, accepted + declined),
        completion_rate: percentage(completed, total),
        on_time_rate: percentage(on_time, completed),
    }
}

/// Average each rate across employees. Every summary contributes equally.
pub fn organization_average(summaries: &[RateSummary]) -> OrgAverages {
    let employees = summaries.len();
    if employees == 0 {
        return OrgAverages {
            employees: 0,
            acceptance_rate: 0.0,
            completion_rate: 0.0,
            on_time_rate: 0.0,
        };
    }

    let n = employees as f64;
    OrgAverages {
        employees,
        acceptance_rate: summaries.iter().map(|s| s.acceptance_rate).sum::<f64>() / n,
        completion_rate: summaries.iter().map(|s| s.completion_rate).sum::<f64>() / n,
        on_time_rate: summaries.iter().map(|s| s.on_time_rate).sum::<f64>() / n,
    }
}

/// Map a calendar-month label like "August 2026" to the half-open window
/// [first of month, first of next month). Returns None for labels that do
/// not parse.
pub fn month_window(label: &str) -> Option<(NaiveDate, NaiveDate)> {
    let mut parts = label.split_whitespace();
    let month: Month = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let start = NaiveDate::from_ymd_opt(year, month.number_from_month(), 1)?;
    let end = if start.month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, start.month() + 1, 1)?
    };

    Some((start, end))
}

fn percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}
