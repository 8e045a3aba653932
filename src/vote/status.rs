//! Proposal status badges and relative time text

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::Serialize;

use crate::domain::ProposalStatus;

const SECS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_MONTH: f64 = 30.436875;

/// Hour of day (UTC) at which a voting day closes
pub const VOTE_CLOSE_HOUR: u32 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusIcon {
    Failure,
    Calendar,
    Tick,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub icon: Option<StatusIcon>,
    pub text: String,
}

impl StatusBadge {
    fn new(icon: Option<StatusIcon>, text: impl Into<String>) -> Self {
        Self {
            icon,
            text: text.into(),
        }
    }
}

fn round_abs(value: f64) -> u64 {
    value.abs().round() as u64
}

/// Length of `seconds` as words, e.g. "a day", "5 days", "2 months"
pub fn humanize(seconds: i64) -> String {
    let secs = seconds as f64;
    let s = round_abs(secs);
    if s <= 44 {
        return "a few seconds".to_string();
    }
    if s <= 89 {
        return "a minute".to_string();
    }
    let minutes = round_abs(secs / 60.0);
    if minutes <= 44 {
        return format!("{} minutes", minutes);
    }
    if minutes <= 89 {
        return "an hour".to_string();
    }
    let hours = round_abs(secs / 3600.0);
    if hours <= 1 {
        return "an hour".to_string();
    }
    if hours <= 21 {
        return format!("{} hours", hours);
    }
    if hours <= 35 {
        return "a day".to_string();
    }
    let days = round_abs(secs / SECS_PER_DAY);
    if days <= 1 {
        return "a day".to_string();
    }
    if days <= 25 {
        return format!("{} days", days);
    }
    if days <= 45 {
        return "a month".to_string();
    }
    let months_exact = secs / SECS_PER_DAY / DAYS_PER_MONTH;
    let months = round_abs(months_exact);
    if months <= 1 {
        return "a month".to_string();
    }
    if months <= 10 {
        return format!("{} months", months);
    }
    if months <= 17 {
        return "a year".to_string();
    }
    match round_abs(months_exact / 12.0) {
        0 | 1 => "a year".to_string(),
        years => format!("{} years", years),
    }
}

/// Signed number of days from `platform_day` to `target_day`
fn day_span(target_day: u64, platform_day: u64) -> Option<i64> {
    i64::try_from(target_day)
        .ok()?
        .checked_sub(i64::try_from(platform_day).ok()?)
}

/// Distance between two platform days as words, empty when out of range
pub fn format_time_str(target_day: u64, platform_day: u64) -> String {
    day_span(target_day, platform_day)
        .and_then(|days| days.checked_mul(SECS_PER_DAY as i64))
        .map(humanize)
        .unwrap_or_default()
}

/// "in 5 days" until the close of `end_day`, or "3 days ago" after it.
///
/// Empty when the day span cannot be represented as a date.
pub fn voting_ends_in(end_day: u64, platform_day: u64, now: DateTime<Utc>) -> String {
    let Some(shifted) = day_span(end_day, platform_day)
        .and_then(Duration::try_days)
        .and_then(|span| now.checked_add_signed(span))
    else {
        return String::new();
    };
    let target = shifted.with_hour(VOTE_CLOSE_HOUR).unwrap_or(shifted);
    let seconds = (target - now).num_seconds();
    if seconds >= 0 {
        format!("in {}", humanize(seconds))
    } else {
        format!("{} ago", humanize(seconds))
    }
}

/// Icon and text describing where a proposal stands on `platform_day`
pub fn status_badge(
    status: ProposalStatus,
    start_day: u64,
    end_day: u64,
    platform_day: u64,
) -> StatusBadge {
    let not_started = start_day > platform_day;
    let is_active = start_day <= platform_day && platform_day < end_day;

    if status.is_failure() {
        return StatusBadge::new(Some(StatusIcon::Failure), status.label());
    }

    match status {
        ProposalStatus::Pending | ProposalStatus::Confirmed if not_started => StatusBadge::new(
            Some(StatusIcon::Calendar),
            format!("Starting in {}", format_time_str(start_day, platform_day)),
        ),
        ProposalStatus::Active if is_active => StatusBadge::new(
            Some(StatusIcon::Calendar),
            format!("{} left", format_time_str(end_day, platform_day)),
        ),
        ProposalStatus::Active if not_started => StatusBadge::new(
            Some(StatusIcon::Calendar),
            format!("Starting in {}", format_time_str(start_day, platform_day)),
        ),
        ProposalStatus::Succeeded | ProposalStatus::Executed => {
            StatusBadge::new(Some(StatusIcon::Tick), status.label())
        }
        _ => StatusBadge::new(None, status.label()),
    }
}
