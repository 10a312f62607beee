use chrono::{DateTime, Duration, Utc};

/// Compute the next execution time for a job whose previous run started at
/// `last_run`.
///
/// A job that has run before repeats a fixed interval after that run; a job
/// that never ran is due immediately (`now`).
pub fn next_run_after(
    last_run: Option<DateTime<Utc>>,
    interval_minutes: u32,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match last_run {
        Some(prev) => prev + Duration::minutes(interval_minutes as i64),
        None => now,
    }
}

/// Whether a job should fire at `now`. Disabled or unscheduled jobs never do.
pub fn is_due(enabled: bool, next_run: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    enabled && next_run.is_some_and(|at| now >= at)
}
