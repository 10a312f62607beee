use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::schedule;

/// Interval applied when a record carries no usable `intervalMinutes`.
pub const DEFAULT_INTERVAL_MINUTES: u32 = 60;

/// A persisted job record.
///
/// Wire and file shape use camelCase keys (`intervalMinutes`, `lastRun`, …)
/// and RFC 3339 timestamps. Deserialization is deliberately lenient: records
/// written by hand or by older builds must not strand the whole file, so
/// damaged fields fall back to defaults instead of failing the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// UUID v4 string, assigned by the registry.
    #[serde(default)]
    pub id: String,
    /// Human-readable label.
    #[serde(default)]
    pub name: String,
    /// Path of the script or program to run.
    #[serde(default)]
    pub target: String,
    /// Single argument string, whitespace-tokenized at dispatch.
    #[serde(default)]
    pub arguments: String,
    /// When set (and `custom_command` is non-empty) the interpreter table is
    /// bypassed: `custom_command` is the program, the target its first
    /// argument.
    #[serde(default)]
    pub use_custom_command: bool,
    #[serde(default)]
    pub custom_command: String,
    /// Minutes between runs, at least 1. Invalid stored values fall back
    /// to 60.
    #[serde(default = "default_interval", deserialize_with = "lenient_interval")]
    pub interval_minutes: u32,
    /// Disabled jobs are never considered due.
    #[serde(default = "bool_true")]
    pub enabled: bool,
    /// Start of the most recent dispatch. `None` = never ran.
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_run: Option<DateTime<Utc>>,
    /// Next planned dispatch. `None` = not scheduled.
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_run: Option<DateTime<Utc>>,
}

impl Job {
    /// Whether this job should fire at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        schedule::is_due(self.enabled, self.next_run, now)
    }

    /// Recompute `next_run` from `last_run` and the interval.
    pub fn recompute_next_run(&mut self, now: DateTime<Utc>) {
        self.next_run = Some(schedule::next_run_after(
            self.last_run,
            self.interval_minutes,
            now,
        ));
    }
}

/// Consumer-facing creation payload: a [`Job`] minus the registry-owned
/// fields (`id`, `lastRun`, `nextRun`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub arguments: String,
    #[serde(default)]
    pub use_custom_command: bool,
    #[serde(default)]
    pub custom_command: String,
    #[serde(default = "default_interval", deserialize_with = "lenient_interval")]
    pub interval_minutes: u32,
    #[serde(default = "bool_true")]
    pub enabled: bool,
}

impl Default for JobDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            target: String::new(),
            arguments: String::new(),
            use_custom_command: false,
            custom_command: String::new(),
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            enabled: true,
        }
    }
}

fn bool_true() -> bool {
    true
}

fn default_interval() -> u32 {
    DEFAULT_INTERVAL_MINUTES
}

/// Accept any JSON value for the interval; anything that isn't a number of
/// at least one falls back to the default.
fn lenient_interval<'de, D>(de: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(v.as_f64()
        .filter(|m| m.is_finite() && *m >= 1.0)
        .map(|m| m as u32)
        .unwrap_or(DEFAULT_INTERVAL_MINUTES))
}

/// Accept any JSON value for a timestamp; anything unparsable means "never".
/// Naive ISO strings (no offset) are read as UTC.
fn lenient_timestamp<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(match v {
        Value::String(s) => parse_timestamp(&s),
        _ => None,
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    s.parse::<chrono::NaiveDateTime>().ok().map(|n| n.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_camel_case_keys() {
        let job = Job {
            id: "a1".to_string(),
            name: "backup".to_string(),
            target: "/opt/backup.py".to_string(),
            arguments: "--full".to_string(),
            use_custom_command: false,
            custom_command: String::new(),
            interval_minutes: 15,
            enabled: true,
            last_run: Some("2026-03-01T10:00:00Z".parse().unwrap()),
            next_run: Some("2026-03-01T10:15:00Z".parse().unwrap()),
        };

        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["intervalMinutes"], 15);
        assert_eq!(json["useCustomCommand"], false);
        assert!(json["lastRun"].is_string());

        let back: Job = serde_json::from_value(json).unwrap();
        assert_eq!(back, job);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let job: Job = serde_json::from_str(r#"{"name": "minimal"}"#).unwrap();
        assert_eq!(job.name, "minimal");
        assert_eq!(job.interval_minutes, DEFAULT_INTERVAL_MINUTES);
        assert!(job.enabled);
        assert!(job.last_run.is_none());
        assert!(job.next_run.is_none());
        assert!(!job.use_custom_command);
        assert_eq!(job.target, "");
    }

    #[test]
    fn junk_interval_falls_back_to_sixty() {
        for raw in [r#""not a number""#, "0", "-5", "null", "true"] {
            let json = format!(r#"{{"name": "j", "intervalMinutes": {raw}}}"#);
            let job: Job = serde_json::from_str(&json).unwrap();
            assert_eq!(job.interval_minutes, DEFAULT_INTERVAL_MINUTES, "raw: {raw}");
        }
    }

    #[test]
    fn fractional_interval_truncates() {
        let job: Job = serde_json::from_str(r#"{"intervalMinutes": 2.9}"#).unwrap();
        assert_eq!(job.interval_minutes, 2);
    }

    #[test]
    fn unparsable_timestamps_mean_never() {
        let job: Job = serde_json::from_str(
            r#"{"name": "j", "lastRun": "yesterday-ish", "nextRun": 42}"#,
        )
        .unwrap();
        assert!(job.last_run.is_none());
        assert!(job.next_run.is_none());
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let job: Job = serde_json::from_str(r#"{"lastRun": "2026-03-01T10:00:00"}"#).unwrap();
        assert_eq!(
            job.last_run,
            Some("2026-03-01T10:00:00Z".parse().unwrap())
        );
    }

    #[test]
    fn never_run_serializes_without_timestamp_keys() {
        let job: Job = serde_json::from_str(r#"{"name": "fresh"}"#).unwrap();
        let json = serde_json::to_value(&job).unwrap();
        assert!(json.get("lastRun").is_none());
        assert!(json.get("nextRun").is_none());
    }

    #[test]
    fn draft_defaults_match_a_new_job() {
        let draft = JobDraft::default();
        assert_eq!(draft.interval_minutes, DEFAULT_INTERVAL_MINUTES);
        assert!(draft.enabled);
    }
}
