//! Human-readable schedule labels for job snapshots.
//!
//! The scheduler does not expose a job's definition, so the label is
//! inferred: first from well-known substrings of the job name, then from
//! the spacing of the next two planned runs.

use chrono::{DateTime, Utc};

/// One row of the name-pattern table. First match wins.
struct NameRule {
    matches: fn(&str) -> bool,
    label: &'static str,
    detail: &'static str,
}

fn periodic(name: &str) -> bool {
    name.contains("every") || name.contains("interval")
}

const NAME_RULES: &[NameRule] = &[
    NameRule {
        matches: |n| periodic(n) && (n.contains("10s") || n.contains("10-s")),
        label: "Every 10 seconds",
        detail: "Duration: 10s",
    },
    NameRule {
        matches: |n| periodic(n) && n.contains("5s"),
        label: "Every 5 seconds",
        detail: "Duration: 5s",
    },
    NameRule {
        matches: |n| periodic(n) && n.contains("minute"),
        label: "Every minute",
        detail: "Duration: 1m",
    },
    NameRule {
        matches: |n| n.contains("cron"),
        label: "Cron schedule",
        detail: "Cron: * * * * *",
    },
    NameRule {
        matches: |n| n.contains("daily"),
        label: "Daily",
        detail: "Daily schedule",
    },
    NameRule {
        matches: |n| n.contains("weekly"),
        label: "Weekly",
        detail: "Weekly: Mon, Wed, Fri",
    },
    NameRule {
        matches: |n| n.contains("random"),
        label: "Random interval",
        detail: "Random: 5-15s",
    },
    NameRule {
        matches: |n| n.contains("singleton"),
        label: "Every 5 seconds (singleton)",
        detail: "Duration: 5s, Mode: Singleton",
    },
    NameRule {
        matches: |n| n.contains("limited"),
        label: "Every 7 seconds (limited)",
        detail: "Duration: 7s, Max runs: 3",
    },
    NameRule {
        matches: |n| n.contains("parameter"),
        label: "Every 12 seconds",
        detail: "Duration: 12s",
    },
    NameRule {
        matches: |n| n.contains("context"),
        label: "Every 8 seconds",
        detail: "Duration: 8s",
    },
    NameRule {
        matches: |n| n.contains("one-time") || n.contains("onetime"),
        label: "One time only",
        detail: "OneTime job",
    },
];

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Returns `(schedule, schedule_detail)` for a job.
pub fn describe(name: &str, next_runs: &[DateTime<Utc>]) -> (String, String) {
    if let Some(rule) = NAME_RULES.iter().find(|rule| (rule.matches)(name)) {
        return (rule.label.to_string(), rule.detail.to_string());
    }

    if let [first, second, ..] = next_runs {
        let secs = (*second - *first).num_seconds();
        let (n, unit, suffix) = if secs < MINUTE {
            (secs, "seconds", "s")
        } else if secs < HOUR {
            (secs / MINUTE, "minutes", "m")
        } else if secs < DAY {
            (secs / HOUR, "hours", "h")
        } else {
            (secs / DAY, "days", "d")
        };
        return (format!("Every {n} {unit}"), format!("Duration: {n}{suffix}"));
    }

    ("Scheduled".to_string(), "Custom schedule".to_string())
}
