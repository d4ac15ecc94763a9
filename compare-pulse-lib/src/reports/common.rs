use crate::facts::CommunityMetrics;
use chrono::{DateTime, Utc};

/// Placeholder for values that are not known.
pub const NOT_AVAILABLE: &str = "n/a";

/// One row of the comparison table.
pub struct Row {
    pub label: &'static str,
    pub value: fn(&CommunityMetrics) -> String,
}

impl core::fmt::Debug for Row {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Row").field("label", &self.label).finish_non_exhaustive()
    }
}

pub static ROWS: &[Row] = &[
    Row {
        label: "Stars",
        value: |m| format_count(m.stars),
    },
    Row {
        label: "Forks",
        value: |m| format_count(m.forks),
    },
    Row {
        label: "Watchers",
        value: |m| format_count(m.watchers),
    },
    Row {
        label: "Releases",
        value: |m| format_count(m.releases),
    },
    Row {
        label: "Weekly downloads",
        value: |m| format_count(m.npm_downloads),
    },
    Row {
        label: "Open issues",
        value: |m| format_count(m.issues_open),
    },
    Row {
        label: "Commits (4 weeks)",
        value: |m| format_commits(&m.commits_4w),
    },
    Row {
        label: "Latest version",
        value: |m| m.npm_version.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    },
    Row {
        label: "Maintainers",
        value: |m| m.maintainers.map_or_else(|| NOT_AVAILABLE.to_string(), format_count),
    },
    Row {
        label: "Created",
        value: |m| format_date(m.created_at),
    },
    Row {
        label: "Last push",
        value: |m| format_date(m.pushed_at),
    },
    Row {
        label: "Updated",
        value: |m| format_date(m.updated_at),
    },
];

/// Format a count with `,` thousands separators.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

pub fn format_date(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |dt| dt.format("%Y-%m-%d").to_string())
}

/// Weekly totals followed by their sum, e.g. `3 / 5 / 0 / 7 (15)`.
pub fn format_commits(weeks: &[u64]) -> String {
    if weeks.is_empty() {
        return NOT_AVAILABLE.to_string();
    }

    let series: Vec<String> = weeks.iter().map(u64::to_string).collect();
    format!("{} ({})", series.join(" / "), weeks.iter().sum::<u64>())
}
