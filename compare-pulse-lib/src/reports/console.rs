use super::common::{self, ROWS};
use crate::Result;
use crate::facts::{EntityKey, EntityMap, EntityReport, Source};
use crate::session::AppState;
use core::fmt::Write;
use owo_colors::OwoColorize;
use strum::IntoEnumIterator;

const COLUMN_GAP: &str = "   ";

/// Render the comparison table and status lines.
///
/// `reports` carries per-entity provenance and failures when the metrics come from a refresh in
/// this run.
pub fn generate<W: Write>(state: &AppState, reports: Option<&EntityMap<EntityReport>>, use_colors: bool, writer: &mut W) -> Result<()> {
    let names = EntityMap::from_fn(|key| state.config.get(key).name.clone());
    let cells: Vec<(&str, EntityMap<String>)> = ROWS
        .iter()
        .map(|row| (row.label, EntityMap::from_fn(|key| (row.value)(state.metrics.get(key)))))
        .collect();

    let label_width = ROWS.iter().map(|row| text_width(row.label)).max().unwrap_or(0);
    let widths = EntityMap::from_fn(|key| {
        cells
            .iter()
            .map(|(_, values)| text_width(values.get(key)))
            .chain(core::iter::once(text_width(names.get(key))))
            .max()
            .unwrap_or(0)
    });

    let mut header = format!("{:label_width$}", "");
    for key in EntityKey::iter() {
        header.push_str(COLUMN_GAP);
        header.push_str(&pad_left(names.get(key), *widths.get(key)));
    }

    if use_colors {
        writeln!(writer, "{}", header.bold())?;
    } else {
        writeln!(writer, "{header}")?;
    }

    for (label, values) in &cells {
        write!(writer, "{label:<label_width$}")?;
        for key in EntityKey::iter() {
            let value = values.get(key);
            let padded = pad_left(value, *widths.get(key));
            if use_colors && value == common::NOT_AVAILABLE {
                write!(writer, "{COLUMN_GAP}{}", padded.dimmed())?;
            } else {
                write!(writer, "{COLUMN_GAP}{padded}")?;
            }
        }
        writeln!(writer)?;
    }

    write_status(state, reports, use_colors, writer)
}

fn write_status<W: Write>(state: &AppState, reports: Option<&EntityMap<EntityReport>>, use_colors: bool, writer: &mut W) -> Result<()> {
    let mut lines = Vec::new();

    if let Some(error) = &state.error {
        let line = format!("Could not refresh metrics: {error}");
        lines.push(if use_colors { line.red().to_string() } else { line });
    }

    if let Some(reports) = reports {
        for (key, report) in reports.iter() {
            let name = &state.config.get(key).name;

            if report.source == Source::Cache {
                let line = format!("{name}: values served from cache");
                lines.push(if use_colors { line.dimmed().to_string() } else { line });
            }

            for (group, e) in &report.failures {
                let line = format!("{name}: could not fetch {group} ({e})");
                lines.push(if use_colors { line.yellow().to_string() } else { line });
            }
        }
    }

    if !lines.is_empty() {
        writeln!(writer)?;
        for line in lines {
            writeln!(writer, "{line}")?;
        }
    }

    Ok(())
}

fn text_width(s: &str) -> usize {
    s.chars().count()
}

fn pad_left(s: &str, width: usize) -> String {
    format!("{}{s}", " ".repeat(width.saturating_sub(text_width(s))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{CommunityMetrics, FetchError, MetricGroup};

    fn sample_state() -> AppState {
        let mut state = AppState::default();
        state.metrics.openspec = CommunityMetrics {
            stars: 1234,
            forks: 56,
            commits_4w: vec![1, 2, 3, 4],
            npm_version: Some("0.9.1".to_string()),
            ..CommunityMetrics::default()
        };
        state.metrics.speckit.stars = 42;
        state
    }

    #[test]
    fn test_table_layout() {
        let mut output = String::new();
        generate(&sample_state(), None, false, &mut output).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].ends_with("OpenSpec   SpecKit"));
        assert!(lines[1].starts_with("Stars"));
        assert!(lines[1].contains("1,234"));
        assert!(lines[1].ends_with("42"));
        assert!(output.contains("1 / 2 / 3 / 4 (10)"));
        assert!(output.contains("0.9.1"));
        assert_eq!(lines.len(), 1 + ROWS.len());
    }

    #[test]
    fn test_console_report_no_colors() {
        let mut output = String::new();
        generate(&sample_state(), None, false, &mut output).unwrap();
        insta::assert_snapshot!(output);
    }

    #[test]
    fn test_columns_are_aligned() {
        let mut output = String::new();
        generate(&sample_state(), None, false, &mut output).unwrap();

        let widths: Vec<usize> = output.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|&w| w == widths[0]), "all rows should have the same width: {widths:?}");
    }

    fn failed_refresh() -> (AppState, EntityMap<EntityReport>) {
        let mut state = sample_state();
        state.error = Some("store unavailable".to_string());

        let reports = EntityMap::new(
            EntityReport {
                metrics: state.metrics.openspec.clone(),
                source: Source::Cache,
                failures: Vec::new(),
            },
            EntityReport {
                metrics: state.metrics.speckit.clone(),
                source: Source::Network,
                failures: vec![(MetricGroup::CommitActivity, FetchError::Status(202))],
            },
        );

        (state, reports)
    }

    #[test]
    fn test_status_lines() {
        let (state, reports) = failed_refresh();
        let mut output = String::new();
        generate(&state, Some(&reports), false, &mut output).unwrap();

        assert!(output.contains("Could not refresh metrics: store unavailable"));
        assert!(output.contains("OpenSpec: values served from cache"));
        assert!(output.contains("SpecKit: could not fetch commit activity (unexpected HTTP status 202)"));
    }

    #[test]
    fn test_console_status_lines() {
        let (state, reports) = failed_refresh();
        let mut output = String::new();
        generate(&state, Some(&reports), false, &mut output).unwrap();
        insta::assert_snapshot!(output);
    }

    #[test]
    fn test_colors() {
        let mut plain = String::new();
        generate(&sample_state(), None, false, &mut plain).unwrap();
        assert!(!plain.contains('\u{1b}'));

        let mut colored = String::new();
        generate(&sample_state(), None, true, &mut colored).unwrap();
        assert!(colored.contains('\u{1b}'));
    }
}
