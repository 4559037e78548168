//! Markdown encoding: heading, bold summary lines, one pipe table, notes.

use crate::analyzer::{DiffReport, HotspotReport, LeakReport, SeriesReport};
use crate::render::{DIFF_NOTES, LEAK_NOTES, ReportRenderer, SERIES_NOTES, report_title, vocabulary};
use crate::units::{ValueUnit, format_bytes, format_number, truncate_str};
use crate::LensResult;

const FUNCTION_WIDTH: usize = 40;
const SITE_WIDTH: usize = 25;

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl ReportRenderer for MarkdownRenderer {
    fn hotspots(&self, report: &HotspotReport) -> LensResult<String> {
        let vocab = vocabulary(report.kind);
        let unit = report.columns.unit;
        let has_count = report.columns.has_count();

        let mut out = format!("# {}\n\n", report_title(report.kind));
        if has_count {
            out.push_str(&format!(
                "**{}**: {}\n",
                vocab.total_count_label,
                format_number(report.total_count)
            ));
        }
        out.push_str(&format!(
            "**{}**: {}\n\n",
            vocab.total_value_label,
            unit.format(report.total_value)
        ));
        out.push_str(&format!("## {}\n\n", vocab.section));

        let mut headers = vec!["Rank", "Function"];
        if has_count {
            headers.extend([vocab.count_header, "Share"]);
        }
        headers.extend([vocab.value_header, "Share"]);
        if has_count {
            headers.push(vocab.avg_header);
        }
        out.push_str(&table_header(&headers));

        for (idx, stat) in report.rows().iter().enumerate() {
            let mut cells = vec![
                (idx + 1).to_string(),
                format!("`{}`", truncate_str(stat.function_name(), FUNCTION_WIDTH)),
            ];
            if has_count {
                cells.push(format_number(stat.count()));
                cells.push(format!("{:.2}%", stat.count_pct()));
            }
            cells.push(unit.format(stat.value()));
            cells.push(format!("{:.2}%", stat.value_pct()));
            if has_count {
                cells.push(unit.format(stat.avg_value()));
            }
            out.push_str(&table_row(&cells));
        }

        out.push_str(&notes(vocab.notes));
        Ok(out)
    }

    fn diff(&self, report: &DiffReport) -> LensResult<String> {
        let unit = report.unit;
        let s = &report.summary;

        let mut out = format!("# {} Profile Diff\n\n", report.kind.title());
        out.push_str(&format!("**Baseline**: `{}`\n", report.baseline_uri));
        out.push_str(&format!("**Target**: `{}`\n\n", report.target_uri));
        out.push_str("## Summary\n\n");
        out.push_str(&format!("- **Baseline total**: {}\n", unit.format(s.baseline_total)));
        out.push_str(&format!("- **Target total**: {}\n", unit.format(s.target_total)));
        out.push_str(&format!(
            "- **Total diff**: {} ({:+.2}%)\n",
            unit.format_delta(s.total_diff),
            s.total_diff_percent
        ));
        out.push_str(&format!("- **Improved functions**: {}\n", s.improved_funcs));
        out.push_str(&format!("- **Regressed functions**: {}\n", s.regressed_funcs));
        out.push_str(&format!("- **Added functions**: {}\n", s.added_funcs));
        out.push_str(&format!("- **Removed functions**: {}\n\n", s.removed_funcs));

        out.push_str("## Top Changes\n\n");
        out.push_str(&table_header(&["Rank", "Function", "Baseline", "Target", "Diff", "Change", "Status"]));
        for (idx, entry) in report.rows().iter().enumerate() {
            out.push_str(&table_row(&[
                (idx + 1).to_string(),
                format!("`{}`", truncate_str(&entry.function_name, FUNCTION_WIDTH)),
                unit.format(entry.baseline_value),
                unit.format(entry.target_value),
                unit.format_delta(entry.delta()),
                format!("{:+.2}%", entry.percent()),
                entry.class().as_str().to_string(),
            ]));
        }

        out.push_str(&notes(DIFF_NOTES));
        Ok(out)
    }

    fn series(&self, report: &SeriesReport) -> LensResult<String> {
        let s = &report.summary;

        let mut out = String::from("# Heap Time Series Analysis\n\n## Summary\n\n");
        out.push_str(&format!("- **Data points**: {}\n", s.data_points));
        out.push_str(&format!("- **Time span**: {:.0} minutes\n", s.time_span_minutes));
        out.push_str(&format!(
            "- **Total growth**: {}\n",
            ValueUnit::Bytes.format_delta(s.total_growth)
        ));
        out.push_str(&format!("- **Avg growth rate**: {:.2} MB/min\n", s.avg_growth_rate));
        out.push_str(&format!(
            "- **Growing sites**: {} (stable or shrinking: {})\n\n",
            s.growing_objects, s.stable_objects
        ));

        out.push_str("## Snapshots\n\n");
        out.push_str(&table_header(&["Timestamp", "Label", "In-Use", "Objects"]));
        for point in &report.series {
            out.push_str(&table_row(&[
                point.timestamp.clone(),
                point.label.clone(),
                format_bytes(point.total_bytes),
                format_number(point.total_objects),
            ]));
        }

        out.push_str("\n## Top Growing Allocation Sites\n\n");
        out.push_str(&table_header(&["Site", "First", "Last", "Growth", "Growth %", "Trend"]));
        for trend in report.top_trends() {
            out.push_str(&table_row(&[
                format!("`{}`", truncate_str(trend.type_name(), SITE_WIDTH)),
                format_bytes(trend.first_value()),
                format_bytes(trend.last_value()),
                ValueUnit::Bytes.format_delta(trend.growth_bytes()),
                format!("{:.1}%", trend.growth_percent()),
                trend.direction().as_str().to_string(),
            ]));
        }

        out.push_str(&notes(SERIES_NOTES));
        Ok(out)
    }

    fn leaks(&self, report: &LeakReport) -> LensResult<String> {
        let s = &report.summary;

        let mut out = String::from("# Memory Leak Suspects\n\n");
        out.push_str(&format!("**Baseline**: `{}`\n", report.baseline_uri));
        out.push_str(&format!("**Target**: `{}`\n\n", report.target_uri));
        out.push_str("## Summary\n\n");
        out.push_str(&format!("- **Baseline in-use**: {}\n", format_bytes(s.baseline_total)));
        out.push_str(&format!("- **Target in-use**: {}\n", format_bytes(s.target_total)));
        out.push_str(&format!(
            "- **Total growth**: {}\n",
            ValueUnit::Bytes.format_delta(s.total_growth)
        ));
        out.push_str(&format!("- **Suspects**: {} ({} new)\n", s.suspect_count, s.new_sites));
        out.push_str(&format!(
            "- **Suspect growth**: {}\n",
            ValueUnit::Bytes.format_delta(s.suspect_growth)
        ));
        if report.min_growth_bytes > 0 {
            out.push_str(&format!("- **Minimum growth**: {}\n", format_bytes(report.min_growth_bytes)));
        }
        out.push('\n');

        if report.suspects.is_empty() {
            out.push_str("No growing allocation sites found.\n");
        } else {
            out.push_str("## Top Suspects\n\n");
            out.push_str(&table_header(&["Rank", "Function", "Baseline", "Target", "Growth", "Growth %"]));
            for (idx, entry) in report.rows().iter().enumerate() {
                out.push_str(&table_row(&[
                    (idx + 1).to_string(),
                    format!("`{}`", truncate_str(&entry.function_name, FUNCTION_WIDTH)),
                    format_bytes(entry.baseline_value),
                    format_bytes(entry.target_value),
                    ValueUnit::Bytes.format_delta(entry.delta()),
                    format!("{:+.2}%", entry.percent()),
                ]));
            }
        }

        out.push_str(&notes(LEAK_NOTES));
        Ok(out)
    }
}

fn table_header(headers: &[&str]) -> String {
    let mut out = format!("| {} |\n", headers.join(" | "));
    out.push_str(&format!("|{}\n", "------|".repeat(headers.len())));
    out
}

fn table_row(cells: &[String]) -> String {
    format!("| {} |\n", cells.join(" | "))
}

fn notes(lines: &[&str]) -> String {
    let mut out = String::from("\n## Notes\n\n");
    for line in lines {
        out.push_str(&format!("- {line}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_one_separator_row() {
        let table = format!(
            "{}{}",
            table_header(&["Rank", "Function"]),
            table_row(&["1".to_string(), "`main.f`".to_string()])
        );
        assert_eq!(table, "| Rank | Function |\n|------|------|\n| 1 | `main.f` |\n");
    }

    #[test]
    fn notes_are_a_bullet_list() {
        let block = notes(&["first", "second"]);
        assert!(block.starts_with("\n## Notes\n\n"));
        assert!(block.ends_with("- first\n- second\n"));
    }
}
