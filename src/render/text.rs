//! Plain-text encoding with fixed-width columns.

use crate::analyzer::{DiffReport, HotspotReport, LeakReport, SeriesReport};
use crate::render::{DIFF_NOTES, LEAK_NOTES, ReportRenderer, SERIES_NOTES, report_title, vocabulary};
use crate::units::{ValueUnit, format_bytes, format_number, truncate_str};
use crate::LensResult;

const FUNCTION_WIDTH: usize = 50;
const SITE_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl ReportRenderer for TextRenderer {
    fn hotspots(&self, report: &HotspotReport) -> LensResult<String> {
        let vocab = vocabulary(report.kind);
        let unit = report.columns.unit;
        let has_count = report.columns.has_count();

        let mut out = heading(&report_title(report.kind));
        if has_count {
            out.push_str(&format!(
                "{}: {}\n",
                vocab.total_count_label,
                format_number(report.total_count)
            ));
        }
        out.push_str(&format!(
            "{}: {}\n\n",
            vocab.total_value_label,
            unit.format(report.total_value)
        ));

        out.push_str(&format!("{}:\n", vocab.section));
        let mut header = format!("{:<6} {:<FUNCTION_WIDTH$}", "Rank", "Function");
        if has_count {
            header.push_str(&format!(" {:>12} {:>10}", vocab.count_header, "Share"));
        }
        header.push_str(&format!(" {:>12} {:>10}", vocab.value_header, "Share"));
        if has_count {
            header.push_str(&format!(" {:>12}", vocab.avg_header));
        }
        out.push_str(&rule(120));
        out.push_str(&header);
        out.push('\n');
        out.push_str(&rule(120));

        for (idx, stat) in report.rows().iter().enumerate() {
            let mut line = format!(
                "{:<6} {:<FUNCTION_WIDTH$}",
                idx + 1,
                truncate_str(stat.function_name(), FUNCTION_WIDTH)
            );
            if has_count {
                line.push_str(&format!(
                    " {:>12} {:>9.2}%",
                    format_number(stat.count()),
                    stat.count_pct()
                ));
            }
            line.push_str(&format!(" {:>12} {:>9.2}%", unit.format(stat.value()), stat.value_pct()));
            if has_count {
                line.push_str(&format!(" {:>12}", unit.format(stat.avg_value())));
            }
            out.push_str(&line);
            out.push('\n');
        }

        out.push_str(&notes(vocab.notes));
        Ok(out)
    }

    fn diff(&self, report: &DiffReport) -> LensResult<String> {
        let unit = report.unit;
        let s = &report.summary;

        let mut out = heading(&format!("{} Profile Diff", report.kind.title()));
        out.push_str(&format!("Baseline: {}\n", report.baseline_uri));
        out.push_str(&format!("Target:   {}\n\n", report.target_uri));
        out.push_str("Summary:\n");
        out.push_str(&format!("  Baseline total: {}\n", unit.format(s.baseline_total)));
        out.push_str(&format!("  Target total:   {}\n", unit.format(s.target_total)));
        out.push_str(&format!(
            "  Total diff:     {} ({:+.2}%)\n\n",
            unit.format_delta(s.total_diff),
            s.total_diff_percent
        ));
        out.push_str(&format!("  Improved functions:  {}\n", s.improved_funcs));
        out.push_str(&format!("  Regressed functions: {}\n", s.regressed_funcs));
        out.push_str(&format!("  Added functions:     {}\n", s.added_funcs));
        out.push_str(&format!("  Removed functions:   {}\n\n", s.removed_funcs));

        out.push_str("Top Changes:\n");
        out.push_str(&rule(140));
        out.push_str(&format!(
            "{:<6} {:<FUNCTION_WIDTH$} {:>15} {:>15} {:>15} {:>10}  {}\n",
            "Rank", "Function", "Baseline", "Target", "Diff", "Change", "Status"
        ));
        out.push_str(&rule(140));
        for (idx, entry) in report.rows().iter().enumerate() {
            out.push_str(&format!(
                "{:<6} {:<FUNCTION_WIDTH$} {:>15} {:>15} {:>15} {:>+9.2}%  {}\n",
                idx + 1,
                truncate_str(&entry.function_name, FUNCTION_WIDTH),
                unit.format(entry.baseline_value),
                unit.format(entry.target_value),
                unit.format_delta(entry.delta()),
                entry.percent(),
                entry.class().as_str()
            ));
        }

        out.push_str(&notes(DIFF_NOTES));
        Ok(out)
    }

    fn series(&self, report: &SeriesReport) -> LensResult<String> {
        let s = &report.summary;

        let mut out = heading("Heap Time Series Analysis");
        out.push_str("Summary:\n");
        out.push_str(&format!("  Data points: {}\n", s.data_points));
        out.push_str(&format!("  Time span: {:.0} minutes\n", s.time_span_minutes));
        out.push_str(&format!("  Total growth: {}\n", ValueUnit::Bytes.format_delta(s.total_growth)));
        out.push_str(&format!("  Avg growth rate: {:.2} MB/min\n", s.avg_growth_rate));
        out.push_str(&format!("  Growing sites: {}\n", s.growing_objects));
        out.push_str(&format!("  Stable sites: {}\n\n", s.stable_objects));

        out.push_str("Snapshots:\n");
        for point in &report.series {
            out.push_str(&format!(
                "  [{}] {}: {} ({} objects)\n",
                point.timestamp,
                point.label,
                format_bytes(point.total_bytes),
                format_number(point.total_objects)
            ));
        }

        out.push_str("\nTop Growing Allocation Sites:\n");
        out.push_str(&rule(110));
        out.push_str(&format!(
            "{:<SITE_WIDTH$} {:>15} {:>15} {:>12} {:>10} {:>12}\n",
            "Site", "First", "Last", "Growth", "Growth %", "Trend"
        ));
        out.push_str(&rule(110));
        for trend in report.top_trends() {
            out.push_str(&format!(
                "{:<SITE_WIDTH$} {:>15} {:>15} {:>12} {:>9.1}% {:>12}\n",
                truncate_str(trend.type_name(), SITE_WIDTH),
                format_bytes(trend.first_value()),
                format_bytes(trend.last_value()),
                ValueUnit::Bytes.format_delta(trend.growth_bytes()),
                trend.growth_percent(),
                trend.direction().as_str()
            ));
        }

        out.push_str(&notes(SERIES_NOTES));
        Ok(out)
    }

    fn leaks(&self, report: &LeakReport) -> LensResult<String> {
        let s = &report.summary;

        let mut out = heading("Memory Leak Suspects");
        out.push_str(&format!("Baseline: {}\n", report.baseline_uri));
        out.push_str(&format!("Target:   {}\n\n", report.target_uri));
        out.push_str("Summary:\n");
        out.push_str(&format!("  Baseline in-use: {}\n", format_bytes(s.baseline_total)));
        out.push_str(&format!("  Target in-use:   {}\n", format_bytes(s.target_total)));
        out.push_str(&format!("  Total growth:    {}\n", ValueUnit::Bytes.format_delta(s.total_growth)));
        out.push_str(&format!("  Suspects: {} ({} new)\n", s.suspect_count, s.new_sites));
        out.push_str(&format!(
            "  Suspect growth: {}\n",
            ValueUnit::Bytes.format_delta(s.suspect_growth)
        ));
        if report.min_growth_bytes > 0 {
            out.push_str(&format!("  Minimum growth: {}\n", format_bytes(report.min_growth_bytes)));
        }
        out.push('\n');

        if report.suspects.is_empty() {
            out.push_str("No growing allocation sites found.\n");
        } else {
            out.push_str("Top Suspects:\n");
            out.push_str(&rule(120));
            out.push_str(&format!(
                "{:<6} {:<FUNCTION_WIDTH$} {:>12} {:>12} {:>12} {:>10}\n",
                "Rank", "Function", "Baseline", "Target", "Growth", "Growth %"
            ));
            out.push_str(&rule(120));
            for (idx, entry) in report.rows().iter().enumerate() {
                out.push_str(&format!(
                    "{:<6} {:<FUNCTION_WIDTH$} {:>12} {:>12} {:>12} {:>+9.2}%\n",
                    idx + 1,
                    truncate_str(&entry.function_name, FUNCTION_WIDTH),
                    format_bytes(entry.baseline_value),
                    format_bytes(entry.target_value),
                    ValueUnit::Bytes.format_delta(entry.delta()),
                    entry.percent()
                ));
            }
        }

        out.push_str(&notes(LEAK_NOTES));
        Ok(out)
    }
}

fn heading(title: &str) -> String {
    format!("{title}\n{}\n\n", "=".repeat(title.chars().count()))
}

fn rule(width: usize) -> String {
    format!("{}\n", "-".repeat(width))
}

fn notes(lines: &[&str]) -> String {
    let mut out = String::from("\nNotes:\n");
    for line in lines {
        out.push_str(&format!("- {line}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ProfileComparator;
    use crate::{Profile, ProfileKind, ValueType};

    #[test]
    fn diff_rows_show_status_words() {
        let base = Profile::new(vec![ValueType::new("delay", "nanoseconds")])
            .with_sample(vec![5_000], &["main.a"])
            .with_sample(vec![1_000], &["main.gone"]);
        let target = Profile::new(vec![ValueType::new("delay", "nanoseconds")])
            .with_sample(vec![9_000], &["main.a"]);
        let report = ProfileComparator::new(ProfileKind::Block)
            .diff(&base, &target, 5)
            .expect("diff");
        let out = TextRenderer.diff(&report).expect("text");
        assert!(out.starts_with("Block Profile Diff\n"), "got:\n{out}");
        let a = out.lines().find(|l| l.contains("main.a")).expect("row for main.a");
        assert!(a.ends_with("regressed"), "row: {a}");
        assert!(a.contains("+80.00%"), "row: {a}");
        let gone = out.lines().find(|l| l.contains("main.gone")).expect("row for main.gone");
        assert!(gone.ends_with("removed"), "row: {gone}");
    }

    #[test]
    fn long_function_names_are_cut() {
        let long = format!("main.{}", "x".repeat(80));
        let p = Profile::new(vec![ValueType::new("cpu", "nanoseconds")]).with_sample(vec![10], &[long.as_str()]);
        let report = crate::analyzer::aggregate_hotspots(&p, ProfileKind::Cpu, 5).expect("aggregate");
        let out = TextRenderer.hotspots(&report).expect("text");
        assert!(out.contains(truncate_str(&long, FUNCTION_WIDTH)));
        assert!(!out.contains(&long));
    }
}
