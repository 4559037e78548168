//! Single-profile hotspot aggregation (`analyze` for every profile kind).
//!
//! Samples are grouped by their top-of-stack function. Each group sums the
//! kind's magnitude column (delay, cpu time, bytes, goroutines) and, where the
//! kind has one, its count column (contentions, samples, objects). Groups are
//! ranked by magnitude, then by name.

use std::collections::HashMap;

use crate::analyzer::columns::{HotspotColumns, resolve_hotspot_columns};
use crate::render::OutputFormat;
use crate::{LensResult, Profile, ProfileKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Totals {
    count: i64,
    value: i64,
}

impl Totals {
    fn add(&mut self, count: i64, value: i64) {
        self.count = self.count.saturating_add(count);
        self.value = self.value.saturating_add(value);
    }
}

/// Aggregated figures for one function. Percentages and the average are
/// computed from the raw sums at construction and cannot be set directly.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionStat {
    function_name: String,
    count: i64,
    value: i64,
    count_pct: f64,
    value_pct: f64,
    avg_value: i64,
}

impl FunctionStat {
    fn new(function_name: String, own: Totals, all: Totals) -> Self {
        Self {
            function_name,
            count: own.count,
            value: own.value,
            count_pct: percent_of(own.count, all.count),
            value_pct: percent_of(own.value, all.value),
            avg_value: if own.count == 0 { 0 } else { own.value / own.count },
        }
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn count_pct(&self) -> f64 {
        self.count_pct
    }

    pub fn value_pct(&self) -> f64 {
        self.value_pct
    }

    /// Magnitude per counted event; zero when the group counted nothing.
    pub fn avg_value(&self) -> i64 {
        self.avg_value
    }
}

fn percent_of(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[derive(Debug, Clone)]
pub struct HotspotReport {
    pub kind: ProfileKind,
    pub columns: HotspotColumns,
    pub total_count: i64,
    pub total_value: i64,
    pub top_n: usize,
    /// Full ranking; text and markdown only show [`HotspotReport::rows`].
    pub stats: Vec<FunctionStat>,
}

impl HotspotReport {
    pub fn rows(&self) -> &[FunctionStat] {
        &self.stats[..self.top_n.min(self.stats.len())]
    }

    /// Mutex and block profiles are idle without contentions; the other kinds
    /// without any magnitude.
    pub fn has_activity(&self) -> bool {
        match self.kind {
            ProfileKind::Mutex | ProfileKind::Block => self.total_count != 0,
            _ => self.total_value != 0,
        }
    }
}

pub fn aggregate_hotspots(profile: &Profile, kind: ProfileKind, top_n: usize) -> LensResult<HotspotReport> {
    let columns = resolve_hotspot_columns(profile, kind)?;

    let mut groups = HashMap::<&str, Totals>::new();
    let mut all = Totals::default();
    for sample in &profile.sample {
        if sample.location.is_empty() || sample.value.len() < columns.min_len() {
            continue;
        }
        let value = sample.value[columns.value];
        let count = columns.count.map_or(0, |idx| sample.value[idx]);
        groups
            .entry(sample.leaf_function())
            .or_default()
            .add(count, value);
        all.add(count, value);
    }

    let mut stats = groups
        .into_iter()
        .map(|(name, own)| FunctionStat::new(name.to_string(), own, all))
        .collect::<Vec<_>>();
    stats.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| a.function_name.cmp(&b.function_name))
    });

    Ok(HotspotReport {
        kind,
        columns,
        total_count: all.count,
        total_value: all.value,
        top_n,
        stats,
    })
}

pub fn no_activity_message(kind: ProfileKind) -> &'static str {
    match kind {
        ProfileKind::Cpu => "CPU profile analysis complete: no CPU samples found.",
        ProfileKind::Heap => "Heap profile analysis complete: no in-use memory found.",
        ProfileKind::Allocs => "Allocs profile analysis complete: no allocations found.",
        ProfileKind::Goroutine => "Goroutine profile analysis complete: no goroutines found.",
        ProfileKind::Mutex => "Mutex profile analysis complete: no lock contention found.",
        ProfileKind::Block => "Block profile analysis complete: no blocking found.",
    }
}

/// Ranked hotspot report for `profile`, or the kind's "nothing found"
/// sentence when the profile recorded no activity.
pub fn analyze_profile(
    profile: &Profile,
    kind: ProfileKind,
    top_n: usize,
    format: OutputFormat,
) -> LensResult<String> {
    let report = aggregate_hotspots(profile, kind, top_n)?;
    if !report.has_activity() {
        return Ok(no_activity_message(kind).to_string());
    }
    format.renderer().hotspots(&report)
}

pub fn analyze_cpu_profile(profile: &Profile, top_n: usize, format: OutputFormat) -> LensResult<String> {
    analyze_profile(profile, ProfileKind::Cpu, top_n, format)
}

pub fn analyze_heap_profile(profile: &Profile, top_n: usize, format: OutputFormat) -> LensResult<String> {
    analyze_profile(profile, ProfileKind::Heap, top_n, format)
}

pub fn analyze_allocs_profile(profile: &Profile, top_n: usize, format: OutputFormat) -> LensResult<String> {
    analyze_profile(profile, ProfileKind::Allocs, top_n, format)
}

pub fn analyze_goroutine_profile(profile: &Profile, top_n: usize, format: OutputFormat) -> LensResult<String> {
    analyze_profile(profile, ProfileKind::Goroutine, top_n, format)
}

pub fn analyze_mutex_profile(profile: &Profile, top_n: usize, format: OutputFormat) -> LensResult<String> {
    analyze_profile(profile, ProfileKind::Mutex, top_n, format)
}

pub fn analyze_block_profile(profile: &Profile, top_n: usize, format: OutputFormat) -> LensResult<String> {
    analyze_profile(profile, ProfileKind::Block, top_n, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LensError, ValueType};

    fn contention_profile() -> Profile {
        Profile::new(vec![
            ValueType::new("contentions", "count"),
            ValueType::new("delay", "nanoseconds"),
        ])
    }

    fn block_profile() -> Profile {
        contention_profile()
            .with_sample(vec![200, 100_000_000], &["main.channelReceive", "main.worker"])
            .with_sample(vec![80, 40_000_000], &["main.networkCall", "main.worker"])
    }

    #[test]
    fn block_text_report_lists_totals_and_functions() {
        let out = analyze_block_profile(&block_profile(), 5, OutputFormat::Text).expect("analyze");
        for want in ["Block Profile", "main.channelReceive", "main.networkCall", "280", "140.00 ms"] {
            assert!(out.contains(want), "missing {want:?} in:\n{out}");
        }
    }

    #[test]
    fn block_markdown_report_has_table() {
        let out = analyze_block_profile(&block_profile(), 5, OutputFormat::Markdown).expect("analyze");
        assert!(out.starts_with("# Block Profile Analysis"), "got:\n{out}");
        assert!(out.contains("| Contentions |"));
        assert!(out.contains("`main.networkCall`"));
    }

    #[test]
    fn block_json_report_keeps_schema() {
        let out = analyze_block_profile(&block_profile(), 5, OutputFormat::Json).expect("analyze");
        for want in [
            r#""profileType": "block""#,
            r#""totalContentions": 280"#,
            r#""functionName": "main.channelReceive""#,
            r#""delayNanos": 100000000"#,
        ] {
            assert!(out.contains(want), "missing {want:?} in:\n{out}");
        }
        let doc: serde_json::Value = serde_json::from_str(&out).expect("valid json");
        assert_eq!(doc["totalDelayNanos"], 140_000_000);
        assert_eq!(doc["blocks"][0]["functionName"], "main.channelReceive");
    }

    #[test]
    fn top_n_truncates_text_but_not_json() {
        let text = analyze_block_profile(&block_profile(), 1, OutputFormat::Text).expect("text");
        assert!(text.contains("main.channelReceive"));
        assert!(!text.contains("main.networkCall"));

        let markdown = analyze_block_profile(&block_profile(), 1, OutputFormat::Markdown).expect("md");
        assert!(!markdown.contains("main.networkCall"));

        let json = analyze_block_profile(&block_profile(), 1, OutputFormat::Json).expect("json");
        let doc: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(doc["topN"], 1);
        assert_eq!(doc["blocks"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn empty_block_profile_is_not_an_error() {
        let out = analyze_block_profile(&contention_profile(), 5, OutputFormat::Text).expect("analyze");
        assert!(out.contains("no blocking found"), "got: {out}");

        let out = analyze_mutex_profile(&contention_profile(), 5, OutputFormat::Json).expect("analyze");
        assert!(out.contains("no lock contention found"), "got: {out}");
    }

    #[test]
    fn missing_columns_fail_before_aggregation() {
        let p = Profile::new(vec![ValueType::new("cpu", "nanoseconds")]).with_sample(vec![100], &["main.f"]);
        let err = analyze_block_profile(&p, 5, OutputFormat::Text).expect_err("must fail");
        assert!(matches!(err, LensError::MissingSampleType(_)));
        assert!(err.to_string().contains("contentions"));
    }

    #[test]
    fn average_delay_is_exact() {
        let p = contention_profile().with_sample(vec![10, 100_000_000], &["main.slowOperation"]);
        let out = analyze_block_profile(&p, 5, OutputFormat::Json).expect("analyze");
        assert!(out.contains(r#""avgDelayNanos": 10000000"#), "got:\n{out}");
    }

    #[test]
    fn zero_contentions_group_has_zero_average() {
        let p = contention_profile()
            .with_sample(vec![5, 1_000], &["main.a"])
            .with_sample(vec![0, 500], &["main.b"]);
        let report = aggregate_hotspots(&p, ProfileKind::Mutex, 5).expect("aggregate");
        let b = report
            .stats
            .iter()
            .find(|s| s.function_name() == "main.b")
            .expect("main.b");
        assert_eq!(b.avg_value(), 0);
        assert_eq!(b.count_pct(), 0.0);
    }

    #[test]
    fn samples_merge_by_leaf_function() {
        let p = contention_profile()
            .with_sample(vec![3, 300], &["sync.(*Mutex).Lock", "main.a"])
            .with_sample(vec![2, 700], &["sync.(*Mutex).Lock", "main.b"])
            .with_sample(vec![1, 100], &[])
            .with_sample(vec![1], &["main.short"]);
        let report = aggregate_hotspots(&p, ProfileKind::Mutex, 5).expect("aggregate");
        assert_eq!(report.stats.len(), 1);
        assert_eq!(report.stats[0].function_name(), "sync.(*Mutex).Lock");
        assert_eq!(report.stats[0].count(), 5);
        assert_eq!(report.stats[0].value(), 1_000);
        assert_eq!(report.stats[0].avg_value(), 200);
        assert_eq!(report.total_count, 5);
    }

    #[test]
    fn aggregation_is_closed_and_percentages_bounded() {
        let p = contention_profile()
            .with_sample(vec![7, 70], &["main.a"])
            .with_sample(vec![3, 930], &["main.b"])
            .with_sample(vec![11, 0], &["main.c"])
            .with_sample(vec![4, 45], &["main.a"]);
        let report = aggregate_hotspots(&p, ProfileKind::Block, 2).expect("aggregate");
        let value_sum: i64 = report.stats.iter().map(FunctionStat::value).sum();
        let count_sum: i64 = report.stats.iter().map(FunctionStat::count).sum();
        assert_eq!(value_sum, report.total_value);
        assert_eq!(count_sum, report.total_count);
        for stat in &report.stats {
            assert!((0.0..=100.0).contains(&stat.value_pct()));
            assert!((0.0..=100.0).contains(&stat.count_pct()));
        }
        let values = report.stats.iter().map(FunctionStat::value).collect::<Vec<_>>();
        assert_eq!(values, vec![930, 115, 0]);
        assert_eq!(report.rows().len(), 2);
    }

    #[test]
    fn equal_values_rank_by_name() {
        let p = contention_profile()
            .with_sample(vec![1, 50], &["main.zeta"])
            .with_sample(vec![1, 50], &["main.alpha"])
            .with_sample(vec![1, 50], &["main.mid"]);
        let report = aggregate_hotspots(&p, ProfileKind::Block, 5).expect("aggregate");
        let names = report
            .stats
            .iter()
            .map(FunctionStat::function_name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["main.alpha", "main.mid", "main.zeta"]);
    }

    #[test]
    fn cpu_profile_ranks_by_cpu_time() {
        let p = Profile::new(vec![
            ValueType::new("samples", "count"),
            ValueType::new("cpu", "nanoseconds"),
        ])
        .with_sample(vec![10, 100_000_000], &["runtime.mallocgc"])
        .with_sample(vec![30, 300_000_000], &["main.hash"]);
        let out = analyze_cpu_profile(&p, 5, OutputFormat::Json).expect("analyze");
        let doc: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(doc["profileType"], "cpu");
        assert_eq!(doc["totalCpuNanos"], 400_000_000);
        assert_eq!(doc["functions"][0]["functionName"], "main.hash");
        assert_eq!(doc["functions"][0]["avgCpuNanos"], 10_000_000);
    }

    #[test]
    fn heap_without_objects_column_omits_counts() {
        let p = Profile::new(vec![ValueType::new("inuse_space", "bytes")])
            .with_sample(vec![4096], &["main.buffer"])
            .with_sample(vec![1024], &["main.small"]);
        let out = analyze_heap_profile(&p, 5, OutputFormat::Json).expect("analyze");
        let doc: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(doc["totalBytes"], 5120);
        assert!(doc.get("totalObjects").is_none());
        assert!(doc["allocations"][0].get("objects").is_none());
        assert_eq!(doc["allocations"][0]["bytesFormatted"], "4.00 KB");

        let text = analyze_heap_profile(&p, 5, OutputFormat::Text).expect("analyze");
        assert!(text.contains("main.buffer") && text.contains("80.00%"), "got:\n{text}");
    }

    #[test]
    fn idle_goroutine_profile_reports_nothing_found() {
        let p = Profile::new(vec![ValueType::new("goroutine", "count")]);
        let out = analyze_goroutine_profile(&p, 5, OutputFormat::Markdown).expect("analyze");
        assert!(out.contains("no goroutines found"));
    }

    #[test]
    fn allocs_profile_reports_objects() {
        let p = Profile::new(vec![
            ValueType::new("alloc_objects", "count"),
            ValueType::new("alloc_space", "bytes"),
        ])
        .with_sample(vec![4, 2048], &["encoding/json.Marshal"]);
        let out = analyze_allocs_profile(&p, 5, OutputFormat::Markdown).expect("analyze");
        assert!(out.contains("encoding/json.Marshal"));
        assert!(out.contains("2.00 KB"));
        assert!(out.contains("512 B"), "avg bytes per object missing:\n{out}");
    }

    #[test]
    fn identical_input_renders_identically() {
        let a = analyze_block_profile(&block_profile(), 5, OutputFormat::Json).expect("a");
        let b = analyze_block_profile(&block_profile(), 5, OutputFormat::Json).expect("b");
        assert_eq!(a, b);
    }
}
