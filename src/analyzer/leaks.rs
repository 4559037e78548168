//! Leak suspects from two heap snapshots: functions whose in-use bytes grew.

use serde::Serialize;

use crate::analyzer::diff::{DiffClass, DiffEntry, diff_entries, ensure_matching_column, sum_by_leaf_function};
use crate::render::OutputFormat;
use crate::{LensError, LensResult, Profile};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakSummary {
    pub baseline_total: i64,
    pub target_total: i64,
    pub total_growth: i64,
    pub suspect_count: usize,
    pub suspect_growth: i64,
    pub new_sites: usize,
}

#[derive(Debug, Clone)]
pub struct LeakReport {
    pub baseline_uri: String,
    pub target_uri: String,
    pub top_n: usize,
    pub min_growth_bytes: i64,
    /// Growing functions, most bytes gained first.
    pub suspects: Vec<DiffEntry>,
    pub summary: LeakSummary,
}

impl LeakReport {
    pub fn rows(&self) -> &[DiffEntry] {
        &self.suspects[..self.top_n.min(self.suspects.len())]
    }
}

#[derive(Debug, Clone)]
pub struct LeakDetector {
    baseline_uri: String,
    target_uri: String,
    min_growth_bytes: i64,
}

impl Default for LeakDetector {
    fn default() -> Self {
        Self {
            baseline_uri: "baseline".to_string(),
            target_uri: "target".to_string(),
            min_growth_bytes: 0,
        }
    }
}

impl LeakDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources(mut self, baseline_uri: &str, target_uri: &str) -> Self {
        self.baseline_uri = baseline_uri.to_string();
        self.target_uri = target_uri.to_string();
        self
    }

    /// Functions that grew by less than `bytes` are not reported.
    pub fn with_min_growth(mut self, bytes: i64) -> Self {
        self.min_growth_bytes = bytes.max(0);
        self
    }

    pub fn scan(&self, baseline: &Profile, target: &Profile, top_n: usize) -> LensResult<LeakReport> {
        let index = baseline
            .column("inuse_space")
            .ok_or_else(|| LensError::MissingSampleType("inuse_space".to_string()))?;
        ensure_matching_column(baseline, target, index)?;

        let before = sum_by_leaf_function(baseline, index);
        let after = sum_by_leaf_function(target, index);
        let mut summary = LeakSummary {
            baseline_total: saturating_total(before.values().copied()),
            target_total: saturating_total(after.values().copied()),
            ..LeakSummary::default()
        };
        summary.total_growth = summary.target_total.saturating_sub(summary.baseline_total);

        let mut suspects = diff_entries(&before, &after)
            .into_iter()
            .filter(|e| e.delta() > 0 && e.delta() >= self.min_growth_bytes)
            .collect::<Vec<_>>();
        suspects.sort_by(|a, b| {
            b.delta()
                .cmp(&a.delta())
                .then_with(|| a.function_name.cmp(&b.function_name))
        });

        summary.suspect_count = suspects.len();
        summary.suspect_growth = saturating_total(suspects.iter().map(DiffEntry::delta));
        summary.new_sites = suspects
            .iter()
            .filter(|e| e.class() == DiffClass::Added)
            .count();

        Ok(LeakReport {
            baseline_uri: self.baseline_uri.clone(),
            target_uri: self.target_uri.clone(),
            top_n,
            min_growth_bytes: self.min_growth_bytes,
            suspects,
            summary,
        })
    }

    pub fn detect(
        &self,
        baseline: &Profile,
        target: &Profile,
        top_n: usize,
        format: OutputFormat,
    ) -> LensResult<String> {
        let report = self.scan(baseline, target, top_n)?;
        format.renderer().leaks(&report)
    }
}

fn saturating_total(values: impl Iterator<Item = i64>) -> i64 {
    values.fold(0, i64::saturating_add)
}

pub fn detect_memory_leaks(
    baseline: &Profile,
    target: &Profile,
    top_n: usize,
    format: OutputFormat,
) -> LensResult<String> {
    LeakDetector::new().detect(baseline, target, top_n, format)
}
