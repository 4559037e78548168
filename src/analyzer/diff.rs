//! Differential comparison of two profiles of the same kind.

use serde::Serialize;

use std::collections::{BTreeSet, HashMap};

use crate::analyzer::columns::resolve_diff_column;
use crate::render::OutputFormat;
use crate::units::ValueUnit;
use crate::{LensError, LensResult, Profile, ProfileKind, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffClass {
    Added,
    Removed,
    Improved,
    Regressed,
    Unchanged,
}

impl DiffClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Improved => "improved",
            Self::Regressed => "regressed",
            Self::Unchanged => "unchanged",
        }
    }
}

/// One function's value in both profiles; delta, percentage and class are
/// derived on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub function_name: String,
    pub baseline_value: i64,
    pub target_value: i64,
}

impl DiffEntry {
    pub fn delta(&self) -> i64 {
        self.target_value.saturating_sub(self.baseline_value)
    }

    /// Change relative to the baseline. A function new in the target counts
    /// as +100%.
    pub fn percent(&self) -> f64 {
        if self.baseline_value > 0 {
            self.delta() as f64 / self.baseline_value as f64 * 100.0
        } else if self.target_value > 0 {
            100.0
        } else {
            0.0
        }
    }

    pub fn class(&self) -> DiffClass {
        if self.baseline_value == 0 && self.target_value > 0 {
            DiffClass::Added
        } else if self.target_value == 0 && self.baseline_value > 0 {
            DiffClass::Removed
        } else if self.delta() < 0 {
            DiffClass::Improved
        } else if self.delta() > 0 {
            DiffClass::Regressed
        } else {
            DiffClass::Unchanged
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub baseline_total: i64,
    pub target_total: i64,
    pub total_diff: i64,
    pub total_diff_percent: f64,
    pub improved_funcs: usize,
    pub regressed_funcs: usize,
    pub added_funcs: usize,
    pub removed_funcs: usize,
}

impl DiffSummary {
    fn from_entries(entries: &[DiffEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            summary.baseline_total = summary.baseline_total.saturating_add(entry.baseline_value);
            summary.target_total = summary.target_total.saturating_add(entry.target_value);
            match entry.class() {
                DiffClass::Added => summary.added_funcs += 1,
                DiffClass::Removed => summary.removed_funcs += 1,
                DiffClass::Improved => summary.improved_funcs += 1,
                DiffClass::Regressed => summary.regressed_funcs += 1,
                DiffClass::Unchanged => {}
            }
        }
        summary.total_diff = summary.target_total.saturating_sub(summary.baseline_total);
        if summary.baseline_total > 0 {
            summary.total_diff_percent =
                summary.total_diff as f64 / summary.baseline_total as f64 * 100.0;
        }
        summary
    }
}

#[derive(Debug, Clone)]
pub struct DiffReport {
    pub kind: ProfileKind,
    pub baseline_uri: String,
    pub target_uri: String,
    pub top_n: usize,
    pub unit: ValueUnit,
    /// Every function seen in either profile, largest relative change first.
    pub entries: Vec<DiffEntry>,
    pub summary: DiffSummary,
}

impl DiffReport {
    pub fn rows(&self) -> &[DiffEntry] {
        &self.entries[..self.top_n.min(self.entries.len())]
    }
}

#[derive(Debug, Clone)]
pub struct ProfileComparator {
    kind: ProfileKind,
    baseline_uri: String,
    target_uri: String,
}

impl ProfileComparator {
    pub fn new(kind: ProfileKind) -> Self {
        Self {
            kind,
            baseline_uri: "baseline".to_string(),
            target_uri: "target".to_string(),
        }
    }

    /// Source names recorded in the report instead of "baseline"/"target".
    pub fn with_sources(mut self, baseline_uri: &str, target_uri: &str) -> Self {
        self.baseline_uri = baseline_uri.to_string();
        self.target_uri = target_uri.to_string();
        self
    }

    pub fn diff(&self, baseline: &Profile, target: &Profile, top_n: usize) -> LensResult<DiffReport> {
        let index = resolve_diff_column(baseline, self.kind)?;
        let column = ensure_matching_column(baseline, target, index)?;

        let entries = diff_entries(
            &sum_by_leaf_function(baseline, index),
            &sum_by_leaf_function(target, index),
        );
        let summary = DiffSummary::from_entries(&entries);
        Ok(DiffReport {
            kind: self.kind,
            baseline_uri: self.baseline_uri.clone(),
            target_uri: self.target_uri.clone(),
            top_n,
            unit: ValueUnit::from_unit(&column.unit),
            entries,
            summary,
        })
    }

    pub fn compare(
        &self,
        baseline: &Profile,
        target: &Profile,
        top_n: usize,
        format: OutputFormat,
    ) -> LensResult<String> {
        let report = self.diff(baseline, target, top_n)?;
        format.renderer().diff(&report)
    }
}

pub fn compare_profiles(
    baseline: &Profile,
    target: &Profile,
    kind: ProfileKind,
    top_n: usize,
    format: OutputFormat,
) -> LensResult<String> {
    ProfileComparator::new(kind).compare(baseline, target, top_n, format)
}

/// The baseline's column `index`, provided the target declares the same
/// type and unit there.
pub(crate) fn ensure_matching_column<'a>(
    baseline: &'a Profile,
    target: &Profile,
    index: usize,
) -> LensResult<&'a ValueType> {
    let column = &baseline.sample_type[index];
    if target.sample_type.get(index) == Some(column) {
        return Ok(column);
    }
    Err(LensError::SchemaMismatch(format!(
        "baseline column {index} is {}/{} but target declares {}",
        column.name,
        column.unit,
        target
            .sample_type
            .get(index)
            .map(|st| format!("{}/{}", st.name, st.unit))
            .unwrap_or_else(|| "no such column".to_string())
    )))
}

/// Per-function sum of one column, keyed by top-of-stack function.
pub(crate) fn sum_by_leaf_function(profile: &Profile, index: usize) -> HashMap<&str, i64> {
    let mut out = HashMap::<&str, i64>::new();
    for sample in &profile.sample {
        if sample.location.is_empty() {
            continue;
        }
        let Some(value) = sample.value_at(index) else {
            continue;
        };
        let slot = out.entry(sample.leaf_function()).or_insert(0);
        *slot = slot.saturating_add(value);
    }
    out
}

pub(crate) fn diff_entries(baseline: &HashMap<&str, i64>, target: &HashMap<&str, i64>) -> Vec<DiffEntry> {
    let names = baseline
        .keys()
        .chain(target.keys())
        .copied()
        .collect::<BTreeSet<_>>();
    let mut entries = names
        .into_iter()
        .map(|name| DiffEntry {
            function_name: name.to_string(),
            baseline_value: baseline.get(name).copied().unwrap_or(0),
            target_value: target.get(name).copied().unwrap_or(0),
        })
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| {
        b.percent()
            .abs()
            .total_cmp(&a.percent().abs())
            .then_with(|| a.function_name.cmp(&b.function_name))
    });
    entries
}
