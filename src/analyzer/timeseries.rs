//! Heap growth across an ordered series of snapshots.
//!
//! Consecutive snapshots are assumed to be one minute apart; growth rates are
//! reported in MB per minute. Allocation sites (the first named function on a
//! sample's stack) stand in for object types.

use serde::Serialize;
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

use std::collections::BTreeMap;

use crate::render::OutputFormat;
use crate::{LensError, LensResult, Profile};

pub const MIN_SERIES_POINTS: usize = 3;
/// Rows shown in the trend table, independent of any top-N setting.
pub const MAX_RENDERED_TRENDS: usize = 10;
/// Growth beyond this many percent, either way, is a trend.
pub const TREND_THRESHOLD_PCT: f64 = 10.0;

const MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Stable,
    Decreasing,
}

impl TrendDirection {
    fn classify(growth_percent: f64) -> Self {
        if growth_percent > TREND_THRESHOLD_PCT {
            Self::Increasing
        } else if growth_percent < -TREND_THRESHOLD_PCT {
            Self::Decreasing
        } else {
            Self::Stable
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Stable => "stable",
            Self::Decreasing => "decreasing",
        }
    }
}

/// Heap totals for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub timestamp: String,
    pub label: String,
    pub total_bytes: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_objects: i64,
    #[serde(skip)]
    pub position: usize,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// In-use bytes of one allocation site at every point of the series.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTrend {
    type_name: String,
    values: Vec<i64>,
    growth_bytes: i64,
    growth_percent: f64,
    growth_rate: f64,
    direction: TrendDirection,
}

impl ObjectTrend {
    fn new(type_name: String, values: Vec<i64>) -> Self {
        let first = values.first().copied().unwrap_or(0);
        let last = values.last().copied().unwrap_or(0);
        let growth_bytes = last.saturating_sub(first);
        let growth_percent = if first > 0 {
            growth_bytes as f64 / first as f64 * 100.0
        } else {
            0.0
        };
        let growth_rate = if values.is_empty() {
            0.0
        } else {
            growth_bytes as f64 / values.len() as f64 / MB
        };
        Self {
            type_name,
            values,
            growth_bytes,
            growth_percent,
            growth_rate,
            direction: TrendDirection::classify(growth_percent),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn first_value(&self) -> i64 {
        self.values.first().copied().unwrap_or(0)
    }

    pub fn last_value(&self) -> i64 {
        self.values.last().copied().unwrap_or(0)
    }

    pub fn growth_bytes(&self) -> i64 {
        self.growth_bytes
    }

    /// Zero when the site held nothing at the first point.
    pub fn growth_percent(&self) -> f64 {
        self.growth_percent
    }

    /// MB per minute.
    pub fn growth_rate(&self) -> f64 {
        self.growth_rate
    }

    pub fn direction(&self) -> TrendDirection {
        self.direction
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    pub data_points: usize,
    pub time_span_minutes: f64,
    pub total_growth: i64,
    /// MB per minute.
    pub avg_growth_rate: f64,
    pub growing_objects: usize,
    /// Stable and shrinking sites together.
    pub stable_objects: usize,
}

#[derive(Debug, Clone)]
pub struct SeriesReport {
    pub series: Vec<TrendPoint>,
    /// Fastest relative growth first.
    pub trends: Vec<ObjectTrend>,
    pub summary: SeriesSummary,
}

impl SeriesReport {
    pub fn top_trends(&self) -> &[ObjectTrend] {
        &self.trends[..MAX_RENDERED_TRENDS.min(self.trends.len())]
    }
}

pub fn build_series<S: AsRef<str>>(profiles: &[Profile], labels: &[S]) -> LensResult<SeriesReport> {
    if profiles.len() < MIN_SERIES_POINTS {
        return Err(LensError::InsufficientData {
            required: MIN_SERIES_POINTS,
            actual: profiles.len(),
        });
    }
    if labels.len() != profiles.len() {
        return Err(LensError::LabelMismatch {
            labels: labels.len(),
            profiles: profiles.len(),
        });
    }

    let series = profiles
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(position, (profile, label))| trend_point(profile, label.as_ref(), position))
        .collect::<LensResult<Vec<_>>>()?;

    let mut trends = site_values(profiles)
        .into_iter()
        .map(|(name, values)| ObjectTrend::new(name, values))
        .collect::<Vec<_>>();
    trends.sort_by(|a, b| {
        b.growth_percent
            .total_cmp(&a.growth_percent)
            .then_with(|| a.type_name.cmp(&b.type_name))
    });

    let summary = summarize(&series, &trends);
    Ok(SeriesReport {
        series,
        trends,
        summary,
    })
}

pub fn analyze_heap_time_series<S: AsRef<str>>(
    profiles: &[Profile],
    labels: &[S],
    format: OutputFormat,
) -> LensResult<String> {
    let report = build_series(profiles, labels)?;
    format.renderer().series(&report)
}

fn trend_point(profile: &Profile, label: &str, position: usize) -> LensResult<TrendPoint> {
    let bytes_idx = profile.column("inuse_space");
    let objects_idx = profile.column("inuse_objects");
    let mut total_bytes = 0i64;
    let mut total_objects = 0i64;
    for sample in &profile.sample {
        if let Some(v) = bytes_idx.and_then(|idx| sample.value_at(idx)) {
            total_bytes = total_bytes.saturating_add(v);
        }
        if let Some(v) = objects_idx.and_then(|idx| sample.value_at(idx)) {
            total_objects = total_objects.saturating_add(v);
        }
    }
    Ok(TrendPoint {
        timestamp: point_timestamp(profile.time_nanos, position)?,
        label: label.to_string(),
        total_bytes,
        total_objects,
        position,
    })
}

/// The snapshot's own collection time, or `position` minutes past the epoch
/// when the profile does not record one.
fn point_timestamp(time_nanos: i64, position: usize) -> LensResult<String> {
    let synthetic = || OffsetDateTime::UNIX_EPOCH + Duration::minutes(position as i64);
    let at = if time_nanos != 0 {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(time_nanos)).unwrap_or_else(|_| synthetic())
    } else {
        synthetic()
    };
    at.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .map_err(|err| LensError::InvalidArgument(format!("unprintable timestamp: {err}")))
}

/// Dense per-site byte sequences; a site absent from a snapshot is zero there.
fn site_values(profiles: &[Profile]) -> BTreeMap<String, Vec<i64>> {
    let mut sites = BTreeMap::<String, Vec<i64>>::new();
    for (position, profile) in profiles.iter().enumerate() {
        let Some(idx) = profile.column("inuse_space") else {
            continue;
        };
        for sample in &profile.sample {
            let Some(value) = sample.value_at(idx) else {
                continue;
            };
            let slot = &mut sites
                .entry(sample.allocation_site().to_string())
                .or_insert_with(|| vec![0; profiles.len()])[position];
            *slot = slot.saturating_add(value);
        }
    }
    sites
}

fn summarize(series: &[TrendPoint], trends: &[ObjectTrend]) -> SeriesSummary {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return SeriesSummary::default();
    };
    let time_span_minutes = series.len().saturating_sub(1) as f64;
    let total_growth = last.total_bytes.saturating_sub(first.total_bytes);
    let avg_growth_rate = if time_span_minutes > 0.0 {
        total_growth as f64 / time_span_minutes / MB
    } else {
        0.0
    };
    let growing_objects = trends
        .iter()
        .filter(|t| t.direction == TrendDirection::Increasing)
        .count();
    SeriesSummary {
        data_points: series.len(),
        time_span_minutes,
        total_growth,
        avg_growth_rate,
        growing_objects,
        stable_objects: trends.len() - growing_objects,
    }
}
