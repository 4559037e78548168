//! JSON encoding. Every ranked list is emitted in full; `topN` is metadata.

use serde::Serialize;
use serde::ser::{SerializeMap as _, Serializer};

use crate::analyzer::{
    DiffClass, DiffReport, DiffSummary, FunctionStat, HotspotReport, LeakReport, LeakSummary, SeriesReport,
    SeriesSummary, TrendDirection, TrendPoint,
};
use crate::render::{HotspotVocabulary, ReportRenderer, vocabulary};
use crate::units::{ValueUnit, format_bytes};
use crate::LensResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn hotspots(&self, report: &HotspotReport) -> LensResult<String> {
        let doc = HotspotDocument {
            report,
            vocab: vocabulary(report.kind),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    fn diff(&self, report: &DiffReport) -> LensResult<String> {
        let unit = report.unit;
        let doc = DiffDocument {
            profile_type: report.kind.as_str(),
            baseline_uri: &report.baseline_uri,
            target_uri: &report.target_uri,
            top_n: report.top_n,
            functions: report
                .entries
                .iter()
                .map(|e| DiffRow {
                    function_name: &e.function_name,
                    baseline_value: e.baseline_value,
                    target_value: e.target_value,
                    diff_value: e.delta(),
                    diff_percentage: e.percent(),
                    baseline_formatted: unit.format(e.baseline_value),
                    target_formatted: unit.format(e.target_value),
                    diff_formatted: unit.format_delta(e.delta()),
                    status: e.class(),
                })
                .collect(),
            summary: &report.summary,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    fn series(&self, report: &SeriesReport) -> LensResult<String> {
        let doc = SeriesDocument {
            profile_type: "heap",
            series: &report.series,
            trends: report
                .trends
                .iter()
                .map(|t| TrendRow {
                    type_name: t.type_name(),
                    values: t.values(),
                    formatted_values: t.values().iter().map(|v| format_bytes(*v)).collect(),
                    growth_bytes: t.growth_bytes(),
                    growth_percent: t.growth_percent(),
                    growth_rate: t.growth_rate(),
                    trend_direction: t.direction(),
                })
                .collect(),
            summary: &report.summary,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    fn leaks(&self, report: &LeakReport) -> LensResult<String> {
        let doc = LeakDocument {
            profile_type: "heap",
            baseline_uri: &report.baseline_uri,
            target_uri: &report.target_uri,
            top_n: report.top_n,
            min_growth_bytes: report.min_growth_bytes,
            suspects: report
                .suspects
                .iter()
                .map(|e| LeakRow {
                    function_name: &e.function_name,
                    baseline_bytes: e.baseline_value,
                    target_bytes: e.target_value,
                    growth_bytes: e.delta(),
                    growth_percent: e.percent(),
                    growth_formatted: ValueUnit::Bytes.format_delta(e.delta()),
                    status: e.class(),
                })
                .collect(),
            summary: &report.summary,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

/// Hotspot keys vary by profile kind, so the document is written by hand
/// with a fixed key order.
struct HotspotDocument<'a> {
    report: &'a HotspotReport,
    vocab: &'static HotspotVocabulary,
}

impl Serialize for HotspotDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let r = self.report;
        let v = self.vocab;
        let unit = r.columns.unit;
        let has_count = r.columns.has_count();

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("profileType", r.kind.as_str())?;
        if has_count {
            map.serialize_entry(v.total_count_key, &r.total_count)?;
        }
        map.serialize_entry(v.total_value_key, &r.total_value)?;
        map.serialize_entry(v.total_value_fmt_key, &unit.format(r.total_value))?;
        map.serialize_entry("topN", &r.top_n)?;
        let rows = r
            .stats
            .iter()
            .map(|stat| StatRow {
                stat,
                vocab: v,
                unit,
                has_count,
            })
            .collect::<Vec<_>>();
        map.serialize_entry(v.array_key, &rows)?;
        map.end()
    }
}

struct StatRow<'a> {
    stat: &'a FunctionStat,
    vocab: &'static HotspotVocabulary,
    unit: ValueUnit,
    has_count: bool,
}

impl Serialize for StatRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (s, v) = (self.stat, self.vocab);
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("functionName", s.function_name())?;
        if self.has_count {
            map.serialize_entry(v.count_key, &s.count())?;
        }
        map.serialize_entry(v.value_key, &s.value())?;
        map.serialize_entry(v.value_fmt_key, &self.unit.format(s.value()))?;
        if self.has_count {
            map.serialize_entry(v.count_pct_key, &s.count_pct())?;
        }
        map.serialize_entry(v.value_pct_key, &s.value_pct())?;
        if self.has_count {
            map.serialize_entry(v.avg_key, &s.avg_value())?;
            map.serialize_entry(v.avg_fmt_key, &self.unit.format(s.avg_value()))?;
        }
        map.end()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiffDocument<'a> {
    profile_type: &'static str,
    baseline_uri: &'a str,
    target_uri: &'a str,
    #[serde(rename = "topN")]
    top_n: usize,
    functions: Vec<DiffRow<'a>>,
    summary: &'a DiffSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiffRow<'a> {
    function_name: &'a str,
    baseline_value: i64,
    target_value: i64,
    diff_value: i64,
    diff_percentage: f64,
    baseline_formatted: String,
    target_formatted: String,
    diff_formatted: String,
    status: DiffClass,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SeriesDocument<'a> {
    profile_type: &'static str,
    series: &'a [TrendPoint],
    trends: Vec<TrendRow<'a>>,
    summary: &'a SeriesSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrendRow<'a> {
    type_name: &'a str,
    values: &'a [i64],
    formatted_values: Vec<String>,
    growth_bytes: i64,
    growth_percent: f64,
    growth_rate: f64,
    trend_direction: TrendDirection,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LeakDocument<'a> {
    profile_type: &'static str,
    baseline_uri: &'a str,
    target_uri: &'a str,
    #[serde(rename = "topN")]
    top_n: usize,
    min_growth_bytes: i64,
    suspects: Vec<LeakRow<'a>>,
    summary: &'a LeakSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LeakRow<'a> {
    function_name: &'a str,
    baseline_bytes: i64,
    target_bytes: i64,
    growth_bytes: i64,
    growth_percent: f64,
    growth_formatted: String,
    status: DiffClass,
}
