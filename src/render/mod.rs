//! Report rendering: one computed report, three interchangeable encodings.

mod json;
mod markdown;
mod text;

use serde::{Deserialize, Serialize};

use crate::analyzer::{DiffReport, HotspotReport, LeakReport, SeriesReport};
use crate::{LensResult, ProfileKind};

pub use json::JsonRenderer;
pub use markdown::MarkdownRenderer;
pub use text::TextRenderer;

/// Turns analyzer results into a printable document.
pub trait ReportRenderer {
    fn hotspots(&self, report: &HotspotReport) -> LensResult<String>;
    fn diff(&self, report: &DiffReport) -> LensResult<String>;
    fn series(&self, report: &SeriesReport) -> LensResult<String>;
    fn leaks(&self, report: &LeakReport) -> LensResult<String>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl OutputFormat {
    /// Unrecognized names render as text.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Self::Markdown,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Json => "json",
        }
    }

    pub fn renderer(self) -> &'static dyn ReportRenderer {
        match self {
            Self::Text => &TextRenderer,
            Self::Markdown => &MarkdownRenderer,
            Self::Json => &JsonRenderer,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl clap::ValueEnum for OutputFormat {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Text, Self::Markdown, Self::Json]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Text => clap::builder::PossibleValue::new("text"),
            Self::Markdown => clap::builder::PossibleValue::new("markdown").alias("md"),
            Self::Json => clap::builder::PossibleValue::new("json"),
        })
    }
}

/// Labels, JSON keys and advisory notes for one profile kind's hotspot report.
pub(crate) struct HotspotVocabulary {
    pub section: &'static str,
    pub total_count_label: &'static str,
    pub total_value_label: &'static str,
    pub count_header: &'static str,
    pub value_header: &'static str,
    pub avg_header: &'static str,
    pub array_key: &'static str,
    pub total_count_key: &'static str,
    pub total_value_key: &'static str,
    pub total_value_fmt_key: &'static str,
    pub count_key: &'static str,
    pub count_pct_key: &'static str,
    pub value_key: &'static str,
    pub value_fmt_key: &'static str,
    pub value_pct_key: &'static str,
    pub avg_key: &'static str,
    pub avg_fmt_key: &'static str,
    pub notes: &'static [&'static str],
}

const CONTENTION_KEYS: HotspotVocabulary = HotspotVocabulary {
    section: "Top Blocking Sites",
    total_count_label: "Total contentions",
    total_value_label: "Total delay",
    count_header: "Contentions",
    value_header: "Delay",
    avg_header: "Avg Delay",
    array_key: "blocks",
    total_count_key: "totalContentions",
    total_value_key: "totalDelayNanos",
    total_value_fmt_key: "totalDelayFormatted",
    count_key: "contentions",
    count_pct_key: "contentionsPct",
    value_key: "delayNanos",
    value_fmt_key: "delayFormatted",
    value_pct_key: "delayPct",
    avg_key: "avgDelayNanos",
    avg_fmt_key: "avgDelayFormatted",
    notes: &[],
};

const BLOCK: HotspotVocabulary = HotspotVocabulary {
    notes: &[
        "Functions with the longest total delay are usually channel operations, network I/O or syscalls.",
        "Many contentions with little delay point at frequent short waits, such as unbuffered channel handoffs.",
        "Buffered channels, timeouts or asynchronous hand-off can reduce blocking.",
        "Check for goroutine leaks that exhaust shared resources.",
    ],
    ..CONTENTION_KEYS
};

const MUTEX: HotspotVocabulary = HotspotVocabulary {
    section: "Top Mutex Contention Points",
    array_key: "contentions",
    notes: &[
        "Functions with the longest total delay are the main lock bottlenecks.",
        "Many contentions with little delay suggest a lock that is taken and released too often.",
        "Finer-grained locks, sync.RWMutex or lock-free structures can reduce contention.",
    ],
    ..CONTENTION_KEYS
};

const CPU: HotspotVocabulary = HotspotVocabulary {
    section: "Top CPU Consumers",
    total_count_label: "Total samples",
    total_value_label: "Total CPU time",
    count_header: "Samples",
    value_header: "CPU Time",
    avg_header: "Per Sample",
    array_key: "functions",
    total_count_key: "totalSamples",
    total_value_key: "totalCpuNanos",
    total_value_fmt_key: "totalCpuFormatted",
    count_key: "samples",
    count_pct_key: "samplesPct",
    value_key: "cpuNanos",
    value_fmt_key: "cpuFormatted",
    value_pct_key: "cpuPct",
    avg_key: "avgCpuNanos",
    avg_fmt_key: "avgCpuFormatted",
    notes: &[
        "Start with the functions holding the largest share of CPU time.",
        "runtime.mallocgc or runtime.gcBgMarkWorker near the top points at allocation pressure.",
    ],
};

const MEMORY_KEYS: HotspotVocabulary = HotspotVocabulary {
    section: "Top In-Use Allocation Sites",
    total_count_label: "Total objects",
    total_value_label: "Total in-use",
    count_header: "Objects",
    value_header: "Bytes",
    avg_header: "Avg Size",
    array_key: "allocations",
    total_count_key: "totalObjects",
    total_value_key: "totalBytes",
    total_value_fmt_key: "totalBytesFormatted",
    count_key: "objects",
    count_pct_key: "objectsPct",
    value_key: "bytes",
    value_fmt_key: "bytesFormatted",
    value_pct_key: "bytesPct",
    avg_key: "avgBytes",
    avg_fmt_key: "avgBytesFormatted",
    notes: &[],
};

const HEAP: HotspotVocabulary = HotspotVocabulary {
    notes: &[
        "Large in-use sites that keep growing between snapshots are leak candidates.",
        "Diff two snapshots to confirm growth before optimizing.",
    ],
    ..MEMORY_KEYS
};

const ALLOCS: HotspotVocabulary = HotspotVocabulary {
    section: "Top Allocation Sites",
    total_value_label: "Total allocated",
    notes: &[
        "High allocation volume raises GC cost even when memory is released promptly.",
        "Reusing buffers (sync.Pool) on hot paths cuts allocation volume.",
    ],
    ..MEMORY_KEYS
};

const GOROUTINE: HotspotVocabulary = HotspotVocabulary {
    section: "Top Goroutine Stacks",
    total_count_label: "Total samples",
    total_value_label: "Total goroutines",
    count_header: "Samples",
    value_header: "Goroutines",
    avg_header: "Avg",
    array_key: "functions",
    total_count_key: "totalSamples",
    total_value_key: "totalGoroutines",
    total_value_fmt_key: "totalGoroutinesFormatted",
    count_key: "samples",
    count_pct_key: "samplesPct",
    value_key: "goroutines",
    value_fmt_key: "goroutinesFormatted",
    value_pct_key: "goroutinesPct",
    avg_key: "avgGoroutines",
    avg_fmt_key: "avgGoroutinesFormatted",
    notes: &[
        "Many goroutines parked in the same function can indicate a leak.",
        "Make sure blocked goroutines can exit through context cancellation or timeouts.",
    ],
};

pub(crate) fn vocabulary(kind: ProfileKind) -> &'static HotspotVocabulary {
    match kind {
        ProfileKind::Block => &BLOCK,
        ProfileKind::Mutex => &MUTEX,
        ProfileKind::Cpu => &CPU,
        ProfileKind::Heap => &HEAP,
        ProfileKind::Allocs => &ALLOCS,
        ProfileKind::Goroutine => &GOROUTINE,
    }
}

pub(crate) fn report_title(kind: ProfileKind) -> String {
    format!("{} Profile Analysis", kind.title())
}

pub(crate) const DIFF_NOTES: &[&str] = &[
    "regressed: the target spends more than the baseline",
    "improved: the target spends less than the baseline",
    "added: only present in the target (counted as +100%)",
    "removed: only present in the baseline",
];

pub(crate) const SERIES_NOTES: &[&str] = &[
    "Sites with high, steady growth across every snapshot are the first leak suspects.",
    "Growth that flattens out usually means a cache or pool reached its working size.",
    "Optimize sites that allocate heavily even when they do not grow.",
];

pub(crate) const LEAK_NOTES: &[&str] = &[
    "Only sites whose in-use bytes grew between the two snapshots are listed.",
    "Take the target snapshot under the same load as the baseline to avoid false positives.",
    "Confirm a suspect with a series of three or more snapshots before fixing it.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_format_names_fall_back_to_text() {
        assert_eq!(OutputFormat::from_name("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_name("Markdown"), OutputFormat::Markdown);
        assert_eq!(OutputFormat::from_name("md"), OutputFormat::Markdown);
        assert_eq!(OutputFormat::from_name("yaml"), OutputFormat::Text);
        assert_eq!(OutputFormat::from_name(""), OutputFormat::Text);
    }

    #[test]
    fn every_kind_has_notes_and_array_key() {
        for kind in ProfileKind::ALL {
            let vocab = vocabulary(kind);
            assert!(!vocab.notes.is_empty(), "{kind} has no notes");
            assert!(!vocab.array_key.is_empty());
        }
        assert_eq!(vocabulary(ProfileKind::Mutex).array_key, "contentions");
        assert_eq!(vocabulary(ProfileKind::Block).array_key, "blocks");
    }
}
