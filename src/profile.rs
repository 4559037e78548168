//! In-memory profile model consumed by the analyzers.
//!
//! Mirrors the sampled-stack shape of a Go pprof profile: an ordered list of
//! sample-type columns and a list of samples whose `value` vectors are
//! index-aligned with those columns. Locations are ordered top of stack
//! first. The binary pprof encoding is decoded elsewhere; profiles arrive
//! here as JSON documents.

use serde::{Deserialize, Serialize};

use std::path::Path;
use std::str::FromStr;

use crate::{LensError, LensResult};

/// Aggregation key used when a sample carries no named function.
pub const UNKNOWN_FUNCTION: &str = "unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub sample_type: Vec<ValueType>,
    #[serde(default)]
    pub sample: Vec<Sample>,
    /// Collection time in nanoseconds since the Unix epoch; zero when unknown.
    #[serde(default)]
    pub time_nanos: i64,
    #[serde(default)]
    pub duration_nanos: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueType {
    #[serde(rename = "type")]
    pub name: String,
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(default)]
    pub value: Vec<i64>,
    #[serde(default)]
    pub location: Vec<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Inlined frames; the first entry is the innermost call.
    #[serde(default)]
    pub line: Vec<Line>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    #[serde(default)]
    pub function: Option<Function>,
    #[serde(default)]
    pub line: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub filename: String,
}

impl ValueType {
    pub fn new(name: &str, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
        }
    }
}

impl Sample {
    /// Builds a sample whose stack lists `frames` top of stack first.
    pub fn new(value: Vec<i64>, frames: &[&str]) -> Self {
        Self {
            value,
            location: frames
                .iter()
                .map(|name| Location {
                    line: vec![Line {
                        function: Some(Function {
                            name: (*name).to_string(),
                            filename: String::new(),
                        }),
                        line: 0,
                    }],
                })
                .collect(),
        }
    }

    /// Name of the top-of-stack function: first frame with a function in the
    /// first location, or [`UNKNOWN_FUNCTION`].
    pub fn leaf_function(&self) -> &str {
        self.location
            .first()
            .and_then(Location::first_function)
            .unwrap_or(UNKNOWN_FUNCTION)
    }

    /// First frame with a function found walking the stack from the top.
    /// Stands in for an allocation type in heap time series, which carry no type names.
    pub fn allocation_site(&self) -> &str {
        self.location
            .iter()
            .find_map(Location::first_function)
            .unwrap_or(UNKNOWN_FUNCTION)
    }

    pub fn value_at(&self, index: usize) -> Option<i64> {
        self.value.get(index).copied()
    }
}

impl Location {
    /// An unnamed function still claims the frame; it reads as [`UNKNOWN_FUNCTION`].
    fn first_function(&self) -> Option<&str> {
        self.line
            .iter()
            .find_map(|l| l.function.as_ref())
            .map(|f| match f.name.as_str() {
                "" => UNKNOWN_FUNCTION,
                name => name,
            })
    }
}

impl Profile {
    pub fn new(sample_type: Vec<ValueType>) -> Self {
        Self {
            sample_type,
            ..Self::default()
        }
    }

    pub fn with_sample(mut self, value: Vec<i64>, frames: &[&str]) -> Self {
        self.sample.push(Sample::new(value, frames));
        self
    }

    /// Index of the first column named `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.sample_type.iter().position(|st| st.name == name)
    }

    pub fn from_json_slice(bytes: &[u8], origin: &str) -> LensResult<Self> {
        serde_json::from_slice(bytes).map_err(|source| LensError::Parse {
            origin: origin.to_string(),
            source,
        })
    }

    pub fn read_json(path: &Path) -> LensResult<Self> {
        let bytes = std::fs::read(path).map_err(|source| LensError::FileNotFound {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_slice(&bytes, &path.display().to_string())
    }

    pub fn write_json(&self, path: &Path) -> LensResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Cpu,
    Heap,
    Goroutine,
    Allocs,
    Mutex,
    Block,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 6] = [
        Self::Cpu,
        Self::Heap,
        Self::Goroutine,
        Self::Allocs,
        Self::Mutex,
        Self::Block,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Heap => "heap",
            Self::Goroutine => "goroutine",
            Self::Allocs => "allocs",
            Self::Mutex => "mutex",
            Self::Block => "block",
        }
    }

    /// Display name used in report headings.
    pub fn title(self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Heap => "Heap",
            Self::Goroutine => "Goroutine",
            Self::Allocs => "Allocs",
            Self::Mutex => "Mutex",
            Self::Block => "Block",
        }
    }
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| LensError::UnsupportedProfileType(s.to_string()))
    }
}

impl clap::ValueEnum for ProfileKind {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}
