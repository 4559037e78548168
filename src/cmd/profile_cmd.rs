//! Profile analysis commands (`pprof-lens analyze|compare|series|leaks`).

use clap::Subcommand;

use std::path::Path;

use crate::analyzer::{LeakDetector, ProfileComparator, analyze_heap_time_series, analyze_profile};
use crate::source::{ProfileLoader, ProfileSource};
use crate::{Config, LensError, LensResult, OutputFormat, Profile, ProfileKind, find_profile_files};

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Rank the hottest functions of a single profile
    Analyze {
        #[arg(value_name = "URI")]
        uri: String,
        #[arg(long = "type", value_name = "KIND")]
        kind: ProfileKind,
        #[arg(long)]
        top: Option<usize>,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Diff a target profile against a baseline of the same kind
    Compare {
        #[arg(value_name = "BASELINE")]
        baseline: String,
        #[arg(value_name = "TARGET")]
        target: String,
        #[arg(long = "type", value_name = "KIND")]
        kind: ProfileKind,
        #[arg(long)]
        top: Option<usize>,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// Track heap growth across three or more snapshots, oldest first
    Series {
        #[arg(value_name = "URI")]
        uris: Vec<String>,
        /// Add every file under the working directory matching this glob (sorted by path)
        #[arg(long)]
        glob: Vec<String>,
        /// One label per snapshot; defaults to file names
        #[arg(long = "label", value_name = "LABEL")]
        labels: Vec<String>,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
    /// List functions whose in-use heap grew between two snapshots
    Leaks {
        #[arg(value_name = "BASELINE")]
        baseline: String,
        #[arg(value_name = "TARGET")]
        target: String,
        #[arg(long)]
        top: Option<usize>,
        #[arg(long, value_name = "BYTES")]
        min_bytes: Option<i64>,
        #[arg(long)]
        format: Option<OutputFormat>,
    },
}

pub fn profile_command(config: &Config, command: &ProfileCommand) -> LensResult<String> {
    profile_command_in(config, command, Path::new("."))
}

/// Like [`profile_command`], with `--glob` patterns resolved under `root`.
pub fn profile_command_in(config: &Config, command: &ProfileCommand, root: &Path) -> LensResult<String> {
    let loader = ProfileLoader::from_config(config);
    match command {
        ProfileCommand::Analyze {
            uri,
            kind,
            top,
            format,
        } => {
            let top_n = config.effective_top_n(*top);
            let format = format.unwrap_or(config.format);
            let profile = load(&loader, uri)?;
            tracing::info!(%kind, %format, top_n, samples = profile.sample.len(), "analyzing profile");
            let out = analyze_profile(&profile, *kind, top_n, format)?;
            tracing::debug!(bytes = out.len(), "report rendered");
            Ok(out)
        }
        ProfileCommand::Compare {
            baseline,
            target,
            kind,
            top,
            format,
        } => {
            let top_n = config.effective_top_n(*top);
            let format = format.unwrap_or(config.format);
            let before = load(&loader, baseline)?;
            let after = load(&loader, target)?;
            tracing::info!(%kind, %format, top_n, "comparing profiles");
            let out = ProfileComparator::new(*kind)
                .with_sources(baseline, target)
                .compare(&before, &after, top_n, format)?;
            tracing::debug!(bytes = out.len(), "report rendered");
            Ok(out)
        }
        ProfileCommand::Series {
            uris,
            glob,
            labels,
            format,
        } => {
            let format = format.unwrap_or(config.format);
            let inputs = series_inputs(uris, glob, root)?;
            let labels = if labels.is_empty() {
                inputs
                    .iter()
                    .map(|uri| ProfileSource::parse(uri).map(|s| s.default_label()))
                    .collect::<LensResult<Vec<_>>>()?
            } else {
                labels.clone()
            };
            let profiles = inputs
                .iter()
                .map(|uri| load(&loader, uri))
                .collect::<LensResult<Vec<_>>>()?;
            tracing::info!(points = profiles.len(), %format, "analyzing heap time series");
            let out = analyze_heap_time_series(&profiles, &labels, format)?;
            tracing::debug!(bytes = out.len(), "report rendered");
            Ok(out)
        }
        ProfileCommand::Leaks {
            baseline,
            target,
            top,
            min_bytes,
            format,
        } => {
            let top_n = config.effective_top_n(*top);
            let format = format.unwrap_or(config.format);
            let min_bytes = min_bytes.unwrap_or(config.min_leak_bytes);
            if min_bytes < 0 {
                return Err(LensError::InvalidArgument(format!(
                    "--min-bytes must not be negative (got {min_bytes})"
                )));
            }
            let before = load(&loader, baseline)?;
            let after = load(&loader, target)?;
            tracing::info!(%format, top_n, min_bytes, "scanning heap snapshots for leaks");
            let out = LeakDetector::new()
                .with_sources(baseline, target)
                .with_min_growth(min_bytes)
                .detect(&before, &after, top_n, format)?;
            tracing::debug!(bytes = out.len(), "report rendered");
            Ok(out)
        }
    }
}

fn load(loader: &ProfileLoader, uri: &str) -> LensResult<Profile> {
    tracing::debug!(uri, "loading profile");
    loader.load(uri)
}

/// Explicit URIs first, then glob matches in path order.
fn series_inputs(uris: &[String], globs: &[String], root: &Path) -> LensResult<Vec<String>> {
    let mut inputs = uris.to_vec();
    if !globs.is_empty() {
        let matched = find_profile_files(root, globs)?;
        if matched.is_empty() {
            tracing::warn!(patterns = ?globs, "glob matched no files");
        }
        inputs.extend(matched.iter().map(|p| p.display().to_string()));
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueType;

    use std::path::PathBuf;

    fn temp_workspace(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pprof-lens-cmd-{name}-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("workspace");
        dir
    }

    fn heap(sites: &[(i64, &str)]) -> Profile {
        sites.iter().fold(
            Profile::new(vec![
                ValueType::new("inuse_objects", "count"),
                ValueType::new("inuse_space", "bytes"),
            ]),
            |p, (bytes, name)| p.with_sample(vec![1, *bytes], &[*name]),
        )
    }

    fn write(ws: &Path, name: &str, profile: &Profile) -> String {
        let path = ws.join(name);
        profile.write_json(&path).expect("write profile");
        path.display().to_string()
    }

    #[test]
    fn analyze_uses_config_defaults() {
        let ws = temp_workspace("analyze");
        let uri = write(
            &ws,
            "block.json",
            &Profile::new(vec![
                ValueType::new("contentions", "count"),
                ValueType::new("delay", "nanoseconds"),
            ])
            .with_sample(vec![200, 100_000_000], &["main.channelReceive"])
            .with_sample(vec![80, 40_000_000], &["main.networkCall"]),
        );
        let cfg = Config {
            top_n: 1,
            format: OutputFormat::Markdown,
            ..Config::default()
        };
        let cmd = ProfileCommand::Analyze {
            uri,
            kind: ProfileKind::Block,
            top: None,
            format: None,
        };
        let out = profile_command(&cfg, &cmd).expect("analyze");
        assert!(out.starts_with("# Block Profile Analysis"), "got:\n{out}");
        assert!(out.contains("main.channelReceive"));
        assert!(!out.contains("main.networkCall"));
    }

    #[test]
    fn compare_records_source_uris() {
        let ws = temp_workspace("compare");
        let base = write(&ws, "v1.json", &heap(&[(1024, "main.a")]));
        let target = write(&ws, "v2.json", &heap(&[(4096, "main.a")]));
        let cmd = ProfileCommand::Compare {
            baseline: base.clone(),
            target: target.clone(),
            kind: ProfileKind::Heap,
            top: Some(5),
            format: Some(OutputFormat::Json),
        };
        let out = profile_command(&Config::default(), &cmd).expect("compare");
        let doc: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(doc["baselineUri"], base.as_str());
        assert_eq!(doc["targetUri"], target.as_str());
        assert_eq!(doc["functions"][0]["diffValue"], 3072);
    }

    #[test]
    fn series_expands_glob_and_labels_by_stem() {
        let ws = temp_workspace("series");
        std::fs::create_dir_all(ws.join("snaps")).expect("dir");
        for (i, mb) in [10i64, 20, 50].iter().enumerate() {
            write(
                &ws.join("snaps"),
                &format!("heap-{i}.json"),
                &heap(&[(mb * 1024 * 1024, "main.growingCache")]),
            );
        }
        let cmd = ProfileCommand::Series {
            uris: Vec::new(),
            glob: vec!["snaps/heap-*.json".to_string()],
            labels: Vec::new(),
            format: Some(OutputFormat::Json),
        };
        let out = profile_command_in(&Config::default(), &cmd, &ws).expect("series");
        let doc: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(doc["summary"]["dataPoints"], 3);
        assert_eq!(doc["series"][0]["label"], "heap-0");
        assert_eq!(doc["series"][2]["label"], "heap-2");
        assert_eq!(doc["trends"][0]["trendDirection"], "increasing");
    }

    #[test]
    fn series_rejects_mismatched_labels() {
        let ws = temp_workspace("series-labels");
        let uris = (0..3)
            .map(|i| write(&ws, &format!("h{i}.json"), &heap(&[(1024, "main.a")])))
            .collect::<Vec<_>>();
        let cmd = ProfileCommand::Series {
            uris,
            glob: Vec::new(),
            labels: vec!["only-one".to_string()],
            format: None,
        };
        let err = profile_command(&Config::default(), &cmd).expect_err("mismatch");
        assert_eq!(err.code(), "LABEL_MISMATCH");
    }

    #[test]
    fn leaks_applies_config_threshold() {
        let ws = temp_workspace("leaks");
        let base = write(&ws, "before.json", &heap(&[(1024, "main.small"), (1024, "main.big")]));
        let target = write(&ws, "after.json", &heap(&[(2048, "main.small"), (1024 * 1024, "main.big")]));
        let cfg = Config {
            min_leak_bytes: 4096,
            ..Config::default()
        };
        let cmd = ProfileCommand::Leaks {
            baseline: base,
            target,
            top: None,
            min_bytes: None,
            format: Some(OutputFormat::Json),
        };
        let out = profile_command(&cfg, &cmd).expect("leaks");
        let doc: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(doc["suspects"].as_array().map(Vec::len), Some(1));
        assert_eq!(doc["suspects"][0]["functionName"], "main.big");
        assert_eq!(doc["minGrowthBytes"], 4096);
    }

    #[test]
    fn negative_min_bytes_is_invalid() {
        let cmd = ProfileCommand::Leaks {
            baseline: "a.json".to_string(),
            target: "b.json".to_string(),
            top: None,
            min_bytes: Some(-1),
            format: None,
        };
        let err = profile_command(&Config::default(), &cmd).expect_err("negative");
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn missing_profile_reports_file_not_found() {
        let ws = temp_workspace("missing");
        let cmd = ProfileCommand::Analyze {
            uri: ws.join("absent.json").display().to_string(),
            kind: ProfileKind::Cpu,
            top: None,
            format: None,
        };
        let err = profile_command(&Config::default(), &cmd).expect_err("missing");
        assert_eq!(err.code(), "FILE_NOT_FOUND");
    }
}
