//! Glob expansion for profile series.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::{LensError, LensResult};

const PROFILE_EXTENSION: &str = "json";

/// JSON profiles under `root` whose root-relative path matches any of
/// `patterns`, in path order. `*` stays within one directory level; `**`
/// crosses levels. Hidden directories are not searched.
pub fn find_profile_files(root: &Path, patterns: &[String]) -> LensResult<Vec<PathBuf>> {
    let set = profile_globset(patterns)?;
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e));

    let mut out = Vec::new();
    for entry in walker {
        let entry = entry.map_err(walk_error)?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != PROFILE_EXTENSION) {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(path);
        if set.is_match(rel) {
            out.push(path.to_path_buf());
        }
    }
    out.sort();
    Ok(out)
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

fn walk_error(err: walkdir::Error) -> LensError {
    let msg = err.to_string();
    LensError::Io(err.into_io_error().unwrap_or_else(|| std::io::Error::other(msg)))
}

fn profile_globset(patterns: &[String]) -> LensResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern.trim_start_matches("./"))
            .literal_separator(true)
            .build()
            .map_err(|e| LensError::InvalidArgument(format!("invalid glob {pattern:?}: {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| LensError::InvalidArgument(format!("invalid glob set: {e}")))
}
