//! Profile acquisition: local paths, `file://` URIs and `http(s)://` URLs.
//!
//! Every source must hold a JSON-encoded [`Profile`].

use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Config, LensError, LensResult, Profile};

/// Remote bodies larger than this are rejected.
const MAX_DOWNLOAD_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSource {
    Local(PathBuf),
    Remote(String),
}

impl ProfileSource {
    pub fn parse(uri: &str) -> LensResult<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(LensError::InvalidArgument("profile uri is empty".to_string()));
        }
        if let Some(path) = uri.strip_prefix("file://") {
            return Ok(Self::Local(PathBuf::from(path)));
        }
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return Ok(Self::Remote(uri.to_string()));
        }
        if let Some((scheme, _)) = uri.split_once("://") {
            return Err(LensError::InvalidArgument(format!(
                "unsupported uri scheme {scheme:?} (use a path, file://, http:// or https://)"
            )));
        }
        Ok(Self::Local(PathBuf::from(uri)))
    }

    /// File stem for local sources, last path segment for URLs.
    pub fn default_label(&self) -> String {
        match self {
            Self::Local(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Remote(url) => url
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or(url)
                .to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileLoader {
    timeout: Duration,
}

impl ProfileLoader {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Duration::from_secs(config.http_timeout_secs.max(1)))
    }

    pub fn load(&self, uri: &str) -> LensResult<Profile> {
        match ProfileSource::parse(uri)? {
            ProfileSource::Local(path) => load_local(&path),
            ProfileSource::Remote(url) => {
                let bytes = self.fetch(&url)?;
                Profile::from_json_slice(&bytes, &url)
            }
        }
    }

    fn fetch(&self, url: &str) -> LensResult<Vec<u8>> {
        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        let response = agent.get(url).call().map_err(|err| LensError::Download {
            uri: url.to_string(),
            reason: err.to_string(),
        })?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_DOWNLOAD_BYTES + 1)
            .read_to_end(&mut bytes)
            .map_err(|err| LensError::Download {
                uri: url.to_string(),
                reason: err.to_string(),
            })?;
        if bytes.len() as u64 > MAX_DOWNLOAD_BYTES {
            return Err(LensError::Download {
                uri: url.to_string(),
                reason: format!("body exceeds {MAX_DOWNLOAD_BYTES} bytes"),
            });
        }
        Ok(bytes)
    }
}

fn load_local(path: &Path) -> LensResult<Profile> {
    if path.is_dir() {
        return Err(LensError::InvalidArgument(format!(
            "{} is a directory, not a profile",
            path.display()
        )));
    }
    Profile::read_json(path)
}
