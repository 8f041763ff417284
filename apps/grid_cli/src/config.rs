use std::{fs, io::ErrorKind, path::Path, time::Duration};

use anyhow::Context;
use grid_core::DEFAULT_REQUEST_TIMEOUT;
use serde::Deserialize;

/// Defaults read from `grid.toml`; command-line flags and env vars win over them.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    pub server_url: Option<String>,
    pub user_id: Option<i64>,
    pub request_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout_secs {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// A missing file yields the defaults; an unreadable one is an error.
pub fn load_file_config(path: &Path) -> anyhow::Result<FileConfig> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()))
        }
    };
    parse_file_config(&raw).with_context(|| format!("invalid config in {}", path.display()))
}

fn parse_file_config(raw: &str) -> anyhow::Result<FileConfig> {
    Ok(toml::from_str(raw)?)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
