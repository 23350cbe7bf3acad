//! Viewer configuration.
//!
//! Loaded from `viewer_config.json` with support for an environment variable
//! override; falls back to the builtin copy when no file can be read.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use swarm_proto::Settings;
use thiserror::Error;

pub const BUILTIN_VIEWER_CONFIG: &str = include_str!("data/viewer_config.json");
pub const CONFIG_PATH_ENV: &str = "SWARM_VIEW_CONFIG_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Websocket,
    Polling,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub endpoint: String,
    pub transport: TransportKind,
    pub poll_url: String,
    pub poll_interval_ms: u64,
    /// Surface units covered by one rendered pixel.
    pub world_scale: f64,
    pub settings: Settings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:8080/ws".to_string(),
            transport: TransportKind::Websocket,
            poll_url: "http://localhost:8080/simulate".to_string(),
            poll_interval_ms: 100,
            world_scale: 4.0,
            settings: Settings::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ViewerConfigError {
    #[error("failed to parse viewer config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read viewer config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ViewerConfig {
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_VIEWER_CONFIG).unwrap_or_default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, ViewerConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ViewerConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = ViewerConfig::from_json_str(&contents)?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Load from `explicit`, else `$SWARM_VIEW_CONFIG_PATH`, else the builtin copy.
pub fn load_viewer_config(explicit: Option<&Path>) -> (ViewerConfig, Option<PathBuf>) {
    let candidate = explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

    if let Some(path) = candidate {
        match ViewerConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "swarm_view::config",
                    path = %path.display(),
                    "viewer_config.loaded=file"
                );
                return (config, Some(path));
            }
            Err(err) => {
                tracing::warn!(
                    target: "swarm_view::config",
                    path = %path.display(),
                    error = %err,
                    "viewer_config.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "swarm_view::config", "viewer_config.loaded=builtin");
    (ViewerConfig::builtin(), None)
}
