use anyhow::{Context, anyhow, bail};
use mediadex_core::{LoaderSettings, ViewOptions};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::util::{non_empty_var, parse_bool};

pub const CONFIG_PATH_VAR: &str = "MEDIADEX_CONFIG_PATH";
pub const CONFIG_JSON_VAR: &str = "MEDIADEX_CONFIG_JSON";
pub const REMOVE_TRASHED_FILES_VAR: &str = "MEDIADEX_REMOVE_TRASHED_FILES";

const DEFAULT_CANDIDATES: &[&str] = &[
    "mediadex.toml",
    "mediadex.json",
    "config/mediadex.toml",
    "config/mediadex.json",
];

/// Source that produced the index configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IndexConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Everything an embedding application tunes about its views.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Sorting defaults, trash behaviour and per-mime show actions.
    pub view: ViewOptions,
    /// Chunking, shuffling and limits for query loading.
    pub loader: LoaderSettings,
    pub logging: LoggingConfig,
}

/// Raw values of the variables [`IndexConfig::load_from_env`] reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSources {
    pub config_path: Option<String>,
    pub config_json: Option<String>,
    pub remove_trashed_files: Option<String>,
}

impl EnvSources {
    pub fn from_env() -> Self {
        Self {
            config_path: non_empty_var(CONFIG_PATH_VAR),
            config_json: non_empty_var(CONFIG_JSON_VAR),
            remove_trashed_files: non_empty_var(REMOVE_TRASHED_FILES_VAR),
        }
    }
}

impl IndexConfig {
    /// Load configuration using environment variables.
    /// Evaluation order:
    /// 1) `$MEDIADEX_CONFIG_PATH` (TOML or JSON file),
    /// 2) `$MEDIADEX_CONFIG_JSON` (inline JSON),
    /// 3) the first default file found in the working directory,
    /// 4) defaults.
    ///
    /// `$MEDIADEX_REMOVE_TRASHED_FILES` then overrides whatever was loaded.
    pub fn load_from_env() -> anyhow::Result<(Self, IndexConfigSource)> {
        Self::load_from_sources(&EnvSources::from_env(), Path::new("."))
    }

    /// [`load_from_env`](Self::load_from_env) with the environment and the
    /// directory searched for default files passed in.
    pub fn load_from_sources(
        sources: &EnvSources,
        search_dir: &Path,
    ) -> anyhow::Result<(Self, IndexConfigSource)> {
        let (mut config, source) = if let Some(path) = &sources.config_path {
            let path = PathBuf::from(path);
            let config = Self::load_from_file(&path)?;
            (config, IndexConfigSource::EnvPath(path))
        } else if let Some(raw) = &sources.config_json {
            let config = Self::parse_json(raw)
                .with_context(|| format!("failed to parse {CONFIG_JSON_VAR}"))?;
            (config, IndexConfigSource::EnvInline)
        } else if let Some(path) = Self::find_default_file(search_dir) {
            let config = Self::load_from_file(&path)?;
            (config, IndexConfigSource::File(path))
        } else {
            (Self::default(), IndexConfigSource::Default)
        };

        if let Some(raw) = &sources.remove_trashed_files {
            let Some(value) = parse_bool(raw) else {
                bail!("{REMOVE_TRASHED_FILES_VAR} must be a boolean, got {raw:?}");
            };
            config.view.remove_trashed_files = value;
        }

        Ok((config, source))
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read index config from {}", path.display())
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents)
                .with_context(|| format!("invalid index config {}", path.display())),
            Some("toml") | Some("tml") => toml::from_str(&contents).map_err(|err| {
                anyhow!("invalid index config {}: {}", path.display(), err)
            }),
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }

    pub fn parse_from_str(contents: &str, origin: &str) -> anyhow::Result<Self> {
        // Try TOML first, then JSON for convenience.
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse index config {}: toml error: {}; json error: {}",
                    origin,
                    toml_err,
                    json_err
                )
            })
        })
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).map_err(|err| anyhow!("invalid index config json: {err}"))
    }

    fn find_default_file(search_dir: &Path) -> Option<PathBuf> {
        DEFAULT_CANDIDATES
            .iter()
            .map(|candidate| search_dir.join(candidate))
            .find(|path| path.exists())
    }
}
