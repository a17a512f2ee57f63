//! CLI configuration loader for lmprobe
//!
//! Every setting resolves with the priority flag > environment > file > default.
//! The config file is the first of:
//! 1. --config file/dir
//! 2. Current working directory: ./lmprobe.json
//! 3. Platform config directory: <config_dir>/lmprobe/config.json

use anyhow::{anyhow, Context, Result};
use lmprobe_core::config::{ProbeConfig, SettingSource};
use lmprobe_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Variables holding the API base, in lookup order
pub const API_BASE_ENV_VARS: [&str; 2] = ["LMSTUDIO_API_BASE", "OLLAMA_API_BASE"];
pub const MODEL_ENV_VAR: &str = "CAI_MODEL";
pub const API_KEY_ENV_VAR: &str = "LMSTUDIO_API_KEY";
pub const AGENT_ENV_VAR: &str = "LMPROBE_AGENT";
pub const TIMEOUT_ENV_VAR: &str = "LMPROBE_TIMEOUT_SECS";

/// Raw configuration file format; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawConfig {
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub agent: Option<String>,
    pub prompts: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
    pub max_turns: Option<usize>,
}

/// Result of loading: the configuration plus where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ProbeConfig,
    /// Config file that contributed values, if any
    pub config_file: Option<PathBuf>,
}

impl LoadedConfig {
    /// Neither API base variable was set and nothing else chose a base
    pub fn api_base_unconfigured(&self) -> bool {
        self.config.api_base.is_default()
    }
}

/// `.env` files that were applied or rejected at startup
#[derive(Debug, Default)]
pub struct DotenvReport {
    pub loaded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, dotenvy::Error)>,
}

impl DotenvReport {
    /// Call once tracing is initialised
    pub fn log(&self) {
        for path in &self.loaded {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        for (path, error) in &self.failed {
            tracing::warn!("Ignoring {}: {}", path.display(), error);
        }
    }
}

/// Load `.env` from the working directory, then from the home directory.
///
/// Variables already present in the environment are never replaced, so the
/// working directory file wins over the home one.
pub fn load_dotenv_files() -> DotenvReport {
    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(".env"));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".env"));
    }
    candidates.dedup();
    load_dotenv_from(&candidates)
}

/// Apply each existing file in order; missing files are skipped silently
pub fn load_dotenv_from(paths: &[PathBuf]) -> DotenvReport {
    let mut report = DotenvReport::default();
    for path in paths {
        match dotenvy::from_path(path) {
            Ok(()) => report.loaded.push(path.clone()),
            Err(e) if e.not_found() => {}
            Err(e) => report.failed.push((path.clone(), e)),
        }
    }
    report
}

/// CLI configuration loader
#[derive(Debug, Default)]
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Replaces the default search locations
    search_paths: Option<Vec<PathBuf>>,
    /// Replaces the process environment
    env: Option<HashMap<String, String>>,
    /// Flag overrides
    api_base_override: Option<String>,
    model_override: Option<String>,
    api_key_override: Option<String>,
    agent_override: Option<String>,
    prompts_override: Vec<String>,
    timeout_override: Option<u64>,
    max_turns_override: Option<usize>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Use these candidate files instead of the default search locations
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = Some(paths);
        self
    }

    /// Read variables from `env` instead of the process environment
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_api_base_override(mut self, api_base: String) -> Self {
        self.api_base_override = Some(api_base);
        self
    }

    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    pub fn with_agent_override(mut self, agent: String) -> Self {
        self.agent_override = Some(agent);
        self
    }

    /// Replace the prompt list; an empty list keeps the configured prompts
    pub fn with_prompts_override(mut self, prompts: Vec<String>) -> Self {
        self.prompts_override = prompts;
        self
    }

    pub fn with_timeout_override(mut self, timeout_secs: u64) -> Self {
        self.timeout_override = Some(timeout_secs);
        self
    }

    pub fn with_max_turns_override(mut self, max_turns: usize) -> Self {
        self.max_turns_override = Some(max_turns);
        self
    }

    /// Load, merge and validate configuration
    pub async fn load(&self) -> Result<LoadedConfig> {
        let (raw, config_file) = match &self.config_override {
            Some(override_path) => {
                let path = expand_path(override_path);
                let raw = self.load_from_path(&path).await.with_context(|| {
                    format!(
                        "Failed to load config from override path: {}",
                        override_path.display()
                    )
                })?;
                (raw, Some(path))
            }
            None => match self.search_and_load().await? {
                Some((raw, path)) => (raw, Some(path)),
                None => (RawConfig::default(), None),
            },
        };

        if let Some(path) = &config_file {
            tracing::debug!("Using config file {}", path.display());
        }

        let mut config = ProbeConfig::default();
        self.apply_file(&mut config, raw);
        self.apply_env(&mut config)?;
        self.apply_flags(&mut config);

        config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        Ok(LoadedConfig {
            config,
            config_file,
        })
    }

    fn apply_file(&self, config: &mut ProbeConfig, raw: RawConfig) {
        config.api_base.override_with(raw.api_base, SettingSource::File);
        config.model.override_with(raw.model, SettingSource::File);
        config.api_key.override_with(raw.api_key, SettingSource::File);
        config.agent_name.override_with(raw.agent, SettingSource::File);
        config.prompts.override_with(raw.prompts, SettingSource::File);
        config
            .timeout_secs
            .override_with(raw.timeout_secs, SettingSource::File);
        config
            .max_turns
            .override_with(raw.max_turns, SettingSource::File);
    }

    fn apply_env(&self, config: &mut ProbeConfig) -> Result<()> {
        if let Some((name, value)) = API_BASE_ENV_VARS
            .iter()
            .find_map(|name| self.env_var(name).map(|v| (name, v)))
        {
            config
                .api_base
                .override_with(Some(value), SettingSource::Env(name.to_string()));
        }

        let simple = [
            (MODEL_ENV_VAR, &mut config.model),
            (API_KEY_ENV_VAR, &mut config.api_key),
            (AGENT_ENV_VAR, &mut config.agent_name),
        ];
        for (name, setting) in simple {
            setting.override_with(self.env_var(name), SettingSource::Env(name.to_string()));
        }

        if let Some(raw) = self.env_var(TIMEOUT_ENV_VAR) {
            let timeout = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                field: TIMEOUT_ENV_VAR.to_string(),
                value: raw.clone(),
            })?;
            config.timeout_secs.override_with(
                Some(timeout),
                SettingSource::Env(TIMEOUT_ENV_VAR.to_string()),
            );
        }

        Ok(())
    }

    fn apply_flags(&self, config: &mut ProbeConfig) {
        config
            .api_base
            .override_with(self.api_base_override.clone(), SettingSource::Flag);
        config
            .model
            .override_with(self.model_override.clone(), SettingSource::Flag);
        config
            .api_key
            .override_with(self.api_key_override.clone(), SettingSource::Flag);
        config
            .agent_name
            .override_with(self.agent_override.clone(), SettingSource::Flag);
        if !self.prompts_override.is_empty() {
            config
                .prompts
                .override_with(Some(self.prompts_override.clone()), SettingSource::Flag);
        }
        config
            .timeout_secs
            .override_with(self.timeout_override, SettingSource::Flag);
        config
            .max_turns
            .override_with(self.max_turns_override, SettingSource::Flag);
    }

    /// Non-empty value of an environment variable
    fn env_var(&self, name: &str) -> Option<String> {
        let value = match &self.env {
            Some(env) => env.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<Option<(RawConfig, PathBuf)>> {
        let candidates = match &self.search_paths {
            Some(paths) => paths.clone(),
            None => default_search_paths()?,
        };

        for candidate in candidates {
            if candidate.is_file() {
                let raw = self.load_file(&candidate).await?;
                return Ok(Some((raw, candidate)));
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.exists() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into())
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// ./lmprobe.json, then <config_dir>/lmprobe/config.json
fn default_search_paths() -> Result<Vec<PathBuf>> {
    let mut paths = vec![std::env::current_dir()?.join("lmprobe.json")];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("lmprobe").join("config.json"));
    }
    Ok(paths)
}

/// Expand `~` and environment variables in a user supplied path
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => path.to_path_buf(),
    }
}
