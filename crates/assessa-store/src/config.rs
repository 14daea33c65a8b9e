//! assessa configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use assessa_core::attempt::AttemptContext;

use crate::json::JsonAttemptStore;
use crate::source::DirectoryQuizSource;

/// Top-level assessa configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessaConfig {
    /// Learner the attempts are recorded for.
    #[serde(default = "default_learner_id")]
    pub learner_id: String,
    /// Optional course the quizzes belong to.
    #[serde(default)]
    pub course_id: Option<String>,
    /// Directory of `.toml` quiz definitions.
    #[serde(default = "default_quiz_dir")]
    pub quiz_dir: PathBuf,
    /// Directory where attempts are recorded.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
    /// Refuse to start a quiz once `max_attempts` are recorded.
    #[serde(default = "default_true")]
    pub enforce_max_attempts: bool,
}

fn default_learner_id() -> String {
    std::env::var("USER").unwrap_or_else(|_| "anonymous".to_string())
}
fn default_quiz_dir() -> PathBuf {
    PathBuf::from("./quizzes")
}
fn default_store_dir() -> PathBuf {
    PathBuf::from("./assessa-attempts")
}
fn default_true() -> bool {
    true
}

impl Default for AssessaConfig {
    fn default() -> Self {
        Self {
            learner_id: default_learner_id(),
            course_id: None,
            quiz_dir: default_quiz_dir(),
            store_dir: default_store_dir(),
            enforce_max_attempts: true,
        }
    }
}

impl AssessaConfig {
    pub fn attempt_context(&self) -> AttemptContext {
        AttemptContext {
            learner_id: self.learner_id.clone(),
            course_id: self.course_id.clone(),
        }
    }

    pub fn attempt_store(&self) -> JsonAttemptStore {
        JsonAttemptStore::new(&self.store_dir)
    }

    pub fn quiz_source(&self) -> DirectoryQuizSource {
        DirectoryQuizSource::new(&self.quiz_dir)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(p: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&p.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `assessa.toml` in the current directory
/// 2. `~/.config/assessa/config.toml`
///
/// Environment variable overrides: `ASSESSA_LEARNER_ID`, `ASSESSA_STORE_DIR`.
pub fn load_config() -> Result<AssessaConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AssessaConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("assessa.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<AssessaConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => AssessaConfig::default(),
    };

    if let Ok(learner) = std::env::var("ASSESSA_LEARNER_ID") {
        config.learner_id = learner;
    }
    if let Ok(dir) = std::env::var("ASSESSA_STORE_DIR") {
        config.store_dir = PathBuf::from(dir);
    }

    config.learner_id = resolve_env_vars(&config.learner_id);
    config.course_id = config.course_id.as_deref().map(resolve_env_vars);
    config.quiz_dir = resolve_path(&config.quiz_dir);
    config.store_dir = resolve_path(&config.store_dir);

    anyhow::ensure!(
        !config.learner_id.trim().is_empty(),
        "learner_id must not be empty"
    );

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("assessa"))
}
