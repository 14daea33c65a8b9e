//! JSON file attempt store.
//!
//! Layout: `<root>/<learner>/<quiz>.json`, each file holding an array of
//! [`StoredAttempt`]s, oldest first.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use assessa_core::attempt::{AttemptContext, QuizAttempt};
use assessa_core::traits::AttemptStore;

use crate::error::StoreError;

/// One attempt as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAttempt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    pub attempt: QuizAttempt,
}

/// Attempt store backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct JsonAttemptStore {
    root: PathBuf,
}

impl JsonAttemptStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `learner_id`'s attempts at `quiz_id`.
    pub fn path_for(&self, learner_id: &str, quiz_id: &str) -> PathBuf {
        self.root
            .join(sanitize(learner_id))
            .join(format!("{}.json", sanitize(quiz_id)))
    }

    async fn load(&self, path: &Path) -> Result<Vec<StoredAttempt>, StoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: path.display().to_string(),
            source,
        })
    }

    /// All stored attempts for a learner and quiz, with their course context.
    pub async fn stored_for(&self, learner_id: &str, quiz_id: &str) -> Result<Vec<StoredAttempt>> {
        let path = self.path_for(learner_id, quiz_id);
        Ok(self.load(&path).await?)
    }
}

/// Map an id to a single safe path component.
///
/// Ids made only of ASCII alphanumerics, `-`, `_` and non-leading `.` are
/// used as-is. Anything else is cleaned and suffixed with `~` and a hash of
/// the original id, so two distinct ids never share a file.
fn sanitize(id: &str) -> String {
    let verbatim = !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if verbatim {
        return id.to_string();
    }

    let cleaned: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{cleaned}~{}", short_hash(id))
}

fn short_hash(id: &str) -> String {
    let digest = Sha256::digest(id.as_bytes());
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

#[async_trait]
impl AttemptStore for JsonAttemptStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn record(&self, attempt: &QuizAttempt, context: &AttemptContext) -> Result<()> {
        let path = self.path_for(&context.learner_id, &attempt.quiz_id);
        let mut stored = self.load(&path).await?;

        // Re-recording the same attempt id replaces it.
        stored.retain(|s| s.attempt.id != attempt.id);
        stored.push(StoredAttempt {
            course_id: context.course_id.clone(),
            attempt: attempt.clone(),
        });

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&stored).context("failed to serialize attempts")?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("failed to write attempts to {}", path.display()))?;

        tracing::debug!(
            path = %path.display(),
            attempt_id = %attempt.id,
            total = stored.len(),
            "attempt written"
        );
        Ok(())
    }

    async fn attempts_for(&self, learner_id: &str, quiz_id: &str) -> Result<Vec<QuizAttempt>> {
        Ok(self
            .stored_for(learner_id, quiz_id)
            .await?
            .into_iter()
            .map(|s| s.attempt)
            .collect())
    }
}
