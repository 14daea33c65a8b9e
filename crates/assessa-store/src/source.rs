//! Quiz source backed by a directory of TOML quiz files.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use assessa_core::model::Quiz;
use assessa_core::parser::load_quiz_directory;
use assessa_core::traits::QuizSource;

use crate::error::StoreError;

/// Reads quizzes from `.toml` files under a directory.
///
/// The directory is re-read on every fetch so edits show up for the next
/// session; nothing is cached.
#[derive(Debug, Clone)]
pub struct DirectoryQuizSource {
    dir: PathBuf,
}

impl DirectoryQuizSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Every parsable quiz in the directory.
    pub async fn list(&self) -> Result<Vec<Quiz>> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || load_quiz_directory(&dir)).await?
    }
}

#[async_trait]
impl QuizSource for DirectoryQuizSource {
    async fn fetch(&self, quiz_id: &str) -> Result<Quiz> {
        self.list()
            .await?
            .into_iter()
            .find(|q| q.id == quiz_id)
            .ok_or_else(|| StoreError::QuizNotFound(quiz_id.to_string()).into())
    }
}
