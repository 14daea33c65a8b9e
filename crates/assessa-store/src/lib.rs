//! assessa-store — persistence collaborators for the quiz engine.
//!
//! Implements the `AttemptStore` and `QuizSource` traits from `assessa-core`
//! with JSON attempt files and TOML quiz directories, and loads the
//! `assessa.toml` configuration.

pub mod config;
pub mod error;
pub mod json;
pub mod memory;
pub mod source;

pub use config::{load_config, load_config_from, AssessaConfig};
pub use error::StoreError;
pub use json::JsonAttemptStore;
pub use memory::MemoryAttemptStore;
pub use source::DirectoryQuizSource;
