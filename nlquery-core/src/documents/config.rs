//! Document index configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the persisted index.
pub const DEFAULT_INDEX_PATH: &str = "file_index.json";
/// Default fragment length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Where documents live, where the index is kept, and how text is split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Folder whose top-level files are indexed
    pub documents_dir: PathBuf,
    /// JSON file holding the fragments
    pub index_path: PathBuf,
    /// Maximum characters per fragment
    pub chunk_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("."),
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl IndexConfig {
    /// Creates a configuration for a documents folder with default index
    /// path and chunk size.
    pub fn new(documents_dir: impl Into<PathBuf>) -> Self {
        Self {
            documents_dir: documents_dir.into(),
            ..Default::default()
        }
    }

    /// Builder method to set the index path.
    #[must_use]
    pub fn with_index_path(mut self, index_path: impl Into<PathBuf>) -> Self {
        self.index_path = index_path.into();
        self
    }

    /// Builder method to set the chunk size.
    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns a configuration error for a zero chunk size or an empty
    /// index path
    pub fn validate(&self) -> crate::Result<()> {
        if self.chunk_size == 0 {
            return Err(crate::error::NlQueryError::configuration(
                "chunk_size must be greater than 0",
            ));
        }

        if self.index_path.as_os_str().is_empty() {
            return Err(crate::error::NlQueryError::configuration(
                "index_path cannot be empty",
            ));
        }

        Ok(())
    }
}
