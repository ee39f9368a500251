//! Persisted fragment index and its maintenance.
//!
//! The index is a single JSON array of fragments. It is rewritten whole on
//! every rebuild or reconcile. There is no locking: two processes
//! maintaining the same index file race, and the last writer wins.

use super::{IndexConfig, chunker, extractor};
use crate::{Result, error::NlQueryError};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

/// One fragment of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFragment {
    /// File name relative to the documents folder
    pub source_file_name: String,
    /// Position of the fragment within its file, from 0
    pub fragment_index: usize,
    /// Fragment text
    pub text: String,
}

/// Ordered collection of fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileIndex {
    pub fragments: Vec<FileFragment>,
}

impl FileIndex {
    /// Creates an index from fragments.
    pub const fn new(fragments: Vec<FileFragment>) -> Self {
        Self { fragments }
    }

    /// Returns true when the index holds no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Distinct source file names.
    pub fn source_files(&self) -> BTreeSet<&str> {
        self.fragments
            .iter()
            .map(|f| f.source_file_name.as_str())
            .collect()
    }

    /// Fragments belonging to one file, in order.
    pub fn fragments_for<'a>(&'a self, file_name: &'a str) -> impl Iterator<Item = &'a FileFragment> {
        self.fragments
            .iter()
            .filter(move |f| f.source_file_name == file_name)
    }

    /// Loads a persisted index. A missing file yields `None`.
    ///
    /// # Errors
    /// - `IndexCorruption` if the file is not a valid index
    /// - `Io` if the file exists but cannot be read
    pub async fn load(path: &Path) -> Result<Option<Self>> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(NlQueryError::io(
                    format!("Failed to read index {}", path.display()),
                    e,
                ));
            }
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| NlQueryError::IndexCorruption {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Writes the index, replacing any previous file.
    ///
    /// # Errors
    /// Returns an I/O or serialization error if the index cannot be written
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            NlQueryError::Serialization {
                context: "Failed to serialize file index".to_string(),
                source: e,
            }
        })?;

        tokio::fs::write(path, json).await.map_err(|e| {
            NlQueryError::io(format!("Failed to write index {}", path.display()), e)
        })
    }
}

/// What happened to one file during maintenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Extracted and appended
    Indexed { fragments: usize },
    /// No longer in the folder; its fragments were dropped
    Removed { fragments: usize },
    /// Extraction failed; the file contributes nothing
    Skipped { reason: String },
}

/// Outcome for a named file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file_name: String,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Result of a rebuild or reconcile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// The index as persisted
    pub index: FileIndex,
    /// One entry per file touched, in processing order
    pub files: Vec<FileReport>,
}

impl IndexReport {
    /// Files that were skipped.
    pub fn skipped(&self) -> impl Iterator<Item = &FileReport> {
        self.files
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Skipped { .. }))
    }
}

/// Builds and maintains the index for a documents folder.
#[derive(Debug, Clone)]
pub struct DocumentIndexer {
    config: IndexConfig,
}

impl DocumentIndexer {
    /// Creates an indexer.
    ///
    /// # Errors
    /// Returns a configuration error if `config` is invalid
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub const fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Indexes every supported file from scratch and overwrites the
    /// persisted index.
    ///
    /// # Errors
    /// Returns a configuration error if the folder is missing, or an I/O
    /// error if the index cannot be written. Per-file extraction failures
    /// are reported as [`FileOutcome::Skipped`].
    pub async fn rebuild(&self) -> Result<IndexReport> {
        let start = std::time::Instant::now();
        let files = self.list_documents().await?;

        let mut report = IndexReport::default();
        for path in files {
            self.index_file(path, &mut report).await;
        }

        report.index.save(&self.config.index_path).await?;
        tracing::info!(
            "Rebuilt index: {} fragments from {} files in {:.2}s",
            report.index.len(),
            report.files.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(report)
    }

    /// Brings `existing` in line with the folder: new files are appended,
    /// vanished files lose their fragments, and the rest is untouched. The
    /// result is persisted.
    ///
    /// # Errors
    /// Same as [`DocumentIndexer::rebuild`]
    pub async fn reconcile(&self, existing: FileIndex) -> Result<IndexReport> {
        let start = std::time::Instant::now();
        let files = self.list_documents().await?;

        let present: BTreeSet<String> = files.iter().filter_map(|p| file_name_of(p)).collect();
        let indexed: BTreeSet<String> = existing
            .source_files()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut report = IndexReport::default();

        for gone in indexed.difference(&present) {
            let fragments = existing.fragments_for(gone).count();
            tracing::info!("Removing {} fragments of {}", fragments, gone);
            report.files.push(FileReport {
                file_name: gone.clone(),
                outcome: FileOutcome::Removed { fragments },
            });
        }

        report.index = FileIndex::new(
            existing
                .fragments
                .into_iter()
                .filter(|f| present.contains(&f.source_file_name))
                .collect(),
        );

        for path in files {
            let known = file_name_of(&path).is_some_and(|name| indexed.contains(&name));
            if !known {
                self.index_file(path, &mut report).await;
            }
        }

        report.index.save(&self.config.index_path).await?;
        tracing::info!(
            "Reconciled index: {} fragments, {} files changed in {:.2}s",
            report.index.len(),
            report.files.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(report)
    }

    /// Loads the persisted index (a missing file counts as empty) and
    /// reconciles it.
    ///
    /// # Errors
    /// `IndexCorruption` if the persisted index cannot be parsed; a full
    /// rebuild is then required
    pub async fn reconcile_persisted(&self) -> Result<IndexReport> {
        let existing = FileIndex::load(&self.config.index_path)
            .await?
            .unwrap_or_default();
        self.reconcile(existing).await
    }

    /// Supported top-level files of the folder, sorted by name.
    async fn list_documents(&self) -> Result<Vec<PathBuf>> {
        let folder = self.config.documents_dir.clone();

        match tokio::fs::metadata(&folder).await {
            Ok(metadata) if metadata.is_dir() => {}
            _ => {
                return Err(NlQueryError::configuration(format!(
                    "documents folder {} does not exist",
                    folder.display()
                )));
            }
        }

        tokio::task::spawn_blocking(move || {
            walkdir::WalkDir::new(&folder)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::warn!("Skipping unreadable entry: {}", e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(walkdir::DirEntry::into_path)
                .filter(|path| extractor::is_supported(path))
                .collect()
        })
        .await
        .map_err(|e| NlQueryError::io("Folder listing task failed", std::io::Error::other(e)))
    }

    /// Extracts, chunks and appends one file, recording its outcome.
    async fn index_file(&self, path: PathBuf, report: &mut IndexReport) {
        let Some(file_name) = file_name_of(&path) else {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            tracing::warn!("Skipping {}: file name is not valid UTF-8", file_name);
            report.files.push(FileReport {
                file_name,
                outcome: FileOutcome::Skipped {
                    reason: "file name is not valid UTF-8".to_string(),
                },
            });
            return;
        };

        let extraction = tokio::task::spawn_blocking(move || extractor::extract_text(&path)).await;

        let outcome = match extraction {
            Ok(Ok(text)) => {
                let fragments = chunker::split(&text, self.config.chunk_size);
                let count = fragments.len();
                report.index.fragments.extend(fragments.into_iter().enumerate().map(
                    |(fragment_index, text)| FileFragment {
                        source_file_name: file_name.clone(),
                        fragment_index,
                        text,
                    },
                ));
                tracing::debug!("Indexed {} ({} fragments)", file_name, count);
                FileOutcome::Indexed { fragments: count }
            }
            Ok(Err(e)) => {
                tracing::warn!("Skipping {}: {}", file_name, e);
                FileOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!("Extraction task for {} failed: {}", file_name, e);
                FileOutcome::Skipped {
                    reason: "extraction task failed".to_string(),
                }
            }
        };

        report.files.push(FileReport { file_name, outcome });
    }
}

fn file_name_of(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}
