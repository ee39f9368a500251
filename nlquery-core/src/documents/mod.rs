//! Document indexing and retrieval.
//!
//! # Module Structure
//! - `config`: Folder, index path and chunk size
//! - `extractor`: PDF, Word, Excel and plain-text extraction
//! - `chunker`: Fixed-width fragment splitting
//! - `index`: Persisted fragment index with rebuild and reconcile
//! - `retriever`: Keyword retrieval of relevant fragments

pub mod chunker;
mod config;
pub mod extractor;
mod index;
mod retriever;

pub use config::{DEFAULT_CHUNK_SIZE, DEFAULT_INDEX_PATH, IndexConfig};
pub use extractor::{DocumentFormat, extract_text};
pub use index::{DocumentIndexer, FileFragment, FileIndex, FileOutcome, FileReport, IndexReport};
pub use retriever::{FragmentRetriever, Retrieval, fragment_limit, tokenize};
