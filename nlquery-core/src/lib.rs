//! Core library for nlquery.
//!
//! Answers natural-language questions from two sources:
//! - a relational database, by generating SQL from the live schema,
//!   running it under a keyword deny-list, and phrasing the rows as an answer
//! - a folder of documents, by extracting and chunking their text into a
//!   persisted index and answering from the fragments that match the question
//!
//! # Security Guarantees
//! - No credentials stored or logged in any data structures
//! - Generated SQL containing a destructive keyword is never executed
//! - Driver and completion-service errors never reach the answer contract
//! - The only network peers are the target database and the completion endpoint
//!
//! # Architecture
//! - Capability traits ([`adapters::SchemaProvider`], [`adapters::QueryRunner`],
//!   [`completion::CompletionClient`]) at every external seam
//! - Factory for database adapter instantiation
//! - Expected conditions (unsafe SQL, empty retrieval, skipped files) are
//!   values, not errors

pub mod adapters;
pub mod assistant;
pub mod completion;
pub mod composer;
pub mod documents;
pub mod error;
pub mod executor;
pub mod generator;
pub mod logging;
pub mod models;
pub mod safety;
pub mod schema;

// Re-export commonly used types
pub use adapters::{ConnectionConfig, DatabaseAdapter, QueryRunner, SchemaProvider};
pub use assistant::{DocumentAssistant, SqlAssistant};
pub use completion::{CompletionClient, CompletionConfig, CompletionRequest, OpenAiCompletionClient};
pub use composer::AnswerComposer;
pub use documents::{DocumentIndexer, FileIndex, FragmentRetriever, IndexConfig, IndexReport, Retrieval};
pub use error::{FailureKind, NlQueryError, Result};
pub use executor::QueryExecutor;
pub use generator::SqlGenerator;
pub use models::{
    AskRequest, AskResponse, ColumnDescriptor, DatabaseType, LogicalType, QueryOutcome,
    QueryResult, QueryResultRow, ScalarValue, SchemaDescription, TableDescriptor,
};
pub use safety::SqlSafetyValidator;
pub use schema::SchemaIntrospector;
