//! Library module for nlquery
//!
//! Argument parsing and configuration assembly for the `nlquery` binary,
//! exposed for testing. Command dispatch lives in main.rs.
//!
//! # Security
//! - The database URL and API key are read from flags or the environment
//!   and are never echoed back (`hide_env_values`)
//! - Database URLs are redacted before they reach any log line

pub mod output;

use clap::{Args, Parser, Subcommand, ValueEnum};
use nlquery_core::{
    CompletionConfig, ConnectionConfig, FailureKind, IndexConfig, Result,
    adapters::parse_connection_config,
    completion::{DEFAULT_BASE_URL, DEFAULT_MODEL},
    documents::{DEFAULT_CHUNK_SIZE, DEFAULT_INDEX_PATH},
    logging::LogFormat,
};
use std::{path::PathBuf, time::Duration};

/// Default folder scanned for documents.
pub const DEFAULT_DOCUMENTS_DIR: &str = "documents";

/// Process exit status for a failure: 2 when the question could not be
/// turned into an answer, 1 when the environment is broken.
pub const fn exit_code(kind: FailureKind) -> i32 {
    match kind {
        FailureKind::BadRequest => 2,
        FailureKind::Internal => 1,
    }
}

#[derive(Parser, Debug)]
#[command(name = "nlquery")]
#[command(about = "Ask questions of a database or a folder of documents")]
#[command(version)]
#[command(long_about = "
nlquery - Natural-language questions over databases and documents

SQL questions are translated into a single SELECT statement using the live
schema, checked against a keyword deny-list, executed, and the rows are
phrased back as an answer. Document questions are answered from the
fragments of a persisted index that share words with the question.

SAFETY:
- Statements containing DROP, DELETE, UPDATE, INSERT, ALTER or TRUNCATE are never run
- --read-only additionally opens read-only database sessions
- Credentials are never logged

EXIT STATUS:
  0 answered, 1 environment or service failure, 2 the model's output could
  not be turned into a query or an answer

EXAMPLES:
  nlquery sql --database-url sqlite://garden.db \"how many plants are there?\"
  nlquery index rebuild --documents-dir ./manuals
  nlquery docs --json \"how often should the ficus be watered?\"
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer a question from the database
    Sql(SqlArgs),
    /// Answer a question from the indexed documents
    Docs(DocsArgs),
    /// Maintain the document index
    #[command(subcommand)]
    Index(IndexCommand),
    /// Print the schema description sent to the model
    Schema(DatabaseArgs),
    /// Test the database connection
    Test(DatabaseArgs),
    /// List supported databases and document formats
    List,
}

#[derive(Subcommand, Debug)]
pub enum IndexCommand {
    /// Re-extract every document and overwrite the index
    Rebuild(DocumentArgs),
    /// Index new documents and drop vanished ones
    Reconcile(DocumentArgs),
}

#[derive(Args, Debug)]
pub struct SqlArgs {
    /// Question in natural language
    pub question: String,

    #[command(flatten)]
    pub database: DatabaseArgs,

    #[command(flatten)]
    pub completion: CompletionArgs,

    /// Print the JSON answer contract instead of plain text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DocsArgs {
    /// Question in natural language
    pub question: String,

    /// Persisted fragment index
    #[arg(long, env = "NLQUERY_INDEX_PATH", default_value = DEFAULT_INDEX_PATH)]
    pub index_path: PathBuf,

    #[command(flatten)]
    pub completion: CompletionArgs,

    /// Print the JSON answer contract instead of plain text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database connection URL
    #[arg(
        long,
        env = "DATABASE_URL",
        hide_env_values = true,
        help = "Database connection string (credentials will be sanitized in logs)"
    )]
    pub database_url: String,

    /// Open read-only database sessions
    #[arg(long)]
    pub read_only: bool,

    /// Statement timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub query_timeout: Option<u64>,
}

impl DatabaseArgs {
    /// The URL's own settings with the flags layered on top, or `None`
    /// when no flag overrides anything.
    ///
    /// # Errors
    /// Returns a configuration error for a malformed URL or a zero timeout
    pub fn connection_config(&self) -> Result<Option<ConnectionConfig>> {
        if !self.read_only && self.query_timeout.is_none() {
            return Ok(None);
        }

        let mut config =
            parse_connection_config(&self.database_url)?.with_read_only(self.read_only);
        if let Some(seconds) = self.query_timeout {
            config = config.with_query_timeout(Duration::from_secs(seconds));
        }
        config.validate()?;
        Ok(Some(config))
    }
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    /// API key of the completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of an OpenAI-compatible endpoint
    #[arg(long, env = "NLQUERY_COMPLETION_URL", default_value = DEFAULT_BASE_URL)]
    pub completion_url: String,

    /// Model name
    #[arg(long, env = "NLQUERY_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 120)]
    pub completion_timeout: u64,
}

impl CompletionArgs {
    /// Validated completion settings.
    ///
    /// # Errors
    /// Returns a configuration error for an empty key, a non-http(s) URL or
    /// a zero timeout
    pub fn completion_config(&self) -> Result<CompletionConfig> {
        let config = CompletionConfig::new(self.api_key.clone())
            .with_base_url(self.completion_url.clone())
            .with_model(self.model.clone())
            .with_timeout(Duration::from_secs(self.completion_timeout));
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug, Clone)]
pub struct DocumentArgs {
    /// Folder whose top-level files are indexed
    #[arg(long, env = "NLQUERY_DOCUMENTS_DIR", default_value = DEFAULT_DOCUMENTS_DIR)]
    pub documents_dir: PathBuf,

    /// Persisted fragment index
    #[arg(long, env = "NLQUERY_INDEX_PATH", default_value = DEFAULT_INDEX_PATH)]
    pub index_path: PathBuf,

    /// Maximum characters per fragment
    #[arg(long, env = "NLQUERY_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Print per-file outcomes as JSON
    #[arg(long)]
    pub json: bool,
}

impl DocumentArgs {
    /// Validated index settings.
    ///
    /// # Errors
    /// Returns a configuration error for a zero chunk size
    pub fn index_config(&self) -> Result<IndexConfig> {
        let config = IndexConfig::new(self.documents_dir.clone())
            .with_index_path(self.index_path.clone())
            .with_chunk_size(self.chunk_size);
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(
        short,
        long,
        global = true,
        help = "Suppress all log output except errors"
    )]
    pub quiet: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}

/// `--log-format` values.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}
