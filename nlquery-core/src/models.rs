//! Core data models shared by the SQL and document pipelines.
//!
//! Schema descriptions, query rows and the question/answer contract are
//! all plain serde types so that every value that reaches the completion
//! service or a caller has a single deterministic JSON form.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PostgreSQL => write!(f, "PostgreSQL"),
            Self::SQLite => write!(f, "SQLite"),
        }
    }
}

/// Portable column type, independent of the database engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalType {
    /// Any integer width
    Integer,
    /// Binary floating point
    Float,
    /// Exact numeric
    Decimal,
    /// Character data
    String,
    /// True/false
    Boolean,
    /// Calendar date
    Date,
    /// Date and time, with or without zone
    DateTime,
    /// Time of day
    Time,
    /// UUID
    Uuid,
    /// JSON document
    Json,
    /// Raw bytes
    Binary,
    /// Engine-specific type kept verbatim
    Custom { type_name: String },
}

impl LogicalType {
    /// Short name rendered into the schema description.
    pub fn name(&self) -> String {
        match self {
            Self::Integer => "int".to_string(),
            Self::Float => "float".to_string(),
            Self::Decimal => "decimal".to_string(),
            Self::String => "string".to_string(),
            Self::Boolean => "bool".to_string(),
            Self::Date => "date".to_string(),
            Self::DateTime => "datetime".to_string(),
            Self::Time => "time".to_string(),
            Self::Uuid => "uuid".to_string(),
            Self::Json => "json".to_string(),
            Self::Binary => "bytes".to_string(),
            Self::Custom { type_name } => type_name.to_lowercase(),
        }
    }
}

/// One column of a table as presented to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub column_name: String,
    pub column_type: String,
}

impl ColumnDescriptor {
    /// Creates a column descriptor.
    pub fn new(column_name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            column_type: column_type.into(),
        }
    }
}

/// One table with its columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub table_name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// Creates a table descriptor.
    pub fn new(table_name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
        }
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.column_name == name)
    }
}

/// Ordered list of tables handed to the SQL generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDescription {
    pub tables: Vec<TableDescriptor>,
}

impl SchemaDescription {
    /// Creates a schema description from tables in catalog order.
    pub const fn new(tables: Vec<TableDescriptor>) -> Self {
        Self { tables }
    }

    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.table_name == name)
    }

    /// Returns true when the database exposes no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Renders the schema as indented JSON for embedding in a prompt.
    ///
    /// # Errors
    /// Returns a serialization error if the description cannot be encoded
    pub fn render(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            crate::error::NlQueryError::Serialization {
                context: "Failed to render schema description".to_string(),
                source: e,
            }
        })
    }
}

/// A single value read from a result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Date(chrono::NaiveDate),
    Timestamp(chrono::NaiveDateTime),
}

impl ScalarValue {
    /// Returns true for SQL NULL.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// One result row; column order is the order the database returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResultRow {
    entries: Vec<(String, ScalarValue)>,
}

impl QueryResultRow {
    /// Creates an empty row.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a column value, replacing an earlier value with the same name.
    pub fn insert(&mut self, column: impl Into<String>, value: ScalarValue) {
        let column = column.into();
        if let Some(existing) = self.entries.iter_mut().find(|(name, _)| *name == column) {
            existing.1 = value;
        } else {
            self.entries.push((column, value));
        }
    }

    /// Builder-style variant of [`QueryResultRow::insert`].
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: ScalarValue) -> Self {
        self.insert(column, value);
        self
    }

    /// Returns the value of a column.
    pub fn get(&self, column: &str) -> Option<&ScalarValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for QueryResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Rows in cursor order.
pub type QueryResult = Vec<QueryResultRow>;

/// Structured error returned instead of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

/// What the executor hands to the answer composer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    /// The statement ran
    Rows(QueryResult),
    /// The statement was rejected or failed
    Error(ErrorPayload),
}

impl QueryOutcome {
    /// Creates an error outcome.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            error: message.into(),
        })
    }

    /// Returns the rows, if the statement ran.
    pub fn rows(&self) -> Option<&QueryResult> {
        match self {
            Self::Rows(rows) => Some(rows),
            Self::Error(_) => None,
        }
    }

    /// Serializes the outcome compactly for embedding in a prompt.
    ///
    /// # Errors
    /// Returns a serialization error if a value cannot be encoded
    pub fn to_payload(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| crate::error::NlQueryError::Serialization {
            context: "Failed to serialize query outcome".to_string(),
            source: e,
        })
    }
}

/// Incoming question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Outgoing answer or failure message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AskResponse {
    Answer { answer: String },
    Error { error: String },
}

impl AskResponse {
    /// Maps a pipeline result to the contract, hiding internal detail.
    pub fn from_result(result: &crate::Result<String>) -> Self {
        match result {
            Ok(answer) => Self::Answer {
                answer: answer.clone(),
            },
            Err(e) => Self::Error {
                error: e.public_message().to_string(),
            },
        }
    }

    /// Returns true for a successful answer.
    pub const fn is_answer(&self) -> bool {
        matches!(self, Self::Answer { .. })
    }
}
