//! Keyword deny-list for generated SQL.
//!
//! This is a substring check, not a parser. It rejects statements that
//! merely mention a keyword (`updated_at` contains `UPDATE`) and accepts
//! statements it does not know about (`GRANT`, `CREATE`). It is a guard
//! against obviously destructive model output and nothing more; use a
//! read-only database role when stronger guarantees are needed.

/// Keywords whose presence anywhere in a statement rejects it.
pub const FORBIDDEN_KEYWORDS: [&str; 6] =
    ["DROP", "DELETE", "UPDATE", "INSERT", "ALTER", "TRUNCATE"];

/// Classifies SQL statements as executable or not.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlSafetyValidator;

impl SqlSafetyValidator {
    /// Creates the validator.
    pub const fn new() -> Self {
        Self
    }

    /// Returns true when no forbidden keyword occurs in `sql`, ignoring case.
    pub fn is_safe(&self, sql: &str) -> bool {
        self.first_violation(sql).is_none()
    }

    /// Returns the first forbidden keyword found in `sql`, if any.
    pub fn first_violation(&self, sql: &str) -> Option<&'static str> {
        let upper = sql.to_uppercase();
        FORBIDDEN_KEYWORDS
            .into_iter()
            .find(|keyword| upper.contains(keyword))
    }
}
