// src/error.rs
//! Typed errors for contract violations inside the core (precondition faults).
//!
//! Expected conditions (missing optional column, empty selection, empty join)
//! are NOT errors: they come back as warnings or empty tables.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Strict column resolution failed; lists every absent column.
    #[error("missing columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// Table shape or key contract broken (e.g. a row without its country key).
    #[error("schema error: {0}")]
    Schema(String),
}

impl CoreError {
    pub fn missing<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingColumns {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Column names carried by the error (empty for schema faults).
    pub fn columns(&self) -> &[String] {
        match self {
            Self::MissingColumns { columns } => columns,
            Self::Schema(_) => &[],
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_message_lists_names() {
        let e = CoreError::missing(["Literacy", "Getting credit"]);
        assert_eq!(e.to_string(), "missing columns: Literacy, Getting credit");
        assert_eq!(e.columns().len(), 2);
    }
}
