use thiserror::Error;

use crate::data::model::ColumnType;

/// Errors raised by the dashboard's data and callback layers.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("column '{column}' in table '{table}' is {found}, expected {expected}")]
    ColumnTypeMismatch {
        table: String,
        column: String,
        expected: String,
        found: ColumnType,
    },

    #[error("table '{table}' has a null '{column}' at row {row}")]
    NullDate {
        table: String,
        column: String,
        row: usize,
    },

    #[error("table '{table}': column '{column}' has {found} rows, expected {expected}")]
    RaggedColumn {
        table: String,
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("table '{table}' declares column '{column}' twice")]
    DuplicateColumn { table: String, column: String },

    #[error("property '{0}' is written by more than one callback")]
    DuplicateOutput(String),

    #[error("callbacks form a cycle through {0:?}")]
    CallbackCycle(Vec<String>),

    #[error("callback '{callback}' returned {found} values for {expected} outputs")]
    OutputArity {
        callback: String,
        expected: usize,
        found: usize,
    },

    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    #[error("property '{prop}' cannot hold a {kind} value")]
    PropValueMismatch { prop: String, kind: &'static str },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
