//! Error and warning taxonomy (§7).
//!
//! `SchemaError` is fatal and aborts generation. `ExprError`/`EvalError` degrade a CHECK
//! to always-false rather than propagating — they still implement `std::error::Error` so
//! they can be logged and unit-tested directly. `GenerationWarning` is never returned as
//! an `Err`; it is collected into the result alongside the generated data.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("circular foreign-key dependency among tables: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    #[error("table '{table}' references unknown table '{referenced}'")]
    UnknownRefTable { table: String, referenced: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    #[error("failed to parse CHECK expression '{src}': {message}")]
    ParseFailure { src: String, message: String },

    #[error("unsupported function '{name}' in CHECK expression")]
    UnsupportedFunction { name: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: String },

    #[error(transparent)]
    Expr(#[from] ExprError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationWarning {
    PrimaryKeyCapacity {
        table: String,
        requested: usize,
        available: usize,
    },
    CheckBudgetExhausted {
        table: String,
        row_index: usize,
    },
    UniqueBudgetExhausted {
        table: String,
        row_index: usize,
    },
}

impl std::fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationWarning::PrimaryKeyCapacity {
                table,
                requested,
                available,
            } => write!(
                f,
                "table '{table}': requested {requested} primary-key values but only {available} distinct combinations exist"
            ),
            GenerationWarning::CheckBudgetExhausted { table, row_index } => write!(
                f,
                "table '{table}' row {row_index}: CHECK retry budget exhausted, row will be dropped in repair"
            ),
            GenerationWarning::UniqueBudgetExhausted { table, row_index } => write!(
                f,
                "table '{table}' row {row_index}: UNIQUE retry budget exhausted, row will be dropped in repair"
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Strict(#[from] crate::diagnostics::StrictViolation),
}
