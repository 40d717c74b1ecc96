//! Warning types and codes for the generation diagnostics system.

/// Severity levels for generation warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Minor change with no semantic loss.
    Info,
    /// A constraint was only partially satisfied (e.g., fewer rows than requested).
    Lossy,
    /// A constraint could not be satisfied at all for some rows.
    Unsupported,
    /// Generation failure.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Lossy => write!(f, "lossy"),
            Severity::Unsupported => write!(f, "unsupported"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A generation warning or diagnostic message.
#[derive(Debug, Clone)]
pub struct Warning {
    /// Warning code (e.g., "PRIMARY_KEY_CAPACITY", "CHECK_BUDGET_EXHAUSTED").
    pub code: &'static str,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Optional object identifier (table, column, row index).
    pub object: Option<String>,
}

impl Warning {
    pub fn new(code: &'static str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            object: None,
        }
    }

    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(obj) = &self.object {
            write!(f, "[{}] {}: {}", self.code, obj, self.message)
        } else {
            write!(f, "[{}] {}", self.code, self.message)
        }
    }
}

impl From<&crate::error::GenerationWarning> for Warning {
    fn from(w: &crate::error::GenerationWarning) -> Self {
        use crate::error::GenerationWarning as G;
        match w {
            G::PrimaryKeyCapacity { table, .. } => {
                Warning::new(PRIMARY_KEY_CAPACITY, Severity::Lossy, w.to_string()).with_object(table.clone())
            }
            G::CheckBudgetExhausted { table, .. } => {
                Warning::new(CHECK_BUDGET_EXHAUSTED, Severity::Unsupported, w.to_string()).with_object(table.clone())
            }
            G::UniqueBudgetExhausted { table, .. } => {
                Warning::new(UNIQUE_BUDGET_EXHAUSTED, Severity::Unsupported, w.to_string()).with_object(table.clone())
            }
        }
    }
}

// Warning code constants

// Key-manager / row-engine warnings (§4.F, §4.G)
pub const PRIMARY_KEY_CAPACITY: &str = "PRIMARY_KEY_CAPACITY";
pub const CHECK_BUDGET_EXHAUSTED: &str = "CHECK_BUDGET_EXHAUSTED";
pub const UNIQUE_BUDGET_EXHAUSTED: &str = "UNIQUE_BUDGET_EXHAUSTED";

// Expression parsing/evaluation warnings (§4.A-C)
pub const CHECK_PARSE_FAILED: &str = "CHECK_PARSE_FAILED";
pub const CHECK_FUNCTION_UNSUPPORTED: &str = "CHECK_FUNCTION_UNSUPPORTED";

// Repair pass warnings (§4.H)
pub const ROW_REMOVED_BY_REPAIR: &str = "ROW_REMOVED_BY_REPAIR";
pub const CASCADE_DELETE: &str = "CASCADE_DELETE";
