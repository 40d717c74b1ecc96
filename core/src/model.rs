//! Schema and generated-data types.
//!
//! The schema is produced by an external DDL parser and consumed here as-is;
//! this crate never lexes `CREATE TABLE` itself.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A relational schema: table name -> table definition, insertion-ordered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub tables: IndexMap<String, Table>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub unique_constraints: Vec<Vec<String>>,
    #[serde(default)]
    pub check_constraints: Vec<String>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique_constraints: Vec::new(),
            check_constraints: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_not_null(&self, col: &str) -> bool {
        self.primary_key.iter().any(|c| c == col) || self.column(col).is_some_and(|c| c.not_null)
    }

    /// Check constraints (table- or column-level) that mention `col` as a whole identifier.
    /// Column-level CHECKs are expected to already be hoisted into `check_constraints` by
    /// whoever built this `Table` — flattening them is the external parser's job.
    pub fn checks_mentioning<'a>(&'a self, col: &str) -> Vec<&'a str> {
        self.check_constraints
            .iter()
            .filter(|c| mentions_identifier(c, col))
            .map(String::as_str)
            .collect()
    }
}

fn mentions_identifier(expr: &str, ident: &str) -> bool {
    let bytes = expr.as_bytes();
    let ident_bytes = ident.as_bytes();
    let mut start = 0;
    while let Some(pos) = expr[start..].find(ident) {
        let idx = start + pos;
        let before_ok = idx == 0 || !is_ident_byte(bytes[idx - 1]);
        let after = idx + ident_bytes.len();
        let after_ok = after >= bytes.len() || !is_ident_byte(bytes[after]);
        if before_ok && after_ok {
            return true;
        }
        start = idx + 1;
    }
    false
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub sql_type: String,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub is_auto_increment: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            is_auto_increment: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
}

/// A single generated column value. Comparisons during CHECK evaluation unify operands
/// between these variants (see `expr::eval::unify`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Real(f64),
    Bool(bool),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Int(i) => i.hash(state),
            Value::Real(r) => r.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Text(s) => s.hash(state),
            Value::Date(d) => d.hash(state),
            Value::DateTime(dt) => dt.hash(state),
            Value::Time(t) => t.hash(state),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Int(i) => i.to_string(),
            Value::Real(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Text(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Time(t) => t.format("%H:%M:%S").to_string(),
        }
    }
}

pub type Row = IndexMap<String, Value>;
pub type GeneratedData = IndexMap<String, Vec<Row>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checks_mentioning_matches_whole_identifiers_only() {
        let mut t = Table::new("t");
        t.check_constraints.push("x > 0 AND x < y".to_string());
        t.check_constraints.push("xx > 0".to_string());
        assert_eq!(t.checks_mentioning("x").len(), 1);
        assert_eq!(t.checks_mentioning("y").len(), 1);
        assert_eq!(t.checks_mentioning("xx").len(), 1);
    }

    #[test]
    fn not_null_implied_by_primary_key() {
        let mut t = Table::new("t");
        t.columns.push(Column::new("id", "INT"));
        t.primary_key.push("id".to_string());
        assert!(t.is_not_null("id"));
    }
}
