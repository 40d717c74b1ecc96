//! Generation options (§6, §13).

use std::collections::HashMap;
use std::sync::Arc;

use rand::RngCore;

use crate::model::{Row, Value};

/// A caller-supplied value generator: `(rng, current row) -> value`.
pub type GeneratorFn = Arc<dyn Fn(&mut dyn RngCore, &Row) -> Value + Send + Sync>;

/// One entry of `column_type_mappings`: either a named built-in atomic generator
/// (§4.D "built-in atomic generators") or an arbitrary closure.
#[derive(Clone)]
pub enum ColumnGenerator {
    Named(String),
    Custom(GeneratorFn),
}

impl std::fmt::Debug for ColumnGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnGenerator::Named(name) => f.debug_tuple("Named").field(name).finish(),
            ColumnGenerator::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One entry of `predefined_values`: a scalar or a list to choose from uniformly.
#[derive(Debug, Clone)]
pub enum PredefinedValue {
    Scalar(Value),
    Choices(Vec<Value>),
}

/// `predefined_values[table][col]` plus a `global[col]` fallback bucket.
#[derive(Debug, Clone, Default)]
pub struct PredefinedValues {
    pub per_table: HashMap<String, HashMap<String, PredefinedValue>>,
    pub global: HashMap<String, PredefinedValue>,
}

impl PredefinedValues {
    pub fn lookup(&self, table: &str, column: &str) -> Option<&PredefinedValue> {
        self.per_table
            .get(table)
            .and_then(|cols| cols.get(column))
            .or_else(|| self.global.get(column))
    }

    pub fn set_table(&mut self, table: impl Into<String>, column: impl Into<String>, value: PredefinedValue) {
        self.per_table
            .entry(table.into())
            .or_default()
            .insert(column.into(), value);
    }

    pub fn set_global(&mut self, column: impl Into<String>, value: PredefinedValue) {
        self.global.insert(column.into(), value);
    }
}

/// `column_type_mappings[table][col]`.
#[derive(Debug, Clone, Default)]
pub struct ColumnMappings {
    pub per_table: HashMap<String, HashMap<String, ColumnGenerator>>,
}

impl ColumnMappings {
    pub fn lookup(&self, table: &str, column: &str) -> Option<&ColumnGenerator> {
        self.per_table.get(table).and_then(|cols| cols.get(column))
    }

    pub fn set(&mut self, table: impl Into<String>, column: impl Into<String>, r#gen: ColumnGenerator) {
        self.per_table
            .entry(table.into())
            .or_default()
            .insert(column.into(), r#gen);
    }
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub num_rows: usize,
    pub num_rows_per_table: HashMap<String, usize>,
    pub predefined_values: PredefinedValues,
    pub column_type_mappings: ColumnMappings,
    pub max_rows_per_insert: usize,
    pub run_repair: bool,
    pub seed: u64,
    pub check_retry_budget: usize,
    pub unique_retry_budget: usize,
    pub strict: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            num_rows: 10,
            num_rows_per_table: HashMap::new(),
            predefined_values: PredefinedValues::default(),
            column_type_mappings: ColumnMappings::default(),
            max_rows_per_insert: 1000,
            run_repair: true,
            seed: 0x524f_5753_4d49_5448, // "ROWSMITH" folded into a u64, arbitrary but fixed
            check_retry_budget: 500,
            unique_retry_budget: 50,
            strict: false,
        }
    }
}

impl GenerateOptions {
    pub fn rows_for(&self, table: &str) -> usize {
        self.num_rows_per_table.get(table).copied().unwrap_or(self.num_rows)
    }
}
