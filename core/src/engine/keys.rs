//! Key manager (§4.F, component F): primary-key allocation and per-table uniqueness tracking.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::rngs::StdRng;

use crate::config::GenerateOptions;
use crate::error::GenerationWarning;
use crate::expr::ExprCache;
use crate::model::{GeneratedData, Row, Table, Value};
use crate::synth;
use crate::types::TypeFamily;

/// A hashable stand-in for `Value`, used as the key of a `unique_index` set. Floats are
/// compared by bit pattern, which is fine here since we never synthesize NaN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Null,
    Int(i64),
    Bits(u64),
    Text(String),
    Bool(bool),
}

impl From<&Value> for ValueKey {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => ValueKey::Null,
            Value::Int(i) => ValueKey::Int(*i),
            Value::Real(r) => ValueKey::Bits(r.to_bits()),
            Value::Bool(b) => ValueKey::Bool(*b),
            other => ValueKey::Text(other.as_text()),
        }
    }
}

pub fn row_key(row: &Row, columns: &[String]) -> Vec<ValueKey> {
    columns.iter().map(|c| row.get(c.as_str()).map(ValueKey::from).unwrap_or(ValueKey::Null)).collect()
}

/// Tracks which PK/UNIQUE tuples have already been emitted for one table.
pub struct UniqueTracker {
    pub pk_columns: Vec<String>,
    pub pk_seen: HashSet<Vec<ValueKey>>,
    pub unique_constraints: Vec<Vec<String>>,
    pub unique_seen: Vec<HashSet<Vec<ValueKey>>>,
}

impl UniqueTracker {
    pub fn new(table: &Table) -> Self {
        Self {
            pk_columns: table.primary_key.clone(),
            pk_seen: HashSet::new(),
            unique_seen: table.unique_constraints.iter().map(|_| HashSet::new()).collect(),
            unique_constraints: table.unique_constraints.clone(),
        }
    }

    pub fn pk_contains(&self, row: &Row) -> bool {
        !self.pk_columns.is_empty() && self.pk_seen.contains(&row_key(row, &self.pk_columns))
    }

    pub fn pk_insert(&mut self, row: &Row) {
        if !self.pk_columns.is_empty() {
            self.pk_seen.insert(row_key(row, &self.pk_columns));
        }
    }

    pub fn unique_contains(&self, idx: usize, row: &Row) -> bool {
        self.unique_seen[idx].contains(&row_key(row, &self.unique_constraints[idx]))
    }

    pub fn unique_insert(&mut self, idx: usize, row: &Row) {
        self.unique_seen[idx].insert(row_key(row, &self.unique_constraints[idx]));
    }
}

fn is_integer_like(table: &Table, column: &str) -> bool {
    table
        .column(column)
        .is_some_and(|c| matches!(TypeFamily::classify(&c.sql_type), TypeFamily::Integer { .. }))
}

/// Allocate `n` rows carrying only primary-key columns, per §4.F.
pub fn allocate_rows(
    table: &Table,
    n: usize,
    generated: &GeneratedData,
    cache: &ExprCache,
    options: &GenerateOptions,
    rng: &mut StdRng,
    pk_counters: &mut HashMap<String, i64>,
    warnings: &mut Vec<GenerationWarning>,
) -> Vec<Row> {
    if table.primary_key.is_empty() {
        return (0..n).map(|_| Row::new()).collect();
    }

    if table.primary_key.len() == 1 {
        let pk_col = &table.primary_key[0];
        if is_integer_like(table, pk_col) {
            let start = *pk_counters.entry(table.name.clone()).or_insert(1);
            *pk_counters.get_mut(&table.name).unwrap() += n as i64;
            return (0..n)
                .map(|i| {
                    let mut row = Row::new();
                    row.insert(pk_col.clone(), Value::Int(start + i as i64));
                    row
                })
                .collect();
        }

        let column = table.column(pk_col).expect("primary key column exists");
        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(n);
        let budget = n.saturating_mul(options.unique_retry_budget).max(options.unique_retry_budget);
        let mut attempts = 0;
        while rows.len() < n && attempts < budget {
            attempts += 1;
            let checks: Vec<&str> = table.checks_mentioning(pk_col);
            let mut row = Row::new();
            let value = synth::generate(cache, &table.name, column, &row, &checks, options, rng, None);
            let key = ValueKey::from(&value);
            if seen.insert(key) {
                row.insert(pk_col.clone(), value);
                rows.push(row);
            }
        }
        if rows.len() < n {
            warnings.push(GenerationWarning::PrimaryKeyCapacity {
                table: table.name.clone(),
                requested: n,
                available: rows.len(),
            });
        }
        return rows;
    }

    allocate_composite(table, n, generated, cache, options, rng, warnings)
}

fn allocate_composite(
    table: &Table,
    n: usize,
    generated: &GeneratedData,
    cache: &ExprCache,
    options: &GenerateOptions,
    rng: &mut StdRng,
    warnings: &mut Vec<GenerationWarning>,
) -> Vec<Row> {
    let mut pools: Vec<(String, Vec<Value>)> = Vec::new();

    for pk_col in &table.primary_key {
        let fk = table.foreign_keys.iter().find(|fk| fk.columns.len() == 1 && fk.columns[0] == *pk_col);
        let pool = if let Some(fk) = fk {
            generated
                .get(&fk.ref_table)
                .map(|rows| {
                    rows.iter()
                        .filter_map(|r| r.get(&fk.ref_columns[0]).cloned())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        } else {
            let column = table.column(pk_col).expect("primary key column exists");
            let checks: Vec<&str> = table.checks_mentioning(pk_col);
            let empty_row = Row::new();
            let mut clone_rng = rng.clone();
            (0..n.max(1))
                .map(|_| synth::generate(cache, &table.name, column, &empty_row, &checks, options, &mut clone_rng, None))
                .collect()
        };
        pools.push((pk_col.clone(), pool));
    }

    // bound the product size to avoid blowing up memory on wide composite keys
    let mut combos: Vec<Row> = vec![Row::new()];
    for (col, pool) in &pools {
        if pool.is_empty() {
            combos.clear();
            break;
        }
        let mut next = Vec::with_capacity(combos.len() * pool.len().min(n.max(1)));
        'outer: for base in &combos {
            for v in pool.iter().take(n.max(1)) {
                let mut row = base.clone();
                row.insert(col.clone(), v.clone());
                next.push(row);
                if next.len() >= n.saturating_mul(4).max(n) {
                    break 'outer;
                }
            }
        }
        combos = next;
    }

    let mut seen = HashSet::new();
    combos.retain(|row| seen.insert(row_key(row, &table.primary_key)));
    combos.shuffle(rng);
    combos.truncate(n);

    if combos.len() < n {
        warnings.push(GenerationWarning::PrimaryKeyCapacity {
            table: table.name.clone(),
            requested: n,
            available: combos.len(),
        });
    }

    combos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;

    #[test]
    fn allocates_contiguous_integer_pks() {
        let mut table = Table::new("users");
        table.columns.push(Column::new("id", "SERIAL"));
        table.primary_key.push("id".to_string());
        let cache = ExprCache::new();
        let options = GenerateOptions::default();
        let mut rng = crate::rng::table_rng(1, "users");
        let mut counters = HashMap::new();
        let mut warnings = Vec::new();
        let data = GeneratedData::new();
        let rows = allocate_rows(&table, 5, &data, &cache, &options, &mut rng, &mut counters, &mut warnings);
        let values: Vec<i64> = rows.iter().map(|r| match r["id"] {
            Value::Int(i) => i,
            _ => panic!("expected int"),
        }).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn empty_primary_key_yields_empty_rows() {
        let table = Table::new("no_pk");
        let cache = ExprCache::new();
        let options = GenerateOptions::default();
        let mut rng = crate::rng::table_rng(1, "no_pk");
        let mut counters = HashMap::new();
        let mut warnings = Vec::new();
        let data = GeneratedData::new();
        let rows = allocate_rows(&table, 3, &data, &cache, &options, &mut rng, &mut counters, &mut warnings);
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_empty());
    }

    #[test]
    fn unique_tracker_detects_collisions() {
        let mut table = Table::new("t");
        table.columns.push(Column::new("id", "INT"));
        table.primary_key.push("id".to_string());
        let mut tracker = UniqueTracker::new(&table);
        let mut row = Row::new();
        row.insert("id".to_string(), Value::Int(1));
        assert!(!tracker.pk_contains(&row));
        tracker.pk_insert(&row);
        assert!(tracker.pk_contains(&row));
    }
}
