//! Row engine (§4.G, component G): the per-row fill-and-enforce pipeline.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::keys::{self, UniqueTracker};
use crate::config::GenerateOptions;
use crate::error::GenerationWarning;
use crate::expr::eval;
use crate::expr::hints;
use crate::expr::ExprCache;
use crate::model::{GeneratedData, Row, Table};
use crate::synth;

pub fn generate_table(
    table: &Table,
    generated: &GeneratedData,
    cache: &ExprCache,
    options: &GenerateOptions,
    rng: &mut StdRng,
    pk_counters: &mut HashMap<String, i64>,
    auto_increment_counters: &mut HashMap<(String, String), i64>,
) -> (Vec<Row>, Vec<GenerationWarning>) {
    let mut warnings = Vec::new();
    let n = options.rows_for(&table.name);
    let mut rows = keys::allocate_rows(table, n, generated, cache, options, rng, pk_counters, &mut warnings);
    let mut tracker = UniqueTracker::new(table);

    for (i, row) in rows.iter_mut().enumerate() {
        assign_foreign_keys(table, row, generated, rng);
        fill_remaining_columns(table, row, cache, options, rng, auto_increment_counters);
        enforce_not_null(table, row, cache, options, rng);
        enforce_check(table, row, cache, options, rng, &mut warnings, i);
        enforce_unique(table, row, &mut tracker, cache, options, rng, &mut warnings, i);
    }

    (rows, warnings)
}

fn assign_foreign_keys(table: &Table, row: &mut Row, generated: &GeneratedData, rng: &mut StdRng) {
    for fk in &table.foreign_keys {
        let Some(ref_rows) = generated.get(&fk.ref_table) else { continue };
        if ref_rows.is_empty() {
            continue;
        }

        let set_flags: Vec<bool> = fk.columns.iter().map(|c| row.contains_key(c)).collect();
        let all_set = set_flags.iter().all(|&b| b);
        let none_set = set_flags.iter().all(|&b| !b);

        if all_set {
            let matches = |r: &Row| fk.columns.iter().zip(&fk.ref_columns).all(|(c, rc)| r.get(rc) == row.get(c));
            if ref_rows.iter().any(matches) {
                continue;
            }
            let parent = ref_rows.choose(rng).expect("non-empty parent rows");
            copy_fk_values(fk, row, parent);
        } else if none_set {
            let parent = ref_rows.choose(rng).expect("non-empty parent rows");
            copy_fk_values(fk, row, parent);
        } else {
            let set_pairs: Vec<(&String, &String)> =
                fk.columns.iter().zip(&fk.ref_columns).filter(|(c, _)| row.contains_key(*c)).collect();
            let candidate = ref_rows
                .iter()
                .filter(|r| set_pairs.iter().all(|(c, rc)| r.get(*rc) == row.get(*c)))
                .collect::<Vec<_>>()
                .choose(rng)
                .copied()
                .unwrap_or_else(|| ref_rows.choose(rng).expect("non-empty parent rows"));
            copy_fk_values(fk, row, candidate);
        }
    }
}

fn copy_fk_values(fk: &crate::model::ForeignKey, row: &mut Row, parent: &Row) {
    for (c, rc) in fk.columns.iter().zip(&fk.ref_columns) {
        if let Some(v) = parent.get(rc) {
            row.insert(c.clone(), v.clone());
        }
    }
}

fn fill_remaining_columns(
    table: &Table,
    row: &mut Row,
    cache: &ExprCache,
    options: &GenerateOptions,
    rng: &mut StdRng,
    auto_increment_counters: &mut HashMap<(String, String), i64>,
) {
    for column in &table.columns {
        if row.contains_key(&column.name) {
            continue;
        }
        if column.is_auto_increment {
            let key = (table.name.clone(), column.name.clone());
            let counter = auto_increment_counters.entry(key).or_insert(1);
            row.insert(column.name.clone(), crate::model::Value::Int(*counter));
            *counter += 1;
            continue;
        }
        let checks = table.checks_mentioning(&column.name);
        let value = synth::generate(cache, &table.name, column, row, &checks, options, rng, None);
        row.insert(column.name.clone(), value);
    }
}

fn enforce_not_null(table: &Table, row: &mut Row, cache: &ExprCache, options: &GenerateOptions, rng: &mut StdRng) {
    for column in &table.columns {
        if !table.is_not_null(&column.name) {
            continue;
        }
        let absent = row.get(&column.name).is_none_or(|v| v.is_null());
        if absent {
            let checks = table.checks_mentioning(&column.name);
            let value = synth::generate(cache, &table.name, column, row, &checks, options, rng, None);
            row.insert(column.name.clone(), value);
        }
    }
}

fn enforce_check(
    table: &Table,
    row: &mut Row,
    cache: &ExprCache,
    options: &GenerateOptions,
    rng: &mut StdRng,
    warnings: &mut Vec<GenerationWarning>,
    row_index: usize,
) {
    for _ in 0..options.check_retry_budget {
        let mut any_failing = false;
        for check_src in &table.check_constraints {
            let parsed = cache.parse(check_src);
            let ok = matches!(&parsed, Ok(expr) if eval::eval_bool(expr, row));
            if ok {
                continue;
            }
            any_failing = true;
            let Ok(expr) = parsed else { continue };
            for column in &table.columns {
                if !table.checks_mentioning(&column.name).contains(&check_src.as_str()) {
                    continue;
                }
                let column_hints = hints::extract_conditions(&expr, &column.name);
                let all_checks = table.checks_mentioning(&column.name);
                let value = synth::generate(cache, &table.name, column, row, &all_checks, options, rng, Some(&column_hints));
                row.insert(column.name.clone(), value);
            }
        }
        if !any_failing {
            return;
        }
    }
    warnings.push(GenerationWarning::CheckBudgetExhausted { table: table.name.clone(), row_index });
}

fn enforce_unique(
    table: &Table,
    row: &mut Row,
    tracker: &mut UniqueTracker,
    cache: &ExprCache,
    options: &GenerateOptions,
    rng: &mut StdRng,
    warnings: &mut Vec<GenerationWarning>,
    row_index: usize,
) {
    if !table.primary_key.is_empty() {
        let mut attempts = 0;
        while tracker.pk_contains(row) && attempts < options.unique_retry_budget {
            regenerate_non_fk(table, &table.primary_key, row, cache, options, rng);
            attempts += 1;
        }
        if tracker.pk_contains(row) {
            warnings.push(GenerationWarning::UniqueBudgetExhausted { table: table.name.clone(), row_index });
        } else {
            tracker.pk_insert(row);
        }
    }

    for idx in 0..table.unique_constraints.len() {
        let cols = table.unique_constraints[idx].clone();
        let mut attempts = 0;
        while tracker.unique_contains(idx, row) && attempts < options.unique_retry_budget {
            regenerate_non_fk(table, &cols, row, cache, options, rng);
            attempts += 1;
        }
        if tracker.unique_contains(idx, row) {
            warnings.push(GenerationWarning::UniqueBudgetExhausted { table: table.name.clone(), row_index });
        } else {
            tracker.unique_insert(idx, row);
        }
    }
}

fn regenerate_non_fk(
    table: &Table,
    columns: &[String],
    row: &mut Row,
    cache: &ExprCache,
    options: &GenerateOptions,
    rng: &mut StdRng,
) {
    let fk_columns: HashSet<&str> = table.foreign_keys.iter().flat_map(|fk| fk.columns.iter().map(String::as_str)).collect();
    for col_name in columns {
        if fk_columns.contains(col_name.as_str()) {
            continue;
        }
        let Some(column) = table.column(col_name) else { continue };
        let checks = table.checks_mentioning(col_name);
        let value = synth::generate(cache, &table.name, column, row, &checks, options, rng, None);
        row.insert(col_name.clone(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, ForeignKey, Value};

    #[test]
    fn fills_not_null_column_left_unset() {
        let mut table = Table::new("t");
        table.columns.push(Column::new("name", "TEXT").not_null());
        let cache = ExprCache::new();
        let options = GenerateOptions::default();
        let mut rng = crate::rng::table_rng(1, "t");
        let mut row = Row::new();
        enforce_not_null(&table, &mut row, &cache, &options, &mut rng);
        assert!(!row["name"].is_null());
    }

    #[test]
    fn assigns_foreign_key_from_parent_table() {
        let mut users = Table::new("users");
        users.columns.push(Column::new("id", "INT"));
        users.primary_key.push("id".into());

        let mut orders = Table::new("orders");
        orders.columns.push(Column::new("user_id", "INT"));
        orders.foreign_keys.push(ForeignKey {
            columns: vec!["user_id".into()],
            ref_table: "users".into(),
            ref_columns: vec!["id".into()],
        });

        let mut generated = GeneratedData::new();
        let mut parent_row = Row::new();
        parent_row.insert("id".to_string(), Value::Int(42));
        generated.insert("users".to_string(), vec![parent_row]);

        let mut rng = crate::rng::table_rng(1, "orders");
        let mut row = Row::new();
        assign_foreign_keys(&orders, &mut row, &generated, &mut rng);
        assert_eq!(row["user_id"], Value::Int(42));
    }

    #[test]
    fn enforce_check_repairs_simple_violation() {
        let mut table = Table::new("t");
        table.columns.push(Column::new("x", "INT"));
        table.check_constraints.push("x > 0".to_string());
        let cache = ExprCache::new();
        let mut options = GenerateOptions::default();
        options.check_retry_budget = 50;
        let mut rng = crate::rng::table_rng(1, "t");
        let mut row = Row::new();
        row.insert("x".to_string(), Value::Int(-5));
        let mut warnings = Vec::new();
        enforce_check(&table, &mut row, &cache, &options, &mut rng, &mut warnings, 0);
        let expr = cache.parse("x > 0").unwrap();
        assert!(eval::eval_bool(&expr, &row));
    }

    #[test]
    fn enforce_unique_resolves_pk_collision() {
        let mut table = Table::new("t");
        table.columns.push(Column::new("id", "INT"));
        table.primary_key.push("id".into());
        let cache = ExprCache::new();
        let options = GenerateOptions::default();
        let mut rng = crate::rng::table_rng(1, "t");
        let mut tracker = UniqueTracker::new(&table);
        let mut first = Row::new();
        first.insert("id".to_string(), Value::Int(1));
        tracker.pk_insert(&first);

        let mut second = Row::new();
        second.insert("id".to_string(), Value::Int(1));
        let mut warnings = Vec::new();
        enforce_unique(&table, &mut second, &mut tracker, &cache, &options, &mut rng, &mut warnings, 1);
        assert_ne!(second["id"], Value::Int(1));
    }
}
