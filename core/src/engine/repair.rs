//! Repair pass (§4.H, component H): final cascading revalidation sweep.

use std::collections::{HashMap, HashSet, VecDeque};

use super::keys::{row_key, ValueKey};
use crate::diagnostics::warning::{CASCADE_DELETE, ROW_REMOVED_BY_REPAIR};
use crate::diagnostics::{Severity, Warning};
use crate::expr::eval;
use crate::expr::ExprCache;
use crate::model::{GeneratedData, Schema, Table, Value};

/// Revalidate every row against its table's constraints, dropping invalid rows and
/// cascading the delete to every table that references the dropped row by foreign key.
/// `order` is the dependency-resolved table order (parents before children); children are
/// re-swept whenever a parent sweep removes rows they point to.
pub fn repair(schema: &Schema, data: &mut GeneratedData, cache: &ExprCache, order: &[String]) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let mut children: HashMap<String, Vec<String>> = HashMap::new();
    for (name, table) in &schema.tables {
        for fk in &table.foreign_keys {
            children.entry(fk.ref_table.clone()).or_default().push(name.clone());
        }
    }

    let mut dirty: VecDeque<String> = order.iter().cloned().collect();
    let mut queued: HashSet<String> = dirty.iter().cloned().collect();

    while let Some(name) = dirty.pop_front() {
        queued.remove(&name);
        let Some(table) = schema.tables.get(&name) else { continue };
        let deleted_keys = sweep_table(table, data, cache, &mut warnings);
        if deleted_keys.is_empty() {
            continue;
        }
        tracing::debug!(table = %name, removed = deleted_keys.len(), "repair removed rows failing revalidation");
        let Some(kids) = children.get(&name) else { continue };
        for child_name in kids {
            let Some(child_table) = schema.tables.get(child_name) else { continue };
            let removed = cascade_delete(child_table, &name, &deleted_keys, data, &mut warnings);
            if removed {
                tracing::debug!(table = %child_name, parent = %name, "cascaded delete to child table");
                if queued.insert(child_name.clone()) {
                    dirty.push_back(child_name.clone());
                }
            }
        }
    }

    warnings
}

fn sweep_table(table: &Table, data: &mut GeneratedData, cache: &ExprCache, warnings: &mut Vec<Warning>) -> HashSet<Vec<ValueKey>> {
    let Some(rows) = data.get(&table.name) else { return HashSet::new() };
    let mut valid = vec![true; rows.len()];

    for (i, row) in rows.iter().enumerate() {
        for column in &table.columns {
            if table.is_not_null(&column.name) && row.get(&column.name).is_none_or(Value::is_null) {
                valid[i] = false;
            }
        }
    }

    for (i, row) in rows.iter().enumerate() {
        if !valid[i] {
            continue;
        }
        for check_src in &table.check_constraints {
            let ok = match cache.parse(check_src) {
                Ok(expr) => eval::eval_bool(&expr, row),
                Err(_) => false,
            };
            if !ok {
                valid[i] = false;
                break;
            }
        }
    }

    let mut constraint_sets: Vec<&Vec<String>> = Vec::new();
    if !table.primary_key.is_empty() {
        constraint_sets.push(&table.primary_key);
    }
    for uc in &table.unique_constraints {
        constraint_sets.push(uc);
    }
    for cols in constraint_sets {
        let mut seen: HashSet<Vec<ValueKey>> = HashSet::new();
        for (i, row) in rows.iter().enumerate() {
            if !valid[i] {
                continue;
            }
            let key = row_key(row, cols);
            if key.iter().any(|k| matches!(k, ValueKey::Null)) {
                continue;
            }
            if !seen.insert(key) {
                valid[i] = false;
            }
        }
    }

    let mut deleted_keys = HashSet::new();
    let mut kept = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if valid[i] {
            kept.push(row.clone());
            continue;
        }
        if !table.primary_key.is_empty() {
            deleted_keys.insert(row_key(row, &table.primary_key));
        }
        warnings.push(
            Warning::new(ROW_REMOVED_BY_REPAIR, Severity::Lossy, "row removed: failed constraint revalidation")
                .with_object(format!("{}[{i}]", table.name)),
        );
    }

    data.insert(table.name.clone(), kept);
    deleted_keys
}

fn cascade_delete(
    child_table: &Table,
    parent_name: &str,
    deleted_parent_keys: &HashSet<Vec<ValueKey>>,
    data: &mut GeneratedData,
    warnings: &mut Vec<Warning>,
) -> bool {
    let Some(rows) = data.get(&child_table.name) else { return false };
    let fks: Vec<&crate::model::ForeignKey> = child_table.foreign_keys.iter().filter(|fk| fk.ref_table == parent_name).collect();
    if fks.is_empty() {
        return false;
    }

    let mut kept = Vec::with_capacity(rows.len());
    let mut removed_any = false;
    for row in rows {
        let should_delete = fks.iter().any(|fk| deleted_parent_keys.contains(&row_key(row, &fk.columns)));
        if should_delete {
            removed_any = true;
            warnings.push(
                Warning::new(CASCADE_DELETE, Severity::Lossy, format!("row removed: parent '{parent_name}' row deleted"))
                    .with_object(child_table.name.clone()),
            );
        } else {
            kept.push(row.clone());
        }
    }

    if removed_any {
        data.insert(child_table.name.clone(), kept);
    }
    removed_any
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, ForeignKey, Row};

    #[test]
    fn removes_row_failing_not_null() {
        let mut table = Table::new("t");
        table.columns.push(Column::new("name", "TEXT").not_null());
        let mut schema = Schema::new();
        schema.insert(table);

        let mut data = GeneratedData::new();
        let mut row = Row::new();
        row.insert("name".to_string(), Value::Null);
        data.insert("t".to_string(), vec![row]);

        let cache = ExprCache::new();
        let warnings = repair(&schema, &mut data, &cache, &["t".to_string()]);
        assert!(data["t"].is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn cascades_delete_to_child_table() {
        let mut users = Table::new("users");
        users.columns.push(Column::new("id", "INT"));
        users.primary_key.push("id".into());
        users.check_constraints.push("id > 0".to_string());

        let mut orders = Table::new("orders");
        orders.columns.push(Column::new("user_id", "INT"));
        orders.foreign_keys.push(ForeignKey {
            columns: vec!["user_id".into()],
            ref_table: "users".into(),
            ref_columns: vec!["id".into()],
        });

        let mut schema = Schema::new();
        schema.insert(users);
        schema.insert(orders);

        let mut data = GeneratedData::new();
        let mut bad_user = Row::new();
        bad_user.insert("id".to_string(), Value::Int(-1));
        data.insert("users".to_string(), vec![bad_user]);

        let mut order_row = Row::new();
        order_row.insert("user_id".to_string(), Value::Int(-1));
        data.insert("orders".to_string(), vec![order_row]);

        let cache = ExprCache::new();
        repair(&schema, &mut data, &cache, &["users".to_string(), "orders".to_string()]);
        assert!(data["users"].is_empty());
        assert!(data["orders"].is_empty());
    }

    #[test]
    fn null_unique_values_do_not_collide() {
        let mut table = Table::new("t");
        table.columns.push(Column::new("email", "TEXT"));
        table.unique_constraints.push(vec!["email".to_string()]);
        let mut schema = Schema::new();
        schema.insert(table);

        let mut data = GeneratedData::new();
        let mut r1 = Row::new();
        r1.insert("email".to_string(), Value::Null);
        let mut r2 = Row::new();
        r2.insert("email".to_string(), Value::Null);
        data.insert("t".to_string(), vec![r1, r2]);

        let cache = ExprCache::new();
        let warnings = repair(&schema, &mut data, &cache, &["t".to_string()]);
        assert_eq!(data["t"].len(), 2);
        assert!(warnings.is_empty());
    }
}
