//! Dependency resolver (§4.E, component E).

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::SchemaError;
use crate::model::Schema;

/// Group tables into dependency levels: level 0 has no unresolved foreign keys into the
/// schema, level 1 depends only on level 0, and so on. Tables within a level can be
/// processed independently (§5). Self-referencing foreign keys do not count as a
/// dependency on a later level.
pub fn resolve_levels(schema: &Schema) -> Result<Vec<Vec<String>>, SchemaError> {
    let names: Vec<&String> = schema.tables.keys().collect();
    let index_of: HashMap<&str, usize> = names.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();

    let mut in_degree = vec![0usize; names.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); names.len()];

    for (i, name) in names.iter().enumerate() {
        let table = &schema.tables[*name];
        let mut deps: HashSet<usize> = HashSet::new();
        for fk in &table.foreign_keys {
            let Some(&dep_idx) = index_of.get(fk.ref_table.as_str()) else {
                return Err(SchemaError::UnknownRefTable {
                    table: table.name.clone(),
                    referenced: fk.ref_table.clone(),
                });
            };
            if dep_idx != i {
                deps.insert(dep_idx);
            }
        }
        for dep_idx in deps {
            dependents[dep_idx].push(i);
            in_degree[i] += 1;
        }
    }

    let mut levels: Vec<Vec<String>> = Vec::new();
    let mut remaining: usize = names.len();
    let mut ready: VecDeque<usize> = (0..names.len()).filter(|&i| in_degree[i] == 0).collect();

    while !ready.is_empty() {
        // insertion-order tie-break: preserve schema order within a level
        let mut level: Vec<usize> = ready.drain(..).collect();
        level.sort_unstable();
        remaining -= level.len();

        let mut next_ready = Vec::new();
        for &idx in &level {
            for &dep in &dependents[idx] {
                in_degree[dep] -= 1;
                if in_degree[dep] == 0 {
                    next_ready.push(dep);
                }
            }
        }
        levels.push(level.iter().map(|&i| names[i].clone()).collect());
        ready.extend(next_ready);
    }

    if remaining > 0 {
        let cycle: Vec<String> = (0..names.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| names[i].clone())
            .collect();
        return Err(SchemaError::CircularDependency { cycle });
    }

    Ok(levels)
}

/// Flatten dependency levels into a single processing order.
pub fn flatten(levels: &[Vec<String>]) -> Vec<String> {
    levels.iter().flatten().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, ForeignKey, Table};

    fn fk_table(name: &str, ref_table: &str) -> Table {
        let mut t = Table::new(name);
        t.columns.push(Column::new("ref_id", "INT"));
        t.foreign_keys.push(ForeignKey {
            columns: vec!["ref_id".to_string()],
            ref_table: ref_table.to_string(),
            ref_columns: vec!["id".to_string()],
        });
        t
    }

    #[test]
    fn independent_tables_form_one_level_in_insertion_order() {
        let mut schema = Schema::new();
        schema.insert(Table::new("c"));
        schema.insert(Table::new("a"));
        schema.insert(Table::new("b"));
        let levels = resolve_levels(&schema).unwrap();
        assert_eq!(levels, vec![vec!["c".to_string(), "a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn dependent_table_lands_in_later_level() {
        let mut schema = Schema::new();
        schema.insert(Table::new("users"));
        schema.insert(fk_table("orders", "users"));
        let levels = resolve_levels(&schema).unwrap();
        assert_eq!(levels, vec![vec!["users".to_string()], vec!["orders".to_string()]]);
    }

    #[test]
    fn chain_dependency_produces_three_levels() {
        let mut schema = Schema::new();
        schema.insert(Table::new("a"));
        schema.insert(fk_table("b", "a"));
        schema.insert(fk_table("c", "b"));
        let levels = resolve_levels(&schema).unwrap();
        assert_eq!(flatten(&levels), vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    #[test]
    fn cycle_is_fatal() {
        let mut schema = Schema::new();
        schema.insert(fk_table("a", "b"));
        schema.insert(fk_table("b", "a"));
        let err = resolve_levels(&schema).unwrap_err();
        assert!(matches!(err, SchemaError::CircularDependency { .. }));
    }

    #[test]
    fn unknown_reference_is_fatal() {
        let mut schema = Schema::new();
        schema.insert(fk_table("orders", "missing"));
        let err = resolve_levels(&schema).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownRefTable { .. }));
    }

    #[test]
    fn self_reference_does_not_block_own_level() {
        let mut schema = Schema::new();
        schema.insert(fk_table("employees", "employees"));
        let levels = resolve_levels(&schema).unwrap();
        assert_eq!(levels, vec![vec!["employees".to_string()]]);
    }
}
