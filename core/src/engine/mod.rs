//! Orchestrates components E through H: dependency resolution, per-level row generation,
//! and the final repair sweep.

pub mod keys;
pub mod repair;
pub mod row;

use std::collections::HashMap;
use std::thread;

use crate::config::GenerateOptions;
use crate::diagnostics::Warning;
use crate::error::SchemaError;
use crate::expr::ExprCache;
use crate::model::{GeneratedData, Schema};
use crate::transform::topo;

#[derive(Debug)]
pub struct GenerationOutcome {
    pub data: GeneratedData,
    pub warnings: Vec<Warning>,
}

/// Run the full engine: resolve dependency levels (E), fill every table's rows (F/G) with
/// tables inside a level processed concurrently, then run the repair pass (H) if enabled.
pub fn generate_all(schema: &Schema, options: &GenerateOptions, cache: &ExprCache) -> Result<GenerationOutcome, SchemaError> {
    let levels = {
        let _span = tracing::debug_span!("resolve_dependencies", tables = schema.tables.len()).entered();
        match topo::resolve_levels(schema) {
            Ok(levels) => levels,
            Err(err) => {
                tracing::error!(error = %err, "schema error aborted generation");
                return Err(err);
            }
        }
    };
    let mut data = GeneratedData::new();
    let mut warnings: Vec<Warning> = Vec::new();

    for (level_index, level) in levels.iter().enumerate() {
        let _span = tracing::debug_span!("generate_level", level = level_index, tables = level.len()).entered();
        let snapshot = &data;
        let outputs = thread::scope(|scope| {
            let handles: Vec<_> = level
                .iter()
                .map(|name| {
                    let table = schema.tables.get(name).expect("level member exists in schema");
                    let table_name = name.clone();
                    scope.spawn(move || {
                        let _span = tracing::trace_span!("generate_table", table = %table_name).entered();
                        let mut rng = crate::rng::table_rng(options.seed, &table_name);
                        let mut pk_counters = HashMap::new();
                        let mut auto_increment_counters = HashMap::new();
                        let (rows, warns) =
                            row::generate_table(table, snapshot, cache, options, &mut rng, &mut pk_counters, &mut auto_increment_counters);
                        (table_name, rows, warns)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().expect("table worker panicked")).collect::<Vec<_>>()
        });

        for (name, rows, generation_warnings) in outputs {
            for w in &generation_warnings {
                tracing::warn!(table = %name, warning = %w, "generation warning");
            }
            warnings.extend(generation_warnings.iter().map(Warning::from));
            data.insert(name, rows);
        }
    }

    if options.run_repair {
        let _span = tracing::debug_span!("repair_pass").entered();
        let order = topo::flatten(&levels);
        warnings.extend(repair::repair(schema, &mut data, cache, &order));
    }

    Ok(GenerationOutcome { data, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, ForeignKey, Table};

    #[test]
    fn generates_rows_respecting_fk_dependency_order() {
        let mut users = Table::new("users");
        users.columns.push(Column::new("id", "SERIAL"));
        users.primary_key.push("id".into());

        let mut orders = Table::new("orders");
        orders.columns.push(Column::new("id", "SERIAL"));
        orders.columns.push(Column::new("user_id", "INT"));
        orders.primary_key.push("id".into());
        orders.foreign_keys.push(ForeignKey {
            columns: vec!["user_id".into()],
            ref_table: "users".into(),
            ref_columns: vec!["id".into()],
        });

        let mut schema = Schema::new();
        schema.insert(users);
        schema.insert(orders);

        let mut options = GenerateOptions::default();
        options.num_rows = 3;
        let cache = ExprCache::new();

        let outcome = generate_all(&schema, &options, &cache).unwrap();
        assert_eq!(outcome.data["users"].len(), 3);
        assert_eq!(outcome.data["orders"].len(), 3);
        let user_ids: std::collections::HashSet<_> = outcome.data["users"].iter().map(|r| r["id"].clone()).collect();
        for order in &outcome.data["orders"] {
            assert!(user_ids.contains(&order["user_id"]));
        }
    }

    #[test]
    fn circular_dependency_aborts_generation() {
        let mut a = Table::new("a");
        a.columns.push(Column::new("id", "INT"));
        a.foreign_keys.push(ForeignKey { columns: vec!["id".into()], ref_table: "b".into(), ref_columns: vec!["id".into()] });
        let mut b = Table::new("b");
        b.columns.push(Column::new("id", "INT"));
        b.foreign_keys.push(ForeignKey { columns: vec!["id".into()], ref_table: "a".into(), ref_columns: vec!["id".into()] });

        let mut schema = Schema::new();
        schema.insert(a);
        schema.insert(b);

        let options = GenerateOptions::default();
        let cache = ExprCache::new();
        let err = generate_all(&schema, &options, &cache).unwrap_err();
        assert!(matches!(err, SchemaError::CircularDependency { .. }));
    }
}
