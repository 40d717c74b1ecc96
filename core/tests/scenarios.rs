//! End-to-end scenarios (S1-S6) plus boundary behaviors over the public `generate` API.

use std::collections::HashSet;

use rowsmith_core::config::GenerateOptions;
use rowsmith_core::error::SchemaError;
use rowsmith_core::model::{Column, ForeignKey, Schema, Table, Value};
use rowsmith_core::GenerateError;

fn opts(num_rows: usize, seed: u64) -> GenerateOptions {
    let mut o = GenerateOptions::default();
    o.num_rows = num_rows;
    o.seed = seed;
    o
}

#[test]
fn s1_fk_references_land_within_parent_id_range() {
    let mut a = Table::new("a");
    a.columns.push(Column::new("id", "SERIAL"));
    a.columns.push(Column::new("v", "INT"));
    a.primary_key.push("id".into());
    a.check_constraints.push("v BETWEEN 1 AND 10".to_string());

    let mut b = Table::new("b");
    b.columns.push(Column::new("id", "SERIAL"));
    b.columns.push(Column::new("a_id", "INT"));
    b.primary_key.push("id".into());
    b.foreign_keys.push(ForeignKey { columns: vec!["a_id".into()], ref_table: "a".into(), ref_columns: vec!["id".into()] });

    let mut schema = Schema::new();
    schema.insert(a);
    schema.insert(b);

    let mut options = opts(5, 1);
    options.num_rows_per_table.insert("b".to_string(), 10);

    let (data, _) = rowsmith_core::generate(&schema, &options).unwrap();

    let a_ids: Vec<i64> = data["a"].iter().map(|r| match r["id"] { Value::Int(i) => i, _ => panic!() }).collect();
    assert_eq!(a_ids, vec![1, 2, 3, 4, 5]);
    for row in &data["a"] {
        match row["v"] {
            Value::Int(v) => assert!((1..=10).contains(&v)),
            ref other => panic!("expected int, got {other:?}"),
        }
    }

    assert_eq!(data["b"].len(), 10);
    let valid: HashSet<i64> = a_ids.into_iter().collect();
    for row in &data["b"] {
        match row["a_id"] {
            Value::Int(a_id) => assert!(valid.contains(&a_id)),
            ref other => panic!("expected int, got {other:?}"),
        }
    }
}

#[test]
fn s2_chained_checks_hold_for_every_row() {
    let mut t = Table::new("t");
    t.columns.push(Column::new("x", "INT"));
    t.columns.push(Column::new("y", "INT"));
    t.check_constraints.push("x > 0".to_string());
    t.check_constraints.push("x < y".to_string());

    let mut schema = Schema::new();
    schema.insert(t);

    let (data, _) = rowsmith_core::generate(&schema, &opts(3, 7)).unwrap();
    assert_eq!(data["t"].len(), 3);
    for row in &data["t"] {
        let (Value::Int(x), Value::Int(y)) = (&row["x"], &row["y"]) else { panic!("expected ints") };
        assert!(*x > 0, "x should be positive, got {x}");
        assert!(x < y, "x should be less than y, got x={x} y={y}");
    }
}

#[test]
fn s3_unique_emails_match_pattern() {
    let mut u = Table::new("u");
    u.columns.push(Column::new("email", "VARCHAR(50)"));
    u.unique_constraints.push(vec!["email".to_string()]);
    u.check_constraints.push("REGEXP_LIKE(email, '^[^@]+@[^@]+$')".to_string());

    let mut schema = Schema::new();
    schema.insert(u);

    let (data, _) = rowsmith_core::generate(&schema, &opts(20, 3)).unwrap();
    assert_eq!(data["u"].len(), 20);

    let re = regex::Regex::new(r"^[^@]+@[^@]+$").unwrap();
    let mut seen = HashSet::new();
    for row in &data["u"] {
        let email = row["email"].as_text();
        assert!(re.is_match(&email), "email '{email}' should match pattern");
        assert!(seen.insert(email), "emails should be distinct");
    }
}

#[test]
fn s4_dates_stay_within_calendar_year() {
    let mut e = Table::new("e");
    e.columns.push(Column::new("d", "DATE"));
    e.check_constraints.push("d >= DATE '2020-01-01' AND d < DATE '2021-01-01'".to_string());

    let mut schema = Schema::new();
    schema.insert(e);

    let (data, _) = rowsmith_core::generate(&schema, &opts(50, 9)).unwrap();
    assert_eq!(data["e"].len(), 50);
    for row in &data["e"] {
        match &row["d"] {
            Value::Date(d) => assert_eq!(d.format("%Y").to_string(), "2020"),
            other => panic!("expected date, got {other:?}"),
        }
    }
}

#[test]
fn s5_cascade_delete_empties_child_table() {
    use rowsmith_core::engine::repair::repair;
    use rowsmith_core::expr::ExprCache;
    use rowsmith_core::model::{GeneratedData, Row};

    let mut p = Table::new("p");
    p.columns.push(Column::new("pid", "INT"));
    p.primary_key.push("pid".into());
    p.check_constraints.push("pid < 0".to_string()); // unsatisfiable: every generated row will fail and be removed

    let mut c = Table::new("c");
    c.columns.push(Column::new("pid", "INT").not_null());
    c.foreign_keys.push(ForeignKey { columns: vec!["pid".into()], ref_table: "p".into(), ref_columns: vec!["pid".into()] });

    let mut schema = Schema::new();
    schema.insert(p);
    schema.insert(c);

    let mut data = GeneratedData::new();
    let mut parent = Row::new();
    parent.insert("pid".to_string(), Value::Int(1));
    data.insert("p".to_string(), vec![parent]);
    let mut child = Row::new();
    child.insert("pid".to_string(), Value::Int(1));
    data.insert("c".to_string(), vec![child]);

    let cache = ExprCache::new();
    repair(&schema, &mut data, &cache, &["p".to_string(), "c".to_string()]);

    assert!(data["p"].is_empty());
    assert!(data["c"].is_empty());
}

#[test]
fn s6_circular_fk_aborts_before_any_row_is_produced() {
    let mut a = Table::new("a");
    a.columns.push(Column::new("id", "INT"));
    a.foreign_keys.push(ForeignKey { columns: vec!["id".into()], ref_table: "b".into(), ref_columns: vec!["id".into()] });
    let mut b = Table::new("b");
    b.columns.push(Column::new("id", "INT"));
    b.foreign_keys.push(ForeignKey { columns: vec!["id".into()], ref_table: "a".into(), ref_columns: vec!["id".into()] });

    let mut schema = Schema::new();
    schema.insert(a);
    schema.insert(b);

    let err = rowsmith_core::generate(&schema, &GenerateOptions::default()).unwrap_err();
    assert!(matches!(err, GenerateError::Schema(SchemaError::CircularDependency { .. })));
}

#[test]
fn boundary_empty_constraint_table_gets_exact_row_count() {
    let mut t = Table::new("t");
    t.columns.push(Column::new("note", "TEXT"));
    let mut schema = Schema::new();
    schema.insert(t);

    let (data, warnings) = rowsmith_core::generate(&schema, &opts(7, 11)).unwrap();
    assert_eq!(data["t"].len(), 7);
    assert!(warnings.is_empty());
}

#[test]
fn boundary_composite_pk_truncates_to_parent_space() {
    let mut colors = Table::new("colors");
    colors.columns.push(Column::new("name", "TEXT"));
    colors.primary_key.push("name".into());

    let mut variants = Table::new("variants");
    variants.columns.push(Column::new("color", "TEXT"));
    variants.columns.push(Column::new("size", "TEXT"));
    variants.primary_key.push("color".into());
    variants.primary_key.push("size".into());
    variants.foreign_keys.push(ForeignKey { columns: vec!["color".into()], ref_table: "colors".into(), ref_columns: vec!["name".into()] });

    let mut schema = Schema::new();
    schema.insert(colors);
    schema.insert(variants);

    let mut options = opts(3, 5);
    options.num_rows_per_table.insert("variants".to_string(), 1000);

    let (data, warnings) = rowsmith_core::generate(&schema, &options).unwrap();
    assert!(data["variants"].len() <= 1000);
    assert!(warnings.iter().any(|w| w.code == "PRIMARY_KEY_CAPACITY"));
}

#[test]
fn boundary_unsatisfiable_check_yields_empty_table_after_repair() {
    use rowsmith_core::engine::repair::repair;
    use rowsmith_core::expr::ExprCache;
    use rowsmith_core::model::{GeneratedData, Row};

    let mut t = Table::new("t");
    t.columns.push(Column::new("x", "INT"));
    t.check_constraints.push("x > 0".to_string());
    t.check_constraints.push("x < 0".to_string());

    let mut schema = Schema::new();
    schema.insert(t);

    let mut data = GeneratedData::new();
    let mut row = Row::new();
    row.insert("x".to_string(), Value::Int(5));
    data.insert("t".to_string(), vec![row]);

    let cache = ExprCache::new();
    repair(&schema, &mut data, &cache, &["t".to_string()]);
    assert!(data["t"].is_empty());
}

#[test]
fn rerunning_repair_deletes_nothing_more() {
    use rowsmith_core::engine::repair::repair;
    use rowsmith_core::expr::ExprCache;

    let mut t = Table::new("t");
    t.columns.push(Column::new("x", "INT"));
    t.check_constraints.push("x > 0".to_string());

    let mut schema = Schema::new();
    schema.insert(t);

    let (mut data, _) = rowsmith_core::generate(&schema, &opts(10, 42)).unwrap();
    let cache = ExprCache::new();
    repair(&schema, &mut data, &cache, &["t".to_string()]);
    let after_first = data["t"].len();
    repair(&schema, &mut data, &cache, &["t".to_string()]);
    assert_eq!(data["t"].len(), after_first);
}

#[test]
fn check_ast_round_trips_through_the_cache() {
    use rowsmith_core::expr::{eval, ExprCache};
    use rowsmith_core::model::Row;

    let cache = ExprCache::new();
    let source = "x BETWEEN 1 AND 10";
    let first = cache.parse(source).unwrap();
    let second = cache.parse(source).unwrap();

    let mut row = Row::new();
    row.insert("x".to_string(), Value::Int(5));
    assert_eq!(eval::eval_bool(&first, &row), eval::eval_bool(&second, &row));
}
