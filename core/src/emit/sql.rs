//! SQL `INSERT` stream emitter (§6.1).
//!
//! Grounded in the original's `export_as_sql_insert_query`: chunked multi-row `INSERT`
//! statements, doubled-quote string escaping, and a default textual fallback for anything
//! that is not null/string/datetime/date/boolean.

use crate::model::{GeneratedData, Schema, Value};

/// Render `generated_data` as a stream of `INSERT` statements, `chunk_size` rows per
/// statement. Tables with no rows are skipped.
pub fn render(schema: &Schema, data: &GeneratedData, chunk_size: usize) -> String {
    let mut out = String::new();
    for (table_name, table) in &schema.tables {
        let Some(rows) = data.get(table_name) else { continue };
        if rows.is_empty() {
            continue;
        }
        let columns: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        let col_list = columns.join(", ");

        for chunk in rows.chunks(chunk_size.max(1)) {
            out.push_str(&format!("INSERT INTO {table_name} ({col_list}) VALUES\n"));
            let tuples: Vec<String> = chunk
                .iter()
                .map(|row| {
                    let values: Vec<String> = columns.iter().map(|c| literal(row.get(*c).unwrap_or(&Value::Null))).collect();
                    format!("  ({})", values.join(", "))
                })
                .collect();
            out.push_str(&tuples.join(",\n"));
            out.push_str(";\n");
        }
    }
    out
}

fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Value::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S")),
        Value::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
        Value::Time(t) => format!("'{}'", t.format("%H:%M:%S")),
        Value::Bool(b) => if *b { "TRUE".to_string() } else { "FALSE".to_string() },
        Value::Int(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, Row, Table};
    use indexmap::IndexMap;

    #[test]
    fn renders_insert_with_escaped_strings_and_null() {
        let mut schema = Schema::new();
        let mut table = Table::new("users");
        table.columns.push(Column::new("id", "INT"));
        table.columns.push(Column::new("name", "TEXT"));
        schema.insert(table);

        let mut data = GeneratedData::new();
        let mut row: Row = IndexMap::new();
        row.insert("id".to_string(), Value::Int(1));
        row.insert("name".to_string(), Value::Text("O'Brien".to_string()));
        let mut row2: Row = IndexMap::new();
        row2.insert("id".to_string(), Value::Int(2));
        row2.insert("name".to_string(), Value::Null);
        data.insert("users".to_string(), vec![row, row2]);

        let sql = render(&schema, &data, 1000);
        assert!(sql.contains("INSERT INTO users (id, name) VALUES"));
        assert!(sql.contains("(1, 'O''Brien')"));
        assert!(sql.contains("(2, NULL)"));
    }

    #[test]
    fn chunks_rows_per_insert() {
        let mut schema = Schema::new();
        let mut table = Table::new("t");
        table.columns.push(Column::new("id", "INT"));
        schema.insert(table);

        let mut data = GeneratedData::new();
        let rows: Vec<Row> = (0..5)
            .map(|i| {
                let mut r: Row = IndexMap::new();
                r.insert("id".to_string(), Value::Int(i));
                r
            })
            .collect();
        data.insert("t".to_string(), rows);

        let sql = render(&schema, &data, 2);
        assert_eq!(sql.matches("INSERT INTO").count(), 3);
    }

    #[test]
    fn skips_empty_tables() {
        let mut schema = Schema::new();
        schema.insert(Table::new("empty"));
        let data = GeneratedData::new();
        assert_eq!(render(&schema, &data, 1000), "");
    }
}
