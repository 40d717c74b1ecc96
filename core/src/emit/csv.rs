//! Per-table CSV emitter (§6.2).

use crate::model::{GeneratedData, Table, Value};

/// Render one table's rows as CSV text: header row of schema columns, empty string for
/// absent/null values.
pub fn render_table(table: &Table, data: &GeneratedData) -> String {
    let mut out = String::new();
    let columns: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    out.push_str(&columns.iter().map(|c| csv_field(c)).collect::<Vec<_>>().join(","));
    out.push('\n');

    let Some(rows) = data.get(&table.name) else { return out };
    for row in rows {
        let fields: Vec<String> = columns
            .iter()
            .map(|c| match row.get(*c) {
                Some(Value::Null) | None => String::new(),
                Some(v) => v.as_text(),
            })
            .map(|f| csv_field(&f))
            .collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, Row};
    use indexmap::IndexMap;

    #[test]
    fn renders_header_and_rows() {
        let mut table = Table::new("t");
        table.columns.push(Column::new("id", "INT"));
        table.columns.push(Column::new("note", "TEXT"));

        let mut data = GeneratedData::new();
        let mut row: Row = IndexMap::new();
        row.insert("id".to_string(), Value::Int(1));
        row.insert("note".to_string(), Value::Text("hi, there".to_string()));
        data.insert("t".to_string(), vec![row]);

        let csv = render_table(&table, &data);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,note"));
        assert_eq!(lines.next(), Some("1,\"hi, there\""));
    }

    #[test]
    fn absent_value_renders_as_empty_field() {
        let mut table = Table::new("t");
        table.columns.push(Column::new("id", "INT"));
        table.columns.push(Column::new("note", "TEXT"));
        let mut data = GeneratedData::new();
        let mut row: Row = IndexMap::new();
        row.insert("id".to_string(), Value::Int(1));
        data.insert("t".to_string(), vec![row]);

        let csv = render_table(&table, &data);
        assert_eq!(csv.lines().nth(1), Some("1,"));
    }
}
