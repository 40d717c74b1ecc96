//! Per-table JSON emitter (§6.3).

use serde_json::{Map, Value as Json};

use crate::model::{GeneratedData, Table, Value};

/// Render one table's rows as a JSON array of objects, dates/times as ISO 8601 strings.
pub fn render_table(table: &Table, data: &GeneratedData) -> String {
    let rows = data.get(&table.name).map(Vec::as_slice).unwrap_or(&[]);
    let columns: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();

    let array: Vec<Json> = rows
        .iter()
        .map(|row| {
            let mut obj = Map::new();
            for col in &columns {
                let json_value = row.get(*col).map(value_to_json).unwrap_or(Json::Null);
                obj.insert((*col).to_string(), json_value);
            }
            Json::Object(obj)
        })
        .collect();

    serde_json::to_string_pretty(&array).expect("generated values are always representable as JSON")
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Int(i) => Json::from(*i),
        Value::Real(r) => serde_json::Number::from_f64(*r).map(Json::Number).unwrap_or(Json::Null),
        Value::Bool(b) => Json::from(*b),
        Value::Text(s) => Json::from(s.clone()),
        Value::Date(d) => Json::from(d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => Json::from(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        Value::Time(t) => Json::from(t.format("%H:%M:%S").to_string()),
    }
}
