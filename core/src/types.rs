//! Classification of raw SQL type strings into families the value synthesizer acts on.
//!
//! The external DDL parser hands us `sql_type` as opaque text (e.g. `VARCHAR(50)`,
//! `DECIMAL(10,2)`, `SERIAL`); we never receive a typed enum. Classification here is by
//! keyword matching against the type name only, deliberately not by column name — that
//! heuristic belongs to the fuzzy generator guessers this crate does not implement.

/// A coarse type family used to pick a default-value strategy (component D, §4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    Integer { unsigned: bool },
    Decimal { precision: u32, scale: u32 },
    Float,
    Boolean,
    Date,
    Timestamp,
    Time,
    Text { length: Option<u32> },
    Other,
}

impl TypeFamily {
    pub fn classify(sql_type: &str) -> Self {
        let upper = sql_type.to_uppercase();
        let base = upper.split('(').next().unwrap_or("").trim();

        if base.contains("SERIAL") {
            return TypeFamily::Integer { unsigned: true };
        }
        if matches_any(base, &["SMALLINT", "INTEGER", "INT", "BIGINT", "INT2", "INT4", "INT8"]) {
            let unsigned = base.contains("UNSIGNED");
            return TypeFamily::Integer { unsigned };
        }
        if matches_any(base, &["DECIMAL", "NUMERIC"]) {
            let (precision, scale) = parse_precision_scale(&upper).unwrap_or((10, 2));
            return TypeFamily::Decimal { precision, scale };
        }
        if matches_any(base, &["REAL", "FLOAT", "DOUBLE PRECISION", "DOUBLE"]) {
            return TypeFamily::Float;
        }
        if matches_any(base, &["BOOLEAN", "BOOL"]) {
            return TypeFamily::Boolean;
        }
        if matches_any(base, &["TIMESTAMP", "DATETIME"]) {
            return TypeFamily::Timestamp;
        }
        if base == "DATE" {
            return TypeFamily::Date;
        }
        if base.contains("TIME") {
            return TypeFamily::Time;
        }
        if matches_any(base, &["CHAR", "NCHAR", "VARCHAR", "NVARCHAR", "CHARACTER VARYING", "TEXT"]) {
            let length = parse_single_length(&upper);
            return TypeFamily::Text { length };
        }
        TypeFamily::Other
    }
}

fn matches_any(base: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| base.contains(n))
}

fn parse_single_length(upper: &str) -> Option<u32> {
    let open = upper.find('(')?;
    let close = upper[open..].find(')')? + open;
    upper[open + 1..close].trim().parse().ok()
}

fn parse_precision_scale(upper: &str) -> Option<(u32, u32)> {
    let open = upper.find('(')?;
    let close = upper[open..].find(')')? + open;
    let inner = &upper[open + 1..close];
    let mut parts = inner.split(',');
    let precision = parts.next()?.trim().parse().ok()?;
    let scale = parts.next().unwrap_or("0").trim().parse().ok()?;
    Some((precision, scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_integer_family() {
        assert_eq!(
            TypeFamily::classify("INT"),
            TypeFamily::Integer { unsigned: false }
        );
        assert_eq!(
            TypeFamily::classify("SERIAL"),
            TypeFamily::Integer { unsigned: true }
        );
    }

    #[test]
    fn classifies_decimal_with_precision_scale() {
        assert_eq!(
            TypeFamily::classify("DECIMAL(10,2)"),
            TypeFamily::Decimal {
                precision: 10,
                scale: 2
            }
        );
        assert_eq!(
            TypeFamily::classify("NUMERIC"),
            TypeFamily::Decimal {
                precision: 10,
                scale: 2
            }
        );
    }

    #[test]
    fn classifies_varchar_length() {
        assert_eq!(
            TypeFamily::classify("VARCHAR(50)"),
            TypeFamily::Text { length: Some(50) }
        );
        assert_eq!(TypeFamily::classify("TEXT"), TypeFamily::Text { length: None });
    }

    #[test]
    fn classifies_date_and_timestamp() {
        assert_eq!(TypeFamily::classify("DATE"), TypeFamily::Date);
        assert_eq!(TypeFamily::classify("TIMESTAMP"), TypeFamily::Timestamp);
        assert_eq!(TypeFamily::classify("TIMESTAMPTZ"), TypeFamily::Timestamp);
    }

    #[test]
    fn unknown_type_is_other() {
        assert_eq!(TypeFamily::classify("JSONB"), TypeFamily::Other);
    }
}
