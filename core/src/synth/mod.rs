//! Value synthesizer (§4.D, component D): the column-value resolution pipeline
//! used both for blank-slate filling and for CHECK-directed regeneration.

pub mod atoms;
mod regex_gen;

use chrono::NaiveDate;
use rand::Rng;
use rand::rngs::StdRng;

use crate::config::{ColumnGenerator, GenerateOptions};
use crate::error::ExprError;
use crate::expr::ast::{Expr, Literal};
use crate::expr::eval;
use crate::expr::hints::{self, Hint};
use crate::expr::ExprCache;
use crate::model::{Column, Row, Value};
use crate::types::TypeFamily;

/// Resolve a value for `column` of `table`, given the current partial `row` and the CHECK
/// sources (already filtered to ones mentioning this column). `directed_hints`, when present,
/// replaces the type-default step with hint-aware range/pattern synthesis (used by CHECK
/// enforcement's retry loop).
pub fn generate(
    cache: &ExprCache,
    table: &str,
    column: &Column,
    row: &Row,
    check_sources: &[&str],
    options: &GenerateOptions,
    rng: &mut StdRng,
    directed_hints: Option<&[Hint]>,
) -> Value {
    if let Some(pv) = options.predefined_values.lookup(table, &column.name) {
        return pick_predefined(pv, rng);
    }

    if let Some(generator) = options.column_type_mappings.lookup(table, &column.name) {
        match generator {
            ColumnGenerator::Named(name) => {
                if let Some(v) = atoms::generate(name, rng) {
                    return v;
                }
            }
            ColumnGenerator::Custom(f) => return f(rng, row),
        }
    }

    let parsed: Vec<Expr> = check_sources.iter().filter_map(|s| cache.parse(s).ok()).collect();

    if let Some(pattern) = find_regexp_hint(&parsed, &column.name) {
        return Value::Text(regex_gen::generate_matching(&pattern, rng));
    }

    let column_hints: Vec<Hint> = parsed
        .iter()
        .flat_map(|e| hints::extract_conditions(e, &column.name))
        .collect();

    if let Some(values) = allowed_values(&column_hints) {
        if !values.is_empty() {
            let idx = rng.gen_range(0..values.len());
            return values[idx].clone();
        }
    }

    if matches!(TypeFamily::classify(&column.sql_type), TypeFamily::Date) {
        if let Some((lo, hi)) = date_range(&column_hints) {
            return draw_date_in_range(lo, hi, rng);
        }
    }

    if let Some((lo, hi)) = numeric_range(&column_hints) {
        return draw_numeric_in_range(lo, hi, column, rng);
    }

    match directed_hints {
        Some(hints) if !hints.is_empty() => generate_directed(hints, column, rng),
        _ => generate_type_default(TypeFamily::classify(&column.sql_type), rng),
    }
}

fn pick_predefined(pv: &crate::config::PredefinedValue, rng: &mut StdRng) -> Value {
    use crate::config::PredefinedValue;
    match pv {
        PredefinedValue::Scalar(v) => v.clone(),
        PredefinedValue::Choices(choices) if !choices.is_empty() => {
            choices[rng.gen_range(0..choices.len())].clone()
        }
        PredefinedValue::Choices(_) => Value::Null,
    }
}

fn find_regexp_hint(exprs: &[Expr], column: &str) -> Option<String> {
    exprs.iter().find_map(|e| find_regexp_hint_in(e, column))
}

fn find_regexp_hint_in(expr: &Expr, column: &str) -> Option<String> {
    match expr {
        Expr::Func { name, args } if name.eq_ignore_ascii_case("REGEXP_LIKE") && args.len() == 2 => {
            if let (Expr::Ident(id), Expr::Literal(Literal::Str(pattern))) = (&args[0], &args[1]) {
                if id == column {
                    return Some(pattern.clone());
                }
            }
            None
        }
        Expr::BinOp(_, l, r) => find_regexp_hint_in(l, column).or_else(|| find_regexp_hint_in(r, column)),
        Expr::UnaryNot(inner) => find_regexp_hint_in(inner, column),
        _ => None,
    }
}

fn allowed_values(hints: &[Hint]) -> Option<Vec<Value>> {
    hints.iter().find_map(|h| match h {
        Hint::InList { items, negate: false, .. } => Some(items.iter().map(literal_to_value).collect()),
        _ => None,
    })
}

fn numeric_range(hints: &[Hint]) -> Option<(f64, f64)> {
    let mut lo = f64::NEG_INFINITY;
    let mut hi = f64::INFINITY;
    let mut found = false;
    for hint in hints {
        if let Hint::Compare { op, literal, .. } = hint {
            let Some(n) = literal_numeric(literal) else { continue };
            match op.as_str() {
                ">" | ">=" => {
                    lo = lo.max(n);
                    found = true;
                }
                "<" | "<=" => {
                    hi = hi.min(n);
                    found = true;
                }
                "=" => {
                    lo = lo.max(n);
                    hi = hi.min(n);
                    found = true;
                }
                _ => {}
            }
        }
    }
    if found && lo <= hi {
        Some((lo, hi))
    } else {
        None
    }
}

/// Fold `Hint::Compare` bounds on a date-typed column into an inclusive `[lo, hi]` range,
/// per the unit-`1 day` rule for strict inequalities.
fn date_range(hints: &[Hint]) -> Option<(NaiveDate, NaiveDate)> {
    let mut lo: Option<NaiveDate> = None;
    let mut hi: Option<NaiveDate> = None;
    for hint in hints {
        let Hint::Compare { op, literal, .. } = hint else { continue };
        let Literal::Str(s) = literal else { continue };
        let Some(d) = eval::as_date(s) else { continue };
        match op.as_str() {
            ">" => lo = Some(lo.map_or(d, |l| l.max(d)) + chrono::Duration::days(1)),
            ">=" => lo = Some(lo.map_or(d, |l| l.max(d))),
            "<" => hi = Some(hi.map_or(d, |h| h.min(d)) - chrono::Duration::days(1)),
            "<=" => hi = Some(hi.map_or(d, |h| h.min(d))),
            "=" => {
                lo = Some(lo.map_or(d, |l| l.max(d)));
                hi = Some(hi.map_or(d, |h| h.min(d)));
            }
            _ => {}
        }
    }
    const OPEN_HORIZON_DAYS: i64 = 365 * 10;
    match (lo, hi) {
        (Some(l), Some(h)) if l <= h => Some((l, h)),
        (Some(l), None) => Some((l, l + chrono::Duration::days(OPEN_HORIZON_DAYS))),
        (None, Some(h)) => Some((h - chrono::Duration::days(OPEN_HORIZON_DAYS), h)),
        _ => None,
    }
}

fn draw_date_in_range(lo: NaiveDate, hi: NaiveDate, rng: &mut StdRng) -> Value {
    let span = (hi - lo).num_days();
    let offset = if span > 0 { rng.gen_range(0..=span) } else { 0 };
    Value::Date(lo + chrono::Duration::days(offset))
}

fn literal_to_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(i) => Value::Int(*i),
        Literal::Real(r) => Value::Real(*r),
        Literal::Str(s) => Value::Text(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
    }
}

fn literal_numeric(lit: &Literal) -> Option<f64> {
    match lit {
        Literal::Int(i) => Some(*i as f64),
        Literal::Real(r) => Some(*r),
        _ => None,
    }
}

fn draw_numeric_in_range(lo: f64, hi: f64, column: &Column, rng: &mut StdRng) -> Value {
    let lo = if lo.is_finite() { lo } else { -10000.0 };
    let hi = if hi.is_finite() { hi } else { 10000.0 };
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    match TypeFamily::classify(&column.sql_type) {
        TypeFamily::Integer { .. } => Value::Int(rng.gen_range(lo as i64..=hi as i64)),
        _ => Value::Real(rng.gen_range(lo..=hi)),
    }
}

/// Hint-aware synthesis used during CHECK enforcement retries (§4.D "condition-directed").
fn generate_directed(hints: &[Hint], column: &Column, rng: &mut StdRng) -> Value {
    if let Some(pattern) = hints.iter().find_map(|h| match h {
        Hint::Like { pattern, negate: false, .. } => Some(pattern.clone()),
        _ => None,
    }) {
        return Value::Text(directed_like(&pattern, rng));
    }

    if matches!(TypeFamily::classify(&column.sql_type), TypeFamily::Date) {
        if let Some((lo, hi)) = date_range(hints) {
            return draw_date_in_range(lo, hi, rng);
        }
    }

    if let Some((lo, hi)) = numeric_range(hints) {
        return draw_numeric_in_range(lo, hi, column, rng);
    }

    generate_type_default(TypeFamily::classify(&column.sql_type), rng)
}

fn directed_like(pattern: &str, rng: &mut StdRng) -> String {
    if let Some(prefix) = pattern.strip_suffix('%') {
        if !prefix.contains('%') {
            return format!("{prefix}{}", random_letters(5, rng));
        }
    }
    if let Some(suffix) = pattern.strip_prefix('%') {
        if !suffix.contains('%') {
            return format!("{}{suffix}", random_letters(5, rng));
        }
    }
    pattern.replace('%', "").replace('_', "")
}

fn random_letters(n: usize, rng: &mut StdRng) -> String {
    (0..n).map(|_| (b'a' + rng.gen_range(0..26)) as char).collect()
}

/// Type-family default generation, the final fallback of the resolution chain.
pub fn generate_type_default(family: TypeFamily, rng: &mut StdRng) -> Value {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    match family {
        TypeFamily::Integer { unsigned } => {
            let lo = if unsigned { 0 } else { -10000 };
            Value::Int(rng.gen_range(lo..=10000))
        }
        TypeFamily::Decimal { precision, scale } => {
            let max = 10f64.powi((precision.saturating_sub(scale)) as i32) - 1.0;
            let raw: f64 = rng.gen_range(-max..=max);
            let factor = 10f64.powi(scale as i32);
            Value::Real((raw * factor).round() / factor)
        }
        TypeFamily::Float => Value::Real(rng.gen_range(0.0..=10000.0)),
        TypeFamily::Boolean => Value::Bool(rng.r#gen()),
        TypeFamily::Date => {
            let days: i64 = rng.gen_range(0..365 * 60);
            let base = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date");
            Value::Date(base + chrono::Duration::days(days))
        }
        TypeFamily::Timestamp => {
            let secs: i64 = rng.gen_range(0..365 * 60 * 86400);
            let base = NaiveDateTime::parse_from_str("1970-01-01 00:00:00", "%Y-%m-%d %H:%M:%S")
                .expect("valid epoch datetime");
            Value::DateTime(base + chrono::Duration::seconds(secs))
        }
        TypeFamily::Time => {
            let secs: u32 = rng.gen_range(0..86400);
            Value::Time(NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or_default())
        }
        TypeFamily::Text { length } => generate_text(length, rng),
        TypeFamily::Other => Value::Text(random_letters(8, rng)),
    }
}

fn generate_text(length: Option<u32>, rng: &mut StdRng) -> Value {
    use fake::Fake;
    use fake::faker::lorem::en::Sentence;
    match length {
        Some(0) => Value::Text(String::new()),
        Some(n) if n < 5 => Value::Text(random_letters(n as usize, rng)),
        Some(n) => {
            let text: String = Sentence(3..8).fake_with_rng(rng);
            Value::Text(text.chars().take(n as usize).collect())
        }
        None => Value::Text(Sentence(3..8).fake_with_rng(rng)),
    }
}

/// Propagate an unsupported-function failure seen while scanning check sources for hints,
/// surfaced for diagnostics rather than aborting generation.
pub fn hint_parse_errors(cache: &ExprCache, check_sources: &[&str]) -> Vec<ExprError> {
    check_sources.iter().filter_map(|s| cache.parse(s).err()).collect()
}
