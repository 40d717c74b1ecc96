//! Evaluator for the CHECK sublanguage (§4.B, component B).

use chrono::NaiveDate;
use regex::Regex;

use super::ast::{BinOp, Expr, Literal};
use crate::error::EvalError;
use crate::model::{Row, Value};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m-%d-%Y", "%d-%m-%Y"];

/// Evaluate `expr` against `row`, returning a scalar `Value`.
pub fn eval(expr: &Expr, row: &Row) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(lit) => Ok(literal_value(lit)),
        Expr::Ident(name) => Ok(lookup_ident(name, row)),
        Expr::UnaryNot(inner) => {
            let v = eval_bool(inner, row);
            Ok(Value::Bool(!v))
        }
        Expr::BinOp(op, lhs, rhs) => eval_binop(*op, lhs, rhs, row),
        Expr::Between { value, low, high, negate } => {
            let v = eval(value, row)?;
            let l = eval(low, row)?;
            let h = eval(high, row)?;
            let (uv, ul) = unify(&v, &l);
            let (uv2, uh) = unify(&v, &h);
            let in_range = compare(&uv, &ul) != std::cmp::Ordering::Less
                && compare(&uv2, &uh) != std::cmp::Ordering::Greater;
            Ok(Value::Bool(in_range != *negate))
        }
        Expr::InList { value, items, negate } => {
            let v = eval(value, row)?;
            let mut found = false;
            for item in items {
                let iv = eval(item, row)?;
                let (uv, uiv) = unify(&v, &iv);
                if compare(&uv, &uiv) == std::cmp::Ordering::Equal {
                    found = true;
                    break;
                }
            }
            Ok(Value::Bool(found != *negate))
        }
        Expr::Like { value, pattern, negate } => {
            let v = eval(value, row)?;
            let p = eval(pattern, row)?;
            let matched = like_match(&v.as_text(), &p.as_text());
            Ok(Value::Bool(matched != *negate))
        }
        Expr::IsNull { value, negate } => {
            let v = eval(value, row)?;
            Ok(Value::Bool(v.is_null() != *negate))
        }
        Expr::Func { name, args } => eval_func(name, args, row),
        Expr::Extract { field, source } => eval_extract(field, source, row),
        Expr::DateFn(inner) => {
            let v = eval(inner, row)?;
            as_date(&v.as_text())
                .map(Value::Date)
                .ok_or_else(|| EvalError::TypeMismatch {
                    expected: "date",
                    found: v.as_text(),
                })
        }
    }
}

/// Evaluate `expr` as a CHECK predicate. Any evaluation error degrades to `false`
/// rather than propagating, so a malformed or unsupported expression fails closed.
pub fn eval_bool(expr: &Expr, row: &Row) -> bool {
    match eval(expr, row) {
        Ok(Value::Bool(b)) => b,
        Ok(Value::Null) => false,
        Ok(other) => {
            !matches!(other, Value::Int(0)) && !matches!(other, Value::Real(r) if r == 0.0) && !other.is_null()
        }
        Err(_) => false,
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(i) => Value::Int(*i),
        Literal::Real(r) => Value::Real(*r),
        Literal::Str(s) => Value::Text(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
    }
}

/// Unresolved identifiers fall back, in order: the current date, then `TRUE`/`FALSE`,
/// then a bare string with the identifier's own text.
fn lookup_ident(name: &str, row: &Row) -> Value {
    if let Some(v) = row.get(name) {
        return v.clone();
    }
    if name.eq_ignore_ascii_case("CURRENT_DATE") {
        return Value::Date(current_date());
    }
    if name.eq_ignore_ascii_case("TRUE") {
        return Value::Bool(true);
    }
    if name.eq_ignore_ascii_case("FALSE") {
        return Value::Bool(false);
    }
    Value::Text(name.to_string())
}

fn current_date() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn eval_binop(op: BinOp, lhs: &Expr, rhs: &Expr, row: &Row) -> Result<Value, EvalError> {
    if matches!(op, BinOp::And | BinOp::Or) {
        let l = eval_bool(lhs, row);
        return Ok(Value::Bool(match op {
            BinOp::And => l && eval_bool(rhs, row),
            BinOp::Or => l || eval_bool(rhs, row),
            _ => unreachable!(),
        }));
    }

    let l = eval(lhs, row)?;
    let r = eval(rhs, row)?;

    if matches!(op, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div) {
        let (a, b) = (as_numeric(&l), as_numeric(&r));
        return match (a, b) {
            (Some(a), Some(b)) => {
                let result = match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    _ => unreachable!(),
                };
                Ok(Value::Real(result))
            }
            _ => Err(EvalError::TypeMismatch {
                expected: "numeric",
                found: format!("{l:?} / {r:?}"),
            }),
        };
    }

    let (ul, ur) = unify(&l, &r);
    let ord = compare(&ul, &ur);
    let result = match op {
        BinOp::Eq => ord == std::cmp::Ordering::Equal,
        BinOp::NotEq => ord != std::cmp::Ordering::Equal,
        BinOp::Lt => ord == std::cmp::Ordering::Less,
        BinOp::Gt => ord == std::cmp::Ordering::Greater,
        BinOp::LtEq => ord != std::cmp::Ordering::Greater,
        BinOp::GtEq => ord != std::cmp::Ordering::Less,
        BinOp::And | BinOp::Or | BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => unreachable!(),
    };
    Ok(Value::Bool(result))
}

/// Comparable form used once two operands have been unified: try dates first (in the
/// three accepted formats), then plain numerics, otherwise fall back to text comparison.
#[derive(Debug, Clone, PartialEq)]
enum Comparable {
    Date(NaiveDate),
    Num(f64),
    Text(String),
    Bool(bool),
    Null,
}

fn unify(a: &Value, b: &Value) -> (Comparable, Comparable) {
    if a.is_null() || b.is_null() {
        return (to_comparable_null_aware(a), to_comparable_null_aware(b));
    }
    if let (Some(da), Some(db)) = (as_date(&a.as_text()), as_date(&b.as_text())) {
        return (Comparable::Date(da), Comparable::Date(db));
    }
    if let (Some(na), Some(nb)) = (as_numeric(a), as_numeric(b)) {
        return (Comparable::Num(na), Comparable::Num(nb));
    }
    (Comparable::Text(a.as_text()), Comparable::Text(b.as_text()))
}

fn to_comparable_null_aware(v: &Value) -> Comparable {
    match v {
        Value::Null => Comparable::Null,
        Value::Bool(b) => Comparable::Bool(*b),
        other => Comparable::Text(other.as_text()),
    }
}

fn compare(a: &Comparable, b: &Comparable) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Comparable::Date(x), Comparable::Date(y)) => x.cmp(y),
        (Comparable::Num(x), Comparable::Num(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Comparable::Bool(x), Comparable::Bool(y)) => x.cmp(y),
        (Comparable::Null, Comparable::Null) => Ordering::Equal,
        (Comparable::Null, _) => Ordering::Less,
        (_, Comparable::Null) => Ordering::Greater,
        (x, y) => text_of(x).cmp(&text_of(y)),
    }
}

fn text_of(c: &Comparable) -> String {
    match c {
        Comparable::Date(d) => d.format("%Y-%m-%d").to_string(),
        Comparable::Num(n) => n.to_string(),
        Comparable::Text(s) => s.clone(),
        Comparable::Bool(b) => b.to_string(),
        Comparable::Null => String::new(),
    }
}

pub(crate) fn as_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn as_numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Real(r) => Some(*r),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Translate a SQL `LIKE` pattern (`%` -> any run, `_` -> any single char) into an
/// anchored regex and match the whole value against it.
fn like_match(value: &str, pattern: &str) -> bool {
    let mut re = String::from("^");
    for c in pattern.chars() {
        match c {
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).is_ok_and(|r| r.is_match(value))
}

fn eval_extract(field: &str, source: &Expr, row: &Row) -> Result<Value, EvalError> {
    let v = eval(source, row)?;
    let text = v.as_text();
    let date = as_date(&text).ok_or_else(|| EvalError::TypeMismatch {
        expected: "date",
        found: text.clone(),
    })?;
    let value = match field.to_uppercase().as_str() {
        "YEAR" => date.format("%Y").to_string().parse::<i64>().unwrap_or_default(),
        "MONTH" => date.format("%m").to_string().parse::<i64>().unwrap_or_default(),
        "DAY" => date.format("%d").to_string().parse::<i64>().unwrap_or_default(),
        other => {
            return Err(EvalError::Expr(crate::error::ExprError::UnsupportedFunction {
                name: format!("EXTRACT({other} FROM ...)"),
            }));
        }
    };
    Ok(Value::Int(value))
}

fn eval_func(name: &str, args: &[Expr], row: &Row) -> Result<Value, EvalError> {
    let upper = name.to_uppercase();
    match upper.as_str() {
        "REGEXP_LIKE" => {
            let value = eval(&args[0], row)?.as_text();
            let pattern = eval(&args[1], row)?.as_text();
            // mirrors re.match semantics: anchored at the start only, not the full string
            let ok = Regex::new(&pattern).is_ok_and(|r| r.find(&value).is_some_and(|m| m.start() == 0));
            Ok(Value::Bool(ok))
        }
        "UPPER" => Ok(Value::Text(eval(&args[0], row)?.as_text().to_uppercase())),
        "LOWER" => Ok(Value::Text(eval(&args[0], row)?.as_text().to_lowercase())),
        "LENGTH" => Ok(Value::Int(eval(&args[0], row)?.as_text().chars().count() as i64)),
        "ABS" => {
            let v = eval(&args[0], row)?;
            as_numeric(&v)
                .map(|n| Value::Real(n.abs()))
                .ok_or_else(|| EvalError::TypeMismatch {
                    expected: "numeric",
                    found: v.as_text(),
                })
        }
        "ROUND" => {
            let v = eval(&args[0], row)?;
            let n = as_numeric(&v).ok_or_else(|| EvalError::TypeMismatch {
                expected: "numeric",
                found: v.as_text(),
            })?;
            Ok(Value::Real(n.round()))
        }
        "COALESCE" => {
            for a in args {
                let v = eval(a, row)?;
                if !v.is_null() {
                    return Ok(v);
                }
            }
            Ok(Value::Null)
        }
        other => Err(EvalError::Expr(crate::error::ExprError::UnsupportedFunction {
            name: other.to_string(),
        })),
    }
}
