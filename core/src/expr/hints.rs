//! Condition-hint extraction from CHECK ASTs (§4.C, component C).
//!
//! Synthesis (component D) uses these hints to steer value generation instead of
//! generating blindly and retrying against the full evaluator.

use super::ast::{BinOp, Expr, Literal};

#[derive(Debug, Clone, PartialEq)]
pub enum Hint {
    /// `column <op> literal`, e.g. `x > 5`, `x = 'a'`.
    Compare { column: String, op: String, literal: Literal },
    /// `column IN (...)` / `column NOT IN (...)`.
    InList { column: String, items: Vec<Literal>, negate: bool },
    /// `column LIKE pattern` / `column NOT LIKE pattern`.
    Like { column: String, pattern: String, negate: bool },
}

/// Collect hints for `column` out of a CHECK AST. Mirrors `_extract_conditions_recursive`:
/// `NOT` prefixes `"NOT "` onto the operator of whatever it wraps, `AND`/`OR` union hints
/// found on either side.
pub fn extract_conditions(expr: &Expr, column: &str) -> Vec<Hint> {
    match expr {
        Expr::BinOp(BinOp::And, l, r) | Expr::BinOp(BinOp::Or, l, r) => {
            let mut out = extract_conditions(l, column);
            out.extend(extract_conditions(r, column));
            out
        }
        Expr::BinOp(op, l, r) => {
            if let (Expr::Ident(name), Expr::Literal(lit)) = (l.as_ref(), r.as_ref()) {
                if name == column {
                    return vec![Hint::Compare {
                        column: column.to_string(),
                        op: binop_symbol(*op).to_string(),
                        literal: lit.clone(),
                    }];
                }
            }
            if let (Expr::Literal(lit), Expr::Ident(name)) = (l.as_ref(), r.as_ref()) {
                if name == column {
                    return vec![Hint::Compare {
                        column: column.to_string(),
                        op: flip_symbol(binop_symbol(*op)).to_string(),
                        literal: lit.clone(),
                    }];
                }
            }
            Vec::new()
        }
        Expr::Between { value, low, high, negate } => {
            let Expr::Ident(name) = value.as_ref() else { return Vec::new() };
            if name != column {
                return Vec::new();
            }
            let (Expr::Literal(low_lit), Expr::Literal(high_lit)) = (low.as_ref(), high.as_ref()) else {
                return Vec::new();
            };
            let ge_op = if *negate { "NOT >=" } else { ">=" };
            let le_op = if *negate { "NOT <=" } else { "<=" };
            vec![
                Hint::Compare {
                    column: column.to_string(),
                    op: ge_op.to_string(),
                    literal: low_lit.clone(),
                },
                Hint::Compare {
                    column: column.to_string(),
                    op: le_op.to_string(),
                    literal: high_lit.clone(),
                },
            ]
        }
        Expr::InList { value, items, negate } => {
            let Expr::Ident(name) = value.as_ref() else { return Vec::new() };
            if name != column {
                return Vec::new();
            }
            let literals: Vec<Literal> = items
                .iter()
                .filter_map(|e| match e {
                    Expr::Literal(l) => Some(l.clone()),
                    _ => None,
                })
                .collect();
            if literals.len() != items.len() {
                return Vec::new();
            }
            vec![Hint::InList {
                column: column.to_string(),
                items: literals,
                negate: *negate,
            }]
        }
        Expr::Like { value, pattern, negate } => {
            let Expr::Ident(name) = value.as_ref() else { return Vec::new() };
            if name != column {
                return Vec::new();
            }
            let Expr::Literal(Literal::Str(p)) = pattern.as_ref() else {
                return Vec::new();
            };
            vec![Hint::Like {
                column: column.to_string(),
                pattern: p.clone(),
                negate: *negate,
            }]
        }
        Expr::UnaryNot(inner) => extract_conditions(inner, column)
            .into_iter()
            .map(negate_hint)
            .collect(),
        _ => Vec::new(),
    }
}

fn negate_hint(hint: Hint) -> Hint {
    match hint {
        Hint::Compare { column, op, literal } => Hint::Compare {
            column,
            op: if let Some(stripped) = op.strip_prefix("NOT ") {
                stripped.to_string()
            } else {
                format!("NOT {op}")
            },
            literal,
        },
        Hint::InList { column, items, negate } => Hint::InList { column, items, negate: !negate },
        Hint::Like { column, pattern, negate } => Hint::Like { column, pattern, negate: !negate },
    }
}

fn binop_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Eq => "=",
        BinOp::NotEq => "!=",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::LtEq => "<=",
        BinOp::GtEq => ">=",
        _ => "?",
    }
}

fn flip_symbol(op: &str) -> &'static str {
    match op {
        "<" => ">",
        ">" => "<",
        "<=" => ">=",
        ">=" => "<=",
        other if other == "=" || other == "!=" => {
            if other == "=" {
                "="
            } else {
                "!="
            }
        }
        _ => "?",
    }
}
