//! CHECK-constraint sublanguage: parse (A), evaluate (B), extract hints (C).

pub mod ast;
pub mod eval;
pub mod hints;
pub mod parser;

use std::collections::HashMap;
use std::sync::RwLock;

use ast::Expr;
use crate::error::ExprError;

/// Parsed CHECK expressions are cached by source string, since the same constraint text
/// gets parsed once per table but evaluated and hint-extracted many times over.
#[derive(Default)]
pub struct ExprCache {
    entries: RwLock<HashMap<String, Expr>>,
}

impl ExprCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&self, source: &str) -> Result<Expr, ExprError> {
        if let Some(expr) = self.entries.read().unwrap().get(source) {
            return Ok(expr.clone());
        }
        let expr = parser::parse(source)?;
        self.entries.write().unwrap().insert(source.to_string(), expr.clone());
        Ok(expr)
    }
}
