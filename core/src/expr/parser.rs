//! Recursive-descent parser for the CHECK sublanguage (§4.A, component A).

use super::ast::{BinOp, Expr, Literal};
use crate::error::ExprError;

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Int(i64),
    Real(f64),
    Str(String),
    Ident(String),
    Punct(char),
    Op(String),
    Eof,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Tok>, String> {
        let mut toks = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(&c) = self.chars.peek() else {
                toks.push(Tok::Eof);
                break;
            };
            if c.is_ascii_digit() {
                toks.push(self.lex_number());
            } else if c == '\'' {
                toks.push(self.lex_string()?);
            } else if c.is_alphabetic() || c == '_' {
                toks.push(self.lex_ident());
            } else if "(),".contains(c) {
                self.chars.next();
                toks.push(Tok::Punct(c));
            } else {
                toks.push(self.lex_operator()?);
            }
        }
        Ok(toks)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn lex_number(&mut self) -> Tok {
        let mut s = String::new();
        let mut is_real = false;
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.chars.next();
            } else if c == '.' && !is_real {
                is_real = true;
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if is_real {
            Tok::Real(s.parse().unwrap_or(0.0))
        } else {
            Tok::Int(s.parse().unwrap_or(0))
        }
    }

    fn lex_string(&mut self) -> Result<Tok, String> {
        self.chars.next(); // opening quote
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some('\\') => {
                    if let Some(escaped) = self.chars.next() {
                        s.push(escaped);
                    }
                }
                Some('\'') => {
                    // SQL-style doubled-quote escape: '' inside a string means a literal '
                    if self.chars.peek() == Some(&'\'') {
                        s.push('\'');
                        self.chars.next();
                    } else {
                        return Ok(Tok::Str(s));
                    }
                }
                Some(c) => s.push(c),
                None => return Err("unterminated string literal".to_string()),
            }
        }
    }

    fn lex_ident(&mut self) -> Tok {
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        Tok::Ident(s)
    }

    fn lex_operator(&mut self) -> Result<Tok, String> {
        let c = self.chars.next().unwrap();
        let op = match c {
            '=' => "=".to_string(),
            '!' => {
                if self.chars.peek() == Some(&'=') {
                    self.chars.next();
                    "!=".to_string()
                } else {
                    return Err("unexpected character '!'".to_string());
                }
            }
            '<' => {
                if self.chars.peek() == Some(&'=') {
                    self.chars.next();
                    "<=".to_string()
                } else if self.chars.peek() == Some(&'>') {
                    self.chars.next();
                    "<>".to_string()
                } else {
                    "<".to_string()
                }
            }
            '>' => {
                if self.chars.peek() == Some(&'=') {
                    self.chars.next();
                    ">=".to_string()
                } else {
                    ">".to_string()
                }
            }
            '+' | '-' | '*' | '/' => c.to_string(),
            other => return Err(format!("unexpected character '{other}'")),
        };
        Ok(Tok::Op(op))
    }
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
}

fn kw(tok: &Tok, word: &str) -> bool {
    matches!(tok, Tok::Ident(s) if s.eq_ignore_ascii_case(word))
}

impl Parser {
    fn peek(&self) -> &Tok {
        &self.toks[self.pos]
    }

    fn advance(&mut self) -> Tok {
        let t = self.toks[self.pos].clone();
        if self.pos + 1 < self.toks.len() {
            self.pos += 1;
        }
        t
    }

    fn expect_punct(&mut self, c: char) -> Result<(), String> {
        if matches!(self.peek(), Tok::Punct(p) if *p == c) {
            self.advance();
            Ok(())
        } else {
            Err(format!("expected '{c}'"))
        }
    }

    fn expect_kw(&mut self, word: &str) -> Result<(), String> {
        if kw(self.peek(), word) {
            self.advance();
            Ok(())
        } else {
            Err(format!("expected keyword '{word}'"))
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, String> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_and()?;
        while kw(self.peek(), "OR") {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::BinOp(BinOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_not()?;
        while kw(self.peek(), "AND") {
            self.advance();
            let right = self.parse_not()?;
            left = Expr::BinOp(BinOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, String> {
        if kw(self.peek(), "NOT") {
            self.advance();
            let inner = self.parse_not()?;
            return Ok(Expr::UnaryNot(Box::new(inner)));
        }
        self.parse_cmp()
    }

    fn parse_cmp(&mut self) -> Result<Expr, String> {
        let left = self.parse_add()?;

        if let Tok::Op(op) = self.peek().clone() {
            if let Some(bin) = cmp_binop(&op) {
                self.advance();
                let right = self.parse_add()?;
                return Ok(Expr::BinOp(bin, Box::new(left), Box::new(right)));
            }
        }

        if kw(self.peek(), "BETWEEN") {
            self.advance();
            let low = self.parse_add()?;
            self.expect_kw("AND")?;
            let high = self.parse_add()?;
            return Ok(Expr::Between {
                value: Box::new(left),
                low: Box::new(low),
                high: Box::new(high),
                negate: false,
            });
        }

        let mut negate = false;
        if kw(self.peek(), "NOT") {
            negate = true;
            self.advance();
        }

        if kw(self.peek(), "IN") {
            self.advance();
            self.expect_punct('(')?;
            let mut items = vec![self.parse_add()?];
            while matches!(self.peek(), Tok::Punct(',')) {
                self.advance();
                items.push(self.parse_add()?);
            }
            self.expect_punct(')')?;
            return Ok(Expr::InList {
                value: Box::new(left),
                items,
                negate,
            });
        }

        if kw(self.peek(), "LIKE") {
            self.advance();
            let pattern = self.parse_add()?;
            return Ok(Expr::Like {
                value: Box::new(left),
                pattern: Box::new(pattern),
                negate,
            });
        }

        if negate {
            return Err("expected IN or LIKE after NOT".to_string());
        }

        if kw(self.peek(), "IS") {
            self.advance();
            let mut is_negate = false;
            if kw(self.peek(), "NOT") {
                is_negate = true;
                self.advance();
            }
            self.expect_kw("NULL")?;
            return Ok(Expr::IsNull {
                value: Box::new(left),
                negate: is_negate,
            });
        }

        Ok(left)
    }

    fn parse_add(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_mul()?;
        loop {
            match self.peek() {
                Tok::Op(op) if op == "+" => {
                    self.advance();
                    let right = self.parse_mul()?;
                    left = Expr::BinOp(BinOp::Add, Box::new(left), Box::new(right));
                }
                Tok::Op(op) if op == "-" => {
                    self.advance();
                    let right = self.parse_mul()?;
                    left = Expr::BinOp(BinOp::Sub, Box::new(left), Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_mul(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_atom()?;
        loop {
            match self.peek() {
                Tok::Op(op) if op == "*" => {
                    self.advance();
                    let right = self.parse_atom()?;
                    left = Expr::BinOp(BinOp::Mul, Box::new(left), Box::new(right));
                }
                Tok::Op(op) if op == "/" => {
                    self.advance();
                    let right = self.parse_atom()?;
                    left = Expr::BinOp(BinOp::Div, Box::new(left), Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_atom(&mut self) -> Result<Expr, String> {
        match self.peek().clone() {
            Tok::Int(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Int(n)))
            }
            Tok::Real(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Real(n)))
            }
            Tok::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::Str(s)))
            }
            Tok::Punct('(') => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_punct(')')?;
                Ok(inner)
            }
            Tok::Ident(name) => {
                if name.eq_ignore_ascii_case("TRUE") {
                    self.advance();
                    return Ok(Expr::Literal(Literal::Bool(true)));
                }
                if name.eq_ignore_ascii_case("FALSE") {
                    self.advance();
                    return Ok(Expr::Literal(Literal::Bool(false)));
                }
                if name.eq_ignore_ascii_case("EXTRACT") {
                    return self.parse_extract();
                }
                if name.eq_ignore_ascii_case("DATE") && self.peek_nth_is_punct(1, '(') {
                    self.advance();
                    self.expect_punct('(')?;
                    let arg = self.parse_expr()?;
                    self.expect_punct(')')?;
                    return Ok(Expr::DateFn(Box::new(arg)));
                }
                if name.eq_ignore_ascii_case("DATE") && matches!(self.toks.get(self.pos + 1), Some(Tok::Str(_))) {
                    self.advance();
                    let Tok::Str(s) = self.advance() else { unreachable!() };
                    return Ok(Expr::Literal(Literal::Str(s)));
                }
                self.advance();
                if matches!(self.peek(), Tok::Punct('(')) {
                    self.advance();
                    let mut args = Vec::new();
                    if !matches!(self.peek(), Tok::Punct(')')) {
                        args.push(self.parse_expr()?);
                        while matches!(self.peek(), Tok::Punct(',')) {
                            self.advance();
                            args.push(self.parse_expr()?);
                        }
                    }
                    self.expect_punct(')')?;
                    return Ok(Expr::Func { name, args });
                }
                Ok(Expr::Ident(name))
            }
            other => Err(format!("unexpected token {other:?}")),
        }
    }

    fn peek_nth_is_punct(&self, n: usize, c: char) -> bool {
        self.toks
            .get(self.pos + n)
            .is_some_and(|t| matches!(t, Tok::Punct(p) if *p == c))
    }

    fn parse_extract(&mut self) -> Result<Expr, String> {
        self.advance(); // EXTRACT
        self.expect_punct('(')?;
        let field = match self.advance() {
            Tok::Ident(s) => s,
            Tok::Str(s) => s,
            other => return Err(format!("expected field name in EXTRACT, found {other:?}")),
        };
        self.expect_kw("FROM")?;
        let source = self.parse_expr()?;
        self.expect_punct(')')?;
        Ok(Expr::Extract {
            field,
            source: Box::new(source),
        })
    }
}

fn cmp_binop(op: &str) -> Option<BinOp> {
    match op {
        "=" => Some(BinOp::Eq),
        "!=" | "<>" => Some(BinOp::NotEq),
        "<" => Some(BinOp::Lt),
        ">" => Some(BinOp::Gt),
        "<=" => Some(BinOp::LtEq),
        ">=" => Some(BinOp::GtEq),
        _ => None,
    }
}

/// Parse a CHECK expression string into an AST.
pub fn parse(src: &str) -> Result<Expr, ExprError> {
    let toks = Lexer::new(src).tokenize().map_err(|message| ExprError::ParseFailure {
        src: src.to_string(),
        message,
    })?;
    let mut parser = Parser { toks, pos: 0 };
    let expr = parser.parse_expr().map_err(|message| ExprError::ParseFailure {
        src: src.to_string(),
        message,
    })?;
    if !matches!(parser.peek(), Tok::Eof) {
        return Err(ExprError::ParseFailure {
            src: src.to_string(),
            message: format!("trailing tokens after expression: {:?}", parser.peek()),
        });
    }
    Ok(expr)
}
