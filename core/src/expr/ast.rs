//! AST for the CHECK-constraint sublanguage (§4.A).

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Real(f64),
    Str(String),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Ident(String),
    BinOp(BinOp, Box<Expr>, Box<Expr>),
    UnaryNot(Box<Expr>),
    Between {
        value: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negate: bool,
    },
    InList {
        value: Box<Expr>,
        items: Vec<Expr>,
        negate: bool,
    },
    Like {
        value: Box<Expr>,
        pattern: Box<Expr>,
        negate: bool,
    },
    IsNull {
        value: Box<Expr>,
        negate: bool,
    },
    Func {
        name: String,
        args: Vec<Expr>,
    },
    Extract {
        field: String,
        source: Box<Expr>,
    },
    DateFn(Box<Expr>),
}
