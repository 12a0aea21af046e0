//! A small arithmetic expression language for potential definitions.
//!
//! Expressions are built from numbers, names, the position variable `x`,
//! the binary operators `+ - * / % ^ **`, the comparisons
//! `< <= > >= == !=` (which evaluate to `1` or `0`), unary `+`/`-`,
//! parentheses, and calls to a fixed set of elementary functions (see
//! [`Func`]). Nothing else can be evaluated.
//!
//! Parsing produces an [`Expr`] whose names are still unresolved. Binding the
//! expression against a set of parameter values produces a [`BoundExpr`],
//! folding every sub-expression that doesn't depend on `x` into a number.
//!
//! ```
//! use std::collections::BTreeMap;
//! use sinebasis::expr::Expr;
//!
//! let params = BTreeMap::from([("v0".to_string(), -2.0)]);
//! let f = Expr::parse("v0 * (x - 1)^2").unwrap().bind(&params).unwrap();
//! assert_eq!(f.eval(3.0), -8.0);
//! assert_eq!(f.as_const(), None);
//!
//! let c = Expr::parse("np.sqrt(4) * v0").unwrap().bind(&params).unwrap();
//! assert_eq!(c.as_const(), Some(-4.0));
//! ```

use std::{
    collections::{ BTreeMap, BTreeSet },
    f64::consts::{ E, PI },
    fmt,
};
use crate::error::ExprError;

pub type ExprResult<T> = Result<T, ExprError>;

/// Name of the position variable.
pub const POSITION: &str = "x";

/// Names that resolve to built-in constants.
pub const CONSTANTS: &[(&str, f64)] = &[
    ("pi", PI),
    ("e", E),
    ("inf", f64::INFINITY),
];

// module qualifiers accepted in front of function and constant names, with
// their canonical spelling
const MODULES: &[(&str, &str)] = &[
    ("np", "numpy"),
    ("numpy", "numpy"),
    ("math", "math"),
];

/// Allowed functions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log10,
    Sqrt,
    Abs,
    Floor,
    Ceil,
    Sign,
    /// `step(a)` is `1` for `a ≥ 0` and `0` otherwise.
    Step,
    Min,
    Max,
    Pow,
    /// Floor modulo, matching the `%` operator.
    Mod,
    /// `where(c, a, b)` is `a` if `c` is non-zero and `b` otherwise.
    Where,
}

impl Func {
    fn lookup(name: &str) -> Option<Self> {
        let f = match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "asin" | "arcsin" => Self::Asin,
            "acos" | "arccos" => Self::Acos,
            "atan" | "arctan" => Self::Atan,
            "atan2" | "arctan2" => Self::Atan2,
            "sinh" => Self::Sinh,
            "cosh" => Self::Cosh,
            "tanh" => Self::Tanh,
            "exp" => Self::Exp,
            "ln" | "log" => Self::Ln,
            "log10" => Self::Log10,
            "sqrt" => Self::Sqrt,
            "abs" | "fabs" => Self::Abs,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "sign" => Self::Sign,
            "step" | "heaviside" => Self::Step,
            "min" | "minimum" => Self::Min,
            "max" | "maximum" => Self::Max,
            "pow" | "power" => Self::Pow,
            "mod" | "fmod" => Self::Mod,
            "where" => Self::Where,
            _ => { return None; },
        };
        Some(f)
    }

    /// Number of arguments the function takes.
    pub fn arity(self) -> usize {
        match self {
            Self::Atan2 | Self::Min | Self::Max | Self::Pow | Self::Mod => 2,
            Self::Where => 3,
            _ => 1,
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        match self {
            Self::Sin => args[0].sin(),
            Self::Cos => args[0].cos(),
            Self::Tan => args[0].tan(),
            Self::Asin => args[0].asin(),
            Self::Acos => args[0].acos(),
            Self::Atan => args[0].atan(),
            Self::Atan2 => args[0].atan2(args[1]),
            Self::Sinh => args[0].sinh(),
            Self::Cosh => args[0].cosh(),
            Self::Tanh => args[0].tanh(),
            Self::Exp => args[0].exp(),
            Self::Ln => args[0].ln(),
            Self::Log10 => args[0].log10(),
            Self::Sqrt => args[0].sqrt(),
            Self::Abs => args[0].abs(),
            Self::Floor => args[0].floor(),
            Self::Ceil => args[0].ceil(),
            Self::Sign => {
                if args[0] > 0.0 {
                    1.0
                } else if args[0] < 0.0 {
                    -1.0
                } else {
                    args[0]
                }
            },
            Self::Step => if args[0] >= 0.0 { 1.0 } else { 0.0 },
            Self::Min => args[0].min(args[1]),
            Self::Max => args[0].max(args[1]),
            Self::Pow => args[0].powf(args[1]),
            Self::Mod => floor_mod(args[0], args[1]),
            Self::Where => if args[0] != 0.0 { args[1] } else { args[2] },
        }
    }
}

fn floor_mod(a: f64, b: f64) -> f64 { a - b * (a / b).floor() }

fn truth(b: bool) -> f64 { if b { 1.0 } else { 0.0 } }

/// Binary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl BinOp {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
            Self::Rem => floor_mod(a, b),
            Self::Pow => a.powf(b),
            Self::Lt => truth(a < b),
            Self::Le => truth(a <= b),
            Self::Gt => truth(a > b),
            Self::Ge => truth(a >= b),
            Self::Eq => truth(a == b),
            Self::Ne => truth(a != b),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Op(&'static str),
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(v) => write!(f, "number {}", v),
            Self::Ident(s) => write!(f, "name {:?}", s),
            Self::Op(s) => write!(f, "operator {:?}", s),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::Comma => write!(f, "','"),
        }
    }
}

// longer operators first so that `**` wins over `*`, etc.
const OPERATORS: &[&str] = &[
    "**", "<=", ">=", "==", "!=", "<", ">", "+", "-", "*", "/", "%", "^",
];

fn tokenize(src: &str) -> ExprResult<Vec<(Token, usize)>> {
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let mut tokens: Vec<(Token, usize)> = Vec::new();
    let mut k: usize = 0;
    while k < chars.len() {
        let (pos, c) = chars[k];
        if c.is_whitespace() {
            k += 1;
        } else if c.is_ascii_digit() || c == '.' {
            let start = k;
            while k < chars.len()
                && (chars[k].1.is_ascii_digit() || chars[k].1 == '.')
            {
                k += 1;
            }
            // exponent only if followed by digits, optionally signed
            if k < chars.len() && matches!(chars[k].1, 'e' | 'E') {
                let mut j = k + 1;
                if j < chars.len() && matches!(chars[j].1, '+' | '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].1.is_ascii_digit() {
                    k = j;
                    while k < chars.len() && chars[k].1.is_ascii_digit() {
                        k += 1;
                    }
                }
            }
            let end = chars.get(k).map(|(p, _)| *p).unwrap_or(src.len());
            let text = &src[pos..end];
            let val: f64 = text.parse()
                .map_err(|_| ExprError::BadNumber(text.to_string()))?;
            tokens.push((Token::Num(val), chars[start].0));
        } else if c.is_alphabetic() || c == '_' {
            while k < chars.len()
                && (chars[k].1.is_alphanumeric()
                    || chars[k].1 == '_'
                    || chars[k].1 == '.')
            {
                k += 1;
            }
            let end = chars.get(k).map(|(p, _)| *p).unwrap_or(src.len());
            tokens.push((Token::Ident(src[pos..end].to_string()), pos));
        } else if c == '(' {
            tokens.push((Token::LParen, pos));
            k += 1;
        } else if c == ')' {
            tokens.push((Token::RParen, pos));
            k += 1;
        } else if c == ',' {
            tokens.push((Token::Comma, pos));
            k += 1;
        } else if let Some(op)
            = OPERATORS.iter().find(|op| src[pos..].starts_with(**op))
        {
            tokens.push((Token::Op(*op), pos));
            k += op.chars().count();
        } else {
            return Err(ExprError::UnexpectedChar(c, pos));
        }
    }
    Ok(tokens)
}

// split an optional module qualifier off of a name, returning the canonical
// module name alongside the bare name
fn unqualify(name: &str) -> ExprResult<(Option<&'static str>, &str)> {
    match name.split_once('.') {
        None => Ok((None, name)),
        Some((module, rest)) => {
            MODULES.iter()
                .find(|(alias, _)| *alias == module)
                .map(|(_, canon)| (Some(*canon), rest))
                .ok_or_else(|| ExprError::UnknownName(name.to_string()))
        },
    }
}

/// Parsed (unbound) expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Literal number, or an already-folded constant.
    Num(f64),
    /// The position variable.
    Pos,
    /// Reference to a parameter, resolved by [`Expr::bind`].
    Name(String),
    Neg(Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    k: usize,
    modules: BTreeSet<&'static str>,
}

impl Parser {
    fn new(src: &str) -> ExprResult<Self> {
        let tokens = tokenize(src)?;
        Ok(Self { tokens, k: 0, modules: BTreeSet::new() })
    }

    fn peek(&self) -> Option<&Token> { self.tokens.get(self.k).map(|(t, _)| t) }

    fn next(&mut self) -> ExprResult<(Token, usize)> {
        let tok = self.tokens.get(self.k).cloned()
            .ok_or(ExprError::UnexpectedEnd)?;
        self.k += 1;
        Ok(tok)
    }

    fn expect(&mut self, want: Token) -> ExprResult<()> {
        let (tok, pos) = self.next()?;
        if tok == want {
            Ok(())
        } else {
            Err(ExprError::UnexpectedToken(tok.to_string(), pos))
        }
    }

    fn finish(&self) -> ExprResult<()> {
        match self.tokens.get(self.k) {
            None => Ok(()),
            Some((tok, pos)) => {
                Err(ExprError::UnexpectedToken(tok.to_string(), *pos))
            },
        }
    }

    fn peek_op(&self, ops: &[&'static str]) -> Option<&'static str> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => Some(*op),
            _ => None,
        }
    }

    fn comparison(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.additive()?;
        while let Some(op) = self.peek_op(&["<", "<=", ">", ">=", "==", "!="]) {
            self.k += 1;
            let rhs = self.additive()?;
            let op = match op {
                "<" => BinOp::Lt,
                "<=" => BinOp::Le,
                ">" => BinOp::Gt,
                ">=" => BinOp::Ge,
                "==" => BinOp::Eq,
                _ => BinOp::Ne,
            };
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.term()?;
        while let Some(op) = self.peek_op(&["+", "-"]) {
            self.k += 1;
            let rhs = self.term()?;
            let op = if op == "+" { BinOp::Add } else { BinOp::Sub };
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek_op(&["*", "/", "%"]) {
            self.k += 1;
            let rhs = self.unary()?;
            let op = match op {
                "*" => BinOp::Mul,
                "/" => BinOp::Div,
                _ => BinOp::Rem,
            };
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> ExprResult<Expr> {
        match self.peek_op(&["-", "+"]) {
            Some("-") => {
                self.k += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            },
            Some(_) => {
                self.k += 1;
                self.unary()
            },
            None => self.power(),
        }
    }

    // power binds tighter than unary minus on its left but accepts a signed
    // exponent on its right: -2^2 = -4, 2^-1 = 0.5
    fn power(&mut self) -> ExprResult<Expr> {
        let base = self.primary()?;
        if self.peek_op(&["^", "**"]).is_some() {
            self.k += 1;
            let exp = self.unary()?;
            Ok(Expr::Bin(BinOp::Pow, Box::new(base), Box::new(exp)))
        } else {
            Ok(base)
        }
    }

    fn primary(&mut self) -> ExprResult<Expr> {
        let (tok, pos) = self.next()?;
        match tok {
            Token::Num(v) => Ok(Expr::Num(v)),
            Token::LParen => {
                let inner = self.comparison()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            },
            Token::Ident(name) if self.peek() == Some(&Token::LParen) => {
                self.k += 1;
                self.call(&name)
            },
            Token::Ident(name) => self.name(&name),
            tok => Err(ExprError::UnexpectedToken(tok.to_string(), pos)),
        }
    }

    fn call(&mut self, name: &str) -> ExprResult<Expr> {
        let (module, bare) = unqualify(name)?;
        let func = Func::lookup(bare)
            .ok_or_else(|| ExprError::UnknownFunction(name.to_string()))?;
        if let Some(m) = module { self.modules.insert(m); }
        let mut args: Vec<Expr> = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.k += 1;
        } else {
            loop {
                args.push(self.comparison()?);
                let (tok, pos) = self.next()?;
                match tok {
                    Token::Comma => { continue; },
                    Token::RParen => { break; },
                    tok => {
                        return Err(
                            ExprError::UnexpectedToken(tok.to_string(), pos));
                    },
                }
            }
        }
        if args.len() != func.arity() {
            return Err(ExprError::Arity {
                func: name.to_string(),
                expected: func.arity(),
                got: args.len(),
            });
        }
        Ok(Expr::Call(func, args))
    }

    fn name(&mut self, name: &str) -> ExprResult<Expr> {
        let (module, bare) = unqualify(name)?;
        if let Some((_, val)) = CONSTANTS.iter().find(|(c, _)| *c == bare) {
            if let Some(m) = module { self.modules.insert(m); }
            return Ok(Expr::Num(*val));
        }
        match (module, bare) {
            (None, POSITION) => Ok(Expr::Pos),
            (None, _) => Ok(Expr::Name(bare.to_string())),
            (Some(_), _) => Err(ExprError::UnknownName(name.to_string())),
        }
    }
}

impl Expr {
    /// Parse a single expression.
    pub fn parse(src: &str) -> ExprResult<Self> {
        Self::parse_with_modules(src).map(|(expr, _)| expr)
    }

    /// Parse a single expression, also returning the (canonical) names of
    /// all modules referenced through qualified names like `np.sin`.
    pub fn parse_with_modules(src: &str)
        -> ExprResult<(Self, BTreeSet<&'static str>)>
    {
        let mut parser = Parser::new(src)?;
        let expr = parser.comparison()?;
        parser.finish()?;
        Ok((expr, parser.modules))
    }

    /// Parse a comma-separated list of expressions.
    pub fn parse_list(src: &str)
        -> ExprResult<(Vec<Self>, BTreeSet<&'static str>)>
    {
        let mut parser = Parser::new(src)?;
        let mut items: Vec<Self> = vec![parser.comparison()?];
        while parser.peek() == Some(&Token::Comma) {
            parser.k += 1;
            items.push(parser.comparison()?);
        }
        parser.finish()?;
        Ok((items, parser.modules))
    }

    /// Return `true` if the position variable appears anywhere in `self`.
    pub fn depends_on_pos(&self) -> bool {
        match self {
            Self::Num(_) | Self::Name(_) => false,
            Self::Pos => true,
            Self::Neg(a) => a.depends_on_pos(),
            Self::Bin(_, a, b) => a.depends_on_pos() || b.depends_on_pos(),
            Self::Call(_, args) => args.iter().any(Self::depends_on_pos),
        }
    }

    /// Resolve all parameter names against `params`, folding every
    /// sub-expression that doesn't depend on the position variable.
    pub fn bind(&self, params: &BTreeMap<String, f64>) -> ExprResult<BoundExpr> {
        self.fold(params).map(BoundExpr)
    }

    /// Like [`Self::bind`], but require the result to be a plain number.
    pub fn bind_const(&self, params: &BTreeMap<String, f64>) -> ExprResult<f64> {
        self.bind(params)?.as_const().ok_or(ExprError::NotConstant)
    }

    fn fold(&self, params: &BTreeMap<String, f64>) -> ExprResult<Self> {
        let folded = match self {
            Self::Num(v) => Self::Num(*v),
            Self::Pos => Self::Pos,
            Self::Name(name) => {
                params.get(name)
                    .map(|v| Self::Num(*v))
                    .ok_or_else(|| ExprError::UnknownName(name.clone()))?
            },
            Self::Neg(a) => {
                match a.fold(params)? {
                    Self::Num(v) => Self::Num(-v),
                    a => Self::Neg(Box::new(a)),
                }
            },
            Self::Bin(op, a, b) => {
                match (a.fold(params)?, b.fold(params)?) {
                    (Self::Num(u), Self::Num(v)) => Self::Num(op.apply(u, v)),
                    (a, b) => Self::Bin(*op, Box::new(a), Box::new(b)),
                }
            },
            Self::Call(func, args) => {
                let args: Vec<Self>
                    = args.iter()
                    .map(|a| a.fold(params))
                    .collect::<ExprResult<_>>()?;
                let vals: Option<Vec<f64>>
                    = args.iter()
                    .map(|a| if let Self::Num(v) = a { Some(*v) } else { None })
                    .collect();
                match vals {
                    Some(vals) => Self::Num(func.apply(&vals)),
                    None => Self::Call(*func, args),
                }
            },
        };
        Ok(folded)
    }

    // only called on bound trees, where `Name` can't occur
    fn eval(&self, x: f64) -> f64 {
        match self {
            Self::Num(v) => *v,
            Self::Pos => x,
            Self::Name(_) => f64::NAN,
            Self::Neg(a) => -a.eval(x),
            Self::Bin(op, a, b) => op.apply(a.eval(x), b.eval(x)),
            Self::Call(func, args) => {
                match args.as_slice() {
                    [a] => func.apply(&[a.eval(x)]),
                    [a, b] => func.apply(&[a.eval(x), b.eval(x)]),
                    [a, b, c] => func.apply(&[a.eval(x), b.eval(x), c.eval(x)]),
                    _ => f64::NAN,
                }
            },
        }
    }
}

/// An expression whose only free variable is the position.
///
/// Produced by [`Expr::bind`].
#[derive(Clone, Debug, PartialEq)]
pub struct BoundExpr(Expr);

impl BoundExpr {
    /// Evaluate at position `x`.
    pub fn eval(&self, x: f64) -> f64 { self.0.eval(x) }

    /// Return the value of `self` if it doesn't depend on position.
    pub fn as_const(&self) -> Option<f64> {
        match self.0 {
            Expr::Num(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_const(src: &str) -> f64 {
        Expr::parse(src).unwrap().bind_const(&BTreeMap::new()).unwrap()
    }

    #[test]
    fn precedence() {
        assert_eq!(eval_const("1 + 2 * 3"), 7.0);
        assert_eq!(eval_const("(1 + 2) * 3"), 9.0);
        assert_eq!(eval_const("-2^2"), -4.0);
        assert_eq!(eval_const("2**-1"), 0.5);
        assert_eq!(eval_const("2^3^2"), 512.0);
        assert_eq!(eval_const("10 - 4 - 3"), 3.0);
        assert_eq!(eval_const("1 + 2 < 4"), 1.0);
        assert_eq!(eval_const("1.5e1 / 3"), 5.0);
    }

    #[test]
    fn floor_modulo() {
        assert_eq!(eval_const("7 % 3"), 1.0);
        assert_eq!(eval_const("-1 % 3"), 2.0);
        assert_eq!(eval_const("mod(7.5, 2)"), 1.5);
    }

    #[test]
    fn functions_and_modules() {
        assert_eq!(eval_const("sqrt(16) + abs(-1)"), 5.0);
        assert_eq!(eval_const("where(2 > 1, 10, 20)"), 10.0);
        assert_eq!(eval_const("max(1, min(5, 3))"), 3.0);
        assert_eq!(eval_const("step(0) + step(-1)"), 1.0);
        assert!((eval_const("np.cos(pi)") + 1.0).abs() < 1e-15);
        let (_, modules) = Expr::parse_with_modules("np.sin(x) + math.pi")
            .unwrap();
        assert_eq!(modules.into_iter().collect::<Vec<_>>(), ["math", "numpy"]);
    }

    #[test]
    fn binding() {
        let params = BTreeMap::from([
            ("w".to_string(), 2.0),
            ("s".to_string(), 1.0),
        ]);
        let f = Expr::parse("where(x % w < s, -3, 0)").unwrap()
            .bind(&params).unwrap();
        assert_eq!(f.as_const(), None);
        assert_eq!(f.eval(0.5), -3.0);
        assert_eq!(f.eval(1.5), 0.0);
        assert_eq!(f.eval(2.5), -3.0);
        assert!(matches!(
            Expr::parse("q + 1").unwrap().bind(&params),
            Err(ExprError::UnknownName(name)) if name == "q"
        ));
        assert!(matches!(
            Expr::parse("x + w").unwrap().bind_const(&params),
            Err(ExprError::NotConstant)
        ));
    }

    #[test]
    fn lists() {
        let params = BTreeMap::from([("a".to_string(), 4.0)]);
        let (items, _) = Expr::parse_list("-a, max(a, 1) / 2").unwrap();
        let vals: Vec<f64>
            = items.iter().map(|e| e.bind_const(&params).unwrap()).collect();
        assert_eq!(vals, [-4.0, 2.0]);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(Expr::parse("1 +"), Err(ExprError::UnexpectedEnd)));
        assert!(matches!(
            Expr::parse("1 $ 2"),
            Err(ExprError::UnexpectedChar('$', 2))
        ));
        assert!(matches!(
            Expr::parse("system(1)"),
            Err(ExprError::UnknownFunction(_))
        ));
        assert!(matches!(
            Expr::parse("sin(1, 2)"),
            Err(ExprError::Arity { expected: 1, got: 2, .. })
        ));
        assert!(matches!(
            Expr::parse("os.getcwd"),
            Err(ExprError::UnknownName(_))
        ));
        assert!(matches!(
            Expr::parse("(1 + 2"),
            Err(ExprError::UnexpectedEnd)
        ));
        assert!(matches!(
            Expr::parse("1 2"),
            Err(ExprError::UnexpectedToken(_, 2))
        ));
        assert!(matches!(Expr::parse("1.2.3"), Err(ExprError::BadNumber(_))));
    }
}
