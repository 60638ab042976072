//! Symbolic Boolean formulas over entity names.
//!
//! The accepted syntax covers what the synthesizer prints and the usual
//! operator shorthand:
//!
//! ```text
//! or    := and (("OR" | "|" | "||") and)*
//! and   := unary (("AND" | "&" | "&&") unary)*
//! unary := ("NOT" | "!" | "~") unary | atom
//! atom  := "(" or ")" | "0" | "1" | "true" | "false" | name
//! ```
//!
//! Keywords are case-insensitive. Names are resolved against the entity list
//! at parse time, so an [`Expr`] only ever holds entity indices.

use std::collections::BTreeSet;

use crate::error::{NetworkError, NetworkResult};
use crate::state::State;

/// A parsed Boolean formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Const(bool),
    Var(usize),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    /// Parse `input`, resolving names against `names`.
    pub fn parse<S: AsRef<str>>(input: &str, names: &[S]) -> NetworkResult<Self> {
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            input,
            tokens,
            pos: 0,
            names,
        };
        let expr = parser.parse_or()?;
        if let Some(tok) = parser.tokens.get(parser.pos) {
            return Err(parser.error(tok.offset, "unexpected trailing input"));
        }
        Ok(expr)
    }

    /// Evaluate against a full state.
    pub fn eval(&self, state: &State) -> bool {
        match self {
            Expr::Const(value) => *value,
            Expr::Var(index) => state.get(*index).unwrap_or(false),
            Expr::Not(inner) => !inner.eval(state),
            Expr::And(terms) => terms.iter().all(|t| t.eval(state)),
            Expr::Or(terms) => terms.iter().any(|t| t.eval(state)),
        }
    }

    /// Entity indices this formula mentions.
    pub fn variables(&self) -> BTreeSet<usize> {
        let mut vars = BTreeSet::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut BTreeSet<usize>) {
        match self {
            Expr::Const(_) => {}
            Expr::Var(index) => {
                vars.insert(*index);
            }
            Expr::Not(inner) => inner.collect_variables(vars),
            Expr::And(terms) | Expr::Or(terms) => {
                for term in terms {
                    term.collect_variables(vars);
                }
            }
        }
    }

    /// Render with `AND`/`OR`/`NOT` keywords, parenthesizing only where
    /// precedence requires it.
    pub fn render<S: AsRef<str>>(&self, names: &[S]) -> String {
        let mut out = String::new();
        self.render_into(names, 0, &mut out);
        out
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Or(_) => 1,
            Expr::And(_) => 2,
            Expr::Not(_) => 3,
            Expr::Const(_) | Expr::Var(_) => 4,
        }
    }

    fn render_into<S: AsRef<str>>(&self, names: &[S], parent: u8, out: &mut String) {
        let own = self.precedence();
        let wrap = own < parent;
        if wrap {
            out.push('(');
        }
        match self {
            Expr::Const(value) => out.push_str(if *value { "1" } else { "0" }),
            Expr::Var(index) => match names.get(*index) {
                Some(name) => out.push_str(name.as_ref()),
                None => out.push_str(&format!("#{index}")),
            },
            Expr::Not(inner) => {
                out.push_str("NOT ");
                inner.render_into(names, own, out);
            }
            Expr::And(terms) | Expr::Or(terms) => {
                let sep = if matches!(self, Expr::And(_)) {
                    " AND "
                } else {
                    " OR "
                };
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        out.push_str(sep);
                    }
                    // Strictly higher so nested same-kind groups keep their parentheses.
                    term.render_into(names, own + 1, out);
                }
            }
        }
        if wrap {
            out.push(')');
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    And,
    Or,
    Not,
    LParen,
    RParen,
    Const(bool),
    Ident(String),
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

const KEYWORDS: [&str; 7] = ["and", "or", "not", "0", "1", "true", "false"];

fn is_name_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c == '\''
}

/// Check that `name` reads back as a single entity reference in a formula.
pub fn validate_name(name: &str) -> NetworkResult<()> {
    let invalid = |message: &str| NetworkError::InvalidEntityName {
        name: name.to_string(),
        message: message.to_string(),
    };

    let mut chars = name.chars();
    match chars.next() {
        None => return Err(invalid("name is empty")),
        Some(c) if !is_name_start(c) => {
            return Err(invalid("must start with a letter, digit or '_'"))
        }
        Some(_) => {}
    }
    if !chars.all(is_name_char) {
        return Err(invalid("may only contain letters, digits, '_' and '\''"));
    }
    if KEYWORDS.contains(&name.to_ascii_lowercase().as_str()) {
        return Err(invalid("reserved word"));
    }
    Ok(())
}

fn tokenize(input: &str) -> NetworkResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '(' => {
                chars.next();
                TokenKind::LParen
            }
            ')' => {
                chars.next();
                TokenKind::RParen
            }
            '!' | '~' => {
                chars.next();
                TokenKind::Not
            }
            '&' | '|' => {
                chars.next();
                if chars.peek().map(|&(_, n)| n) == Some(c) {
                    chars.next();
                }
                if c == '&' {
                    TokenKind::And
                } else {
                    TokenKind::Or
                }
            }
            c if is_name_start(c) => {
                let mut word = String::new();
                while let Some(&(_, n)) = chars.peek() {
                    if is_name_char(n) {
                        word.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match word.to_ascii_lowercase().as_str() {
                    "and" => TokenKind::And,
                    "or" => TokenKind::Or,
                    "not" => TokenKind::Not,
                    "0" | "false" => TokenKind::Const(false),
                    "1" | "true" => TokenKind::Const(true),
                    _ => TokenKind::Ident(word),
                }
            }
            other => {
                return Err(NetworkError::ExpressionParse {
                    input: input.to_string(),
                    offset,
                    message: format!("unexpected character {other:?}"),
                })
            }
        };
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

struct Parser<'a, S> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    names: &'a [S],
}

impl<S: AsRef<str>> Parser<'_, S> {
    fn error(&self, offset: usize, message: impl Into<String>) -> NetworkError {
        NetworkError::ExpressionParse {
            input: self.input.to_string(),
            offset,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> NetworkResult<Expr> {
        let mut terms = vec![self.parse_and()?];
        while self.eat(&TokenKind::Or) {
            terms.push(self.parse_and()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::Or(terms)
        })
    }

    fn parse_and(&mut self) -> NetworkResult<Expr> {
        let mut terms = vec![self.parse_unary()?];
        while self.eat(&TokenKind::And) {
            terms.push(self.parse_unary()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::And(terms)
        })
    }

    fn parse_unary(&mut self) -> NetworkResult<Expr> {
        if self.eat(&TokenKind::Not) {
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> NetworkResult<Expr> {
        let Some(token) = self.tokens.get(self.pos).cloned() else {
            return Err(self.error(self.input.len(), "unexpected end of expression"));
        };
        self.pos += 1;

        match token.kind {
            TokenKind::LParen => {
                let inner = self.parse_or()?;
                if !self.eat(&TokenKind::RParen) {
                    let offset = self
                        .tokens
                        .get(self.pos)
                        .map_or(self.input.len(), |t| t.offset);
                    return Err(self.error(offset, "expected ')'"));
                }
                Ok(inner)
            }
            TokenKind::Const(value) => Ok(Expr::Const(value)),
            TokenKind::Ident(name) => self
                .names
                .iter()
                .position(|n| n.as_ref() == name)
                .map(Expr::Var)
                .ok_or(NetworkError::UnknownEntity { name }),
            other => Err(self.error(token.offset, format!("unexpected token {other:?}"))),
        }
    }
}
