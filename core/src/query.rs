//! Boolean query parsing and flattening.
//!
//! Operators are the upper-case keywords `AND`, `OR` and `NOT`; any other
//! whitespace-delimited word is a term. Precedence is NOT > AND > OR, and
//! parentheses group.

use std::fmt;

use crate::error::{Error, Result};

/// Deepest `(` / `NOT` nesting the parser accepts.
pub const MAX_DEPTH: usize = 256;

/// Query tree as written by the user. An unparenthesized chain such as
/// `a AND b AND c` is one node; parentheses and NOT still nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryAst {
    Term(String),
    Not(Box<QueryAst>),
    And(Vec<QueryAst>),
    Or(Vec<QueryAst>),
}

/// Normalized query: NOT lives only on leaves and AND/OR are n-ary with
/// at least two children, none of which is a node of the same operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatQuery {
    Term(String),
    Lookup { term: String, negated: bool },
    And(Vec<FlatQuery>),
    Or(Vec<FlatQuery>),
}

impl fmt::Display for FlatQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, children) = match self {
            FlatQuery::Term(t) | FlatQuery::Lookup { term: t, negated: false } => {
                return f.write_str(t)
            }
            FlatQuery::Lookup { term, negated: true } => return write!(f, "NOT {term}"),
            FlatQuery::And(children) => ("AND", children),
            FlatQuery::Or(children) => ("OR", children),
        };
        write!(f, "{name}(")?;
        for (i, child) in children.iter().enumerate() {
            if i > 0 { f.write_str(", ")?; }
            write!(f, "{child}")?;
        }
        f.write_str(")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::And => f.write_str("operator AND"),
            Token::Or => f.write_str("operator OR"),
            Token::Not => f.write_str("operator NOT"),
            Token::Word(w) => write!(f, "term '{w}'"),
        }
    }
}

fn lex(query: &str) -> Vec<(Token, usize)> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut start = 0;
    let flush = |word: &mut String, start: usize, tokens: &mut Vec<(Token, usize)>| {
        if word.is_empty() { return; }
        let tok = match word.as_str() {
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            _ => Token::Word(word.clone()),
        };
        tokens.push((tok, start));
        word.clear();
    };
    for (pos, ch) in query.char_indices() {
        if ch.is_whitespace() || ch == '(' || ch == ')' {
            flush(&mut word, start, &mut tokens);
            match ch {
                '(' => tokens.push((Token::LParen, pos)),
                ')' => tokens.push((Token::RParen, pos)),
                _ => {}
            }
        } else {
            if word.is_empty() { start = pos; }
            word.push(ch);
        }
    }
    flush(&mut word, start, &mut tokens);
    tokens
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> { self.tokens.get(self.pos).map(|(t, _)| t) }

    fn next(&mut self) -> Option<(Token, usize)> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() { self.pos += 1; }
        tok
    }

    fn parse_or(&mut self) -> Result<QueryAst> {
        let mut operands = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            operands.push(self.parse_and()?);
        }
        Ok(if operands.len() == 1 { operands.remove(0) } else { QueryAst::Or(operands) })
    }

    fn parse_and(&mut self) -> Result<QueryAst> {
        let mut operands = vec![self.parse_unary()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            operands.push(self.parse_unary()?);
        }
        Ok(if operands.len() == 1 { operands.remove(0) } else { QueryAst::And(operands) })
    }

    fn descend(&mut self, at: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let message = format!("query nested deeper than {MAX_DEPTH} levels");
            return Err(Error::syntax(message, at));
        }
        Ok(())
    }

    fn parse_unary(&mut self) -> Result<QueryAst> {
        match self.next() {
            Some((Token::Word(w), _)) => Ok(QueryAst::Term(w)),
            Some((Token::Not, at)) => {
                self.descend(at)?;
                let inner = self.parse_unary()?;
                self.depth -= 1;
                Ok(QueryAst::Not(Box::new(inner)))
            }
            Some((Token::LParen, open)) => {
                self.descend(open)?;
                let inner = self.parse_or()?;
                self.depth -= 1;
                match self.next() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((tok, at)) => {
                        Err(Error::syntax(format!("expected ')' but found {tok}"), at))
                    }
                    None => {
                        Err(Error::syntax("unbalanced parentheses: '(' is never closed", open))
                    }
                }
            }
            Some((tok, at)) => {
                Err(Error::syntax(format!("expected a term but found {tok}"), at))
            }
            None => Err(Error::syntax("unexpected end of query", self.end)),
        }
    }
}

/// Parse a boolean query string.
pub fn parse_query(query: &str) -> Result<QueryAst> {
    let tokens = lex(query);
    if tokens.is_empty() {
        return Err(Error::syntax("empty query", 0));
    }
    let mut parser = Parser { tokens, pos: 0, end: query.len(), depth: 0 };
    let ast = parser.parse_or()?;
    match parser.next() {
        None => Ok(ast),
        Some((Token::RParen, at)) => {
            Err(Error::syntax("unbalanced parentheses: unexpected ')'", at))
        }
        Some((tok, at)) => {
            Err(Error::syntax(format!("expected AND or OR before {tok}"), at))
        }
    }
}

/// Flatten a parsed query: push NOT down to the terms (De Morgan) and
/// collapse same-operator chains into single n-ary nodes.
pub fn flatten(ast: QueryAst) -> FlatQuery {
    flatten_signed(ast, false)
}

fn flatten_signed(ast: QueryAst, negated: bool) -> FlatQuery {
    match ast {
        QueryAst::Term(term) if negated => FlatQuery::Lookup { term, negated: true },
        QueryAst::Term(term) => FlatQuery::Term(term),
        QueryAst::Not(inner) => flatten_signed(*inner, !negated),
        QueryAst::And(operands) => {
            let children = operands.into_iter().map(|c| flatten_signed(c, negated)).collect();
            if negated { join_or(children) } else { join_and(children) }
        }
        QueryAst::Or(operands) => {
            let children = operands.into_iter().map(|c| flatten_signed(c, negated)).collect();
            if negated { join_and(children) } else { join_or(children) }
        }
    }
}

fn join_and(parts: Vec<FlatQuery>) -> FlatQuery {
    let mut children = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            FlatQuery::And(inner) => children.extend(inner),
            other => children.push(other),
        }
    }
    FlatQuery::And(children)
}

fn join_or(parts: Vec<FlatQuery>) -> FlatQuery {
    let mut children = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            FlatQuery::Or(inner) => children.extend(inner),
            other => children.push(other),
        }
    }
    FlatQuery::Or(children)
}
