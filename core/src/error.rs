//! Error taxonomy for index construction and query evaluation.
//!
//! Construction errors ([`Error::DocumentRead`], [`Error::InvalidPattern`])
//! are fatal for a run, and so is [`Error::EmptyOperands`], which only a
//! malformed query tree can produce. Syntax and negation errors are scoped to
//! a single query and are reported without affecting the rest of a batch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A document source could not be opened or read.
    #[error("failed to read document {}: {source}", .path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A document-collection glob pattern could not be compiled.
    #[error("invalid document pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// The query string is malformed.
    #[error("query syntax error at position {position}: {message}")]
    QuerySyntax { message: String, position: usize },

    /// The query uses negation in a shape postings algebra cannot resolve.
    #[error("unsupported negation: {0}")]
    UnsupportedNegation(#[from] Negation),

    /// An AND/OR reduction was handed zero operands.
    #[error("{0} node has no operands")]
    EmptyOperands(&'static str),
}

/// The negation shapes that cannot be evaluated without a universal document set.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negation {
    #[error(
        "OR with a negated operand is not supported \
         (left negated: {left}, right negated: {right})"
    )]
    NegatedUnionOperand { left: bool, right: bool },

    #[error("NOT p1 AND NOT p2 is not supported")]
    DoubleNegation,

    #[error("a negated term needs a positive operand to be subtracted from")]
    NegatedWithoutPositive,
}

impl Error {
    pub fn document_read<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Error::DocumentRead { path: path.into(), source }
    }

    pub fn syntax<S: Into<String>>(message: S, position: usize) -> Self {
        Error::QuerySyntax { message: message.into(), position }
    }

    /// True for errors that only invalidate the query that raised them.
    pub fn is_query_error(&self) -> bool {
        matches!(self, Error::QuerySyntax { .. } | Error::UnsupportedNegation(_))
    }
}
