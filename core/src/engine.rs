//! Query evaluation over an [`InvertedIndex`].

use serde::Serialize;
use std::path::Path;

use crate::error::{Error, Negation, Result};
use crate::index::{DocId, InvertedIndex};
use crate::postings::{intersect_multiple, union_multiple, Postings};
use crate::query::{flatten, parse_query, FlatQuery};
use crate::tokenizer::{normalize_term, TokenizerConfig};

/// Evaluate a flattened query to a sorted list of document ids.
///
/// Query terms go through the same normalization as indexed text before
/// lookup. A query that as a whole only says what must not match fails with
/// [`Negation::NegatedWithoutPositive`].
pub fn evaluate(
    query: &FlatQuery,
    index: &InvertedIndex,
    config: &TokenizerConfig,
) -> Result<Vec<DocId>> {
    match eval_node(query, index, config)? {
        Postings::Positive(ids) => Ok(ids),
        Postings::Negated(_) => Err(Negation::NegatedWithoutPositive.into()),
    }
}

fn eval_node(
    query: &FlatQuery,
    index: &InvertedIndex,
    config: &TokenizerConfig,
) -> Result<Postings> {
    match query {
        FlatQuery::Term(term) | FlatQuery::Lookup { term, negated: false } => {
            Ok(Postings::Positive(lookup(term, index, config)))
        }
        FlatQuery::Lookup { term, negated: true } => {
            Ok(Postings::Negated(lookup(term, index, config)))
        }
        FlatQuery::And(children) => {
            let mut args = eval_children(children, index, config)?;
            // positives first so the fold subtracts exclusions from a match set
            // regardless of where the user wrote the NOT
            args.sort_by_key(Postings::is_negated);
            intersect_multiple(&args)
        }
        FlatQuery::Or(children) => {
            let args = eval_children(children, index, config)?;
            union_multiple(&args)
        }
    }
}

fn eval_children(
    children: &[FlatQuery],
    index: &InvertedIndex,
    config: &TokenizerConfig,
) -> Result<Vec<Postings>> {
    children.iter().map(|c| eval_node(c, index, config)).collect()
}

fn lookup(term: &str, index: &InvertedIndex, config: &TokenizerConfig) -> Vec<DocId> {
    match normalize_term(term, config) {
        Some(key) => index.postings(&key).to_vec(),
        None => Vec::new(),
    }
}

/// Outcome of one query in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryReport {
    pub query: String,
    pub matches: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An index paired with the tokenizer policy it was built with.
pub struct SearchEngine {
    index: InvertedIndex,
    config: TokenizerConfig,
}

impl SearchEngine {
    pub fn new(index: InvertedIndex, config: TokenizerConfig) -> Self {
        Self { index, config }
    }

    /// Index `paths` and wrap the result.
    pub fn open<P: AsRef<Path>>(paths: &[P], config: TokenizerConfig) -> Result<Self> {
        let index = InvertedIndex::build_with(paths, &config)?;
        Ok(Self::new(index, config))
    }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn config(&self) -> &TokenizerConfig { &self.config }

    /// Parse, flatten and evaluate `query`, returning matching document ids.
    pub fn search_ids(&self, query: &str) -> Result<Vec<DocId>> {
        let flat = flatten(parse_query(query)?);
        tracing::debug!(query, %flat, "evaluating query");
        evaluate(&flat, &self.index, &self.config)
    }

    /// Like [`search_ids`](Self::search_ids) but resolved to document names.
    pub fn search(&self, query: &str) -> Result<Vec<&str>> {
        let ids = self.search_ids(query)?;
        Ok(ids.iter().filter_map(|id| self.index.document_name(*id)).collect())
    }

    /// Top-level query execution: a malformed query is logged and matches
    /// nothing, every other failure is returned.
    pub fn execute_query(&self, query: &str) -> Result<Vec<&str>> {
        match self.search(query) {
            Err(e @ Error::QuerySyntax { .. }) => {
                tracing::warn!(query, error = %e, "failed to parse query");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Run each query independently. Syntax and negation errors become a
    /// report with an error message and the batch carries on; any other
    /// error aborts the batch.
    pub fn run_batch<I, S>(&self, queries: I) -> Result<Vec<QueryReport>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        queries
            .into_iter()
            .map(|q| {
                let query = q.as_ref();
                report(query, self.search(query))
            })
            .collect()
    }
}

fn report(query: &str, outcome: Result<Vec<&str>>) -> Result<QueryReport> {
    match outcome {
        Ok(names) => Ok(QueryReport {
            query: query.to_string(),
            matches: names.into_iter().map(String::from).collect(),
            error: None,
        }),
        Err(e) if e.is_query_error() => {
            tracing::warn!(query, error = %e, "query failed");
            Ok(QueryReport {
                query: query.to_string(),
                matches: Vec::new(),
                error: Some(e.to_string()),
            })
        }
        Err(e) => Err(e),
    }
}
