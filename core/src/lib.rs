pub mod engine;
pub mod error;
pub mod index;
pub mod postings;
pub mod query;
pub mod tokenizer;

pub use engine::{evaluate, QueryReport, SearchEngine};
pub use error::{Error, Negation, Result};
pub use index::{collect_documents, DocId, DocMeta, InvertedIndex};
pub use postings::Postings;
pub use query::{flatten, parse_query, FlatQuery, QueryAst};
pub use tokenizer::TokenizerConfig;
