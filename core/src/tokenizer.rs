use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

lazy_static! {
    static ref PUNCT: Regex = Regex::new(r"[[:punct:]]").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","an","and","are","as","at","be","been","but","by","do","does","for","from",
            "had","has","have","he","her","his","i","if","in","into","is","it","its","me","my",
            "no","nor","not","of","on","or","our","she","so","such","than","that","the","their",
            "them","then","there","these","they","this","to","too","was","we","were","what",
            "when","which","who","will","with","you","your"
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Term normalization policy shared by indexing and query lookup.
///
/// The default keeps terms exactly as they appear minus ASCII punctuation,
/// so `Brutus` and `brutus` are distinct keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizerConfig {
    pub lowercase: bool,
    pub unicode_normalize: bool,
    pub stem: bool,
    pub remove_stopwords: bool,
}

/// Normalize one whitespace-delimited word into an index key.
///
/// Returns `None` when nothing is left of the word, either because it was
/// all punctuation or because it is a stopword.
pub fn normalize_term(word: &str, config: &TokenizerConfig) -> Option<String> {
    let mut term = if config.unicode_normalize {
        word.nfkc().collect::<String>()
    } else {
        word.to_string()
    };
    term = PUNCT.replace_all(&term, "").into_owned();
    if config.lowercase {
        term = term.to_lowercase();
    }
    if term.is_empty() {
        return None;
    }
    if config.remove_stopwords && is_stopword(&term.to_lowercase()) {
        return None;
    }
    if config.stem {
        term = STEMMER.stem(&term).into_owned();
    }
    Some(term)
}

/// Tokenize in-memory text: split on whitespace, strip punctuation, drop empties.
pub fn tokenize(text: &str, config: &TokenizerConfig) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|w| normalize_term(w, config))
        .collect()
}

/// Lazy token stream over one document file, read a line at a time.
pub struct DocumentTokens {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    pending: std::vec::IntoIter<String>,
    config: TokenizerConfig,
}

impl Iterator for DocumentTokens {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(term) = self.pending.next() {
                return Some(Ok(term));
            }
            match self.lines.next()? {
                Ok(line) => self.pending = tokenize(&line, &self.config).into_iter(),
                Err(e) => return Some(Err(Error::document_read(&self.path, e))),
            }
        }
    }
}

/// Open a document and stream its terms. Calling again restarts from the top.
pub fn tokenize_document<P: AsRef<Path>>(
    path: P,
    config: &TokenizerConfig,
) -> Result<DocumentTokens> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| Error::document_read(path, e))?;
    Ok(DocumentTokens {
        path: path.to_path_buf(),
        lines: BufReader::new(f).lines(),
        pending: Vec::new().into_iter(),
        config: config.clone(),
    })
}
