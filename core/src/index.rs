use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::tokenizer::{tokenize, tokenize_document, TokenizerConfig};

/// Document ids start at 1 and increase by one per document in input order.
pub type DocId = u32;

const FIRST_DOC_ID: DocId = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocMeta {
    /// Display name, the base file name for file-backed documents.
    pub name: String,
    pub path: Option<PathBuf>,
}

/// Term to postings mapping plus the document table, built once and read-only afterwards.
#[derive(Debug)]
pub struct InvertedIndex {
    dictionary: HashMap<String, Vec<DocId>>, // postings sorted by doc_id, no duplicates
    docs: BTreeMap<DocId, DocMeta>,
    next_doc_id: DocId,
}

impl Default for InvertedIndex {
    fn default() -> Self { Self::new() }
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self { dictionary: HashMap::new(), docs: BTreeMap::new(), next_doc_id: FIRST_DOC_ID }
    }

    /// Build an index over document files with the default tokenizer policy.
    pub fn build<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        Self::build_with(paths, &TokenizerConfig::default())
    }

    /// Build an index over document files. The first unreadable file aborts the build.
    pub fn build_with<P: AsRef<Path>>(paths: &[P], config: &TokenizerConfig) -> Result<Self> {
        let mut index = Self::new();
        for path in paths {
            let path = path.as_ref();
            let tokens = tokenize_document(path, config)?;
            let meta = DocMeta { name: base_name(path), path: Some(path.to_path_buf()) };
            index.add_document(meta, tokens)?;
        }
        tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), "index built");
        Ok(index)
    }

    /// Build an index over in-memory `(name, text)` pairs.
    pub fn from_texts<I, N, T>(texts: I, config: &TokenizerConfig) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: AsRef<str>,
    {
        let mut index = Self::new();
        for (name, text) in texts {
            let meta = DocMeta { name: name.into(), path: None };
            index.insert_document(meta, tokenize(text.as_ref(), config));
        }
        index
    }

    /// Assign the next id to a document and append it to the postings of each of its terms.
    ///
    /// The stream is drained fully before anything is recorded, so a failing
    /// stream leaves the index untouched and does not consume an id.
    pub fn add_document<I>(&mut self, meta: DocMeta, terms: I) -> Result<DocId>
    where
        I: IntoIterator<Item = Result<String>>,
    {
        let terms = terms.into_iter().collect::<Result<Vec<String>>>()?;
        Ok(self.insert_document(meta, terms))
    }

    fn insert_document(&mut self, meta: DocMeta, terms: Vec<String>) -> DocId {
        let doc_id = self.next_doc_id;
        self.next_doc_id += 1;
        tracing::debug!(doc_id, name = %meta.name, "indexing document");
        self.docs.insert(doc_id, meta);

        for term in terms {
            let plist = self.dictionary.entry(term).or_default();
            if plist.last() != Some(&doc_id) {
                plist.push(doc_id);
            }
        }
        doc_id
    }

    /// Postings for `term`; an unknown term has an empty list.
    pub fn postings(&self, term: &str) -> &[DocId] {
        self.dictionary.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn document(&self, doc_id: DocId) -> Option<&DocMeta> { self.docs.get(&doc_id) }

    pub fn document_name(&self, doc_id: DocId) -> Option<&str> {
        self.docs.get(&doc_id).map(|m| m.name.as_str())
    }

    /// Documents in id order.
    pub fn documents(&self) -> impl Iterator<Item = (DocId, &DocMeta)> {
        self.docs.iter().map(|(id, meta)| (*id, meta))
    }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Resolve a document collection, sorted by path. `root` is one of:
///
/// - a single file;
/// - a directory, walked recursively, keeping files whose extension matches `ext`;
/// - a glob pattern such as `corpus/*.txt`, whose matching files are taken as is.
pub fn collect_documents<P: AsRef<Path>>(root: P, ext: Option<&str>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        if let Some(pattern) = root.to_str().filter(|s| is_glob(s)) {
            return glob_documents(pattern);
        }
        let err = io::Error::new(io::ErrorKind::NotFound, "no such file or directory");
        return Err(Error::document_read(root, err));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            Error::document_read(path, e.into())
        })?;
        let p = entry.path();
        if !p.is_file() { continue; }
        let matches = match ext {
            Some(ext) => p.extension().and_then(|s| s.to_str()) == Some(ext),
            None => true,
        };
        if matches {
            files.push(p.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn is_glob(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

fn glob_documents(pattern: &str) -> Result<Vec<PathBuf>> {
    let matches = glob::glob(pattern).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })?;
    let mut files = Vec::new();
    for entry in matches {
        let p = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            Error::document_read(path, e.into_error())
        })?;
        if p.is_file() {
            files.push(p);
        }
    }
    if files.is_empty() {
        tracing::warn!(pattern, "pattern matched no documents");
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> InvertedIndex {
        InvertedIndex::from_texts(
            [
                ("d1.txt", "Brutus killed Caesar. Brutus!"),
                ("d2.txt", "Et tu Brute"),
                ("d3.txt", "Caesar and Brutus both"),
            ],
            &TokenizerConfig::default(),
        )
    }

    #[test]
    fn ids_start_at_one_in_input_order() {
        let index = corpus();
        let ids: Vec<_> = index.documents().map(|(id, m)| (id, m.name.clone())).collect();
        assert_eq!(ids, vec![(1, "d1.txt".into()), (2, "d2.txt".into()), (3, "d3.txt".into())]);
    }

    #[test]
    fn repeated_terms_are_posted_once() {
        let index = corpus();
        assert_eq!(index.postings("Brutus"), &[1, 3]);
        assert_eq!(index.postings("Caesar"), &[1, 3]);
        assert_eq!(index.postings("Brute"), &[2]);
    }

    #[test]
    fn unknown_term_is_empty() {
        let index = corpus();
        assert!(index.postings("Hamlet").is_empty());
        assert!(index.postings("brutus").is_empty());
    }

    #[test]
    fn failing_stream_leaves_index_untouched() {
        let mut index = InvertedIndex::new();
        let meta = DocMeta { name: "bad".into(), path: None };
        let terms = vec![
            Ok("a".to_string()),
            Err(Error::document_read("bad", io::Error::new(io::ErrorKind::Other, "boom"))),
        ];
        assert!(matches!(index.add_document(meta, terms), Err(Error::DocumentRead { .. })));
        assert_eq!(index.num_docs(), 0);
        assert_eq!(index.num_terms(), 0);
        assert!(index.postings("a").is_empty());

        let meta = DocMeta { name: "good".into(), path: None };
        let id = index.add_document(meta, vec![Ok("a".to_string())]).unwrap();
        assert_eq!(id, 1);
        assert_eq!(index.postings("a"), &[1]);
    }

    #[test]
    fn glob_detection() {
        assert!(is_glob("corpus/*.txt"));
        assert!(is_glob("corpus/d?.txt"));
        assert!(!is_glob("corpus/d1.txt"));
    }
}
