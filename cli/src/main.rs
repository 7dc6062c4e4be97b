use anyhow::{Context, Result};
use bsearch_core::{collect_documents, QueryReport, SearchEngine, TokenizerConfig};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

const DEMO_QUERIES: &[&str] = &[
    "Caesar",
    "hello",
    "Brutus AND Calpurnia",
    "Brutus OR Hamlet",
    "(Brutus AND Calpurnia) OR (Romeo AND Juliet)",
    "Brutus AND NOT Calpurnia",
    "NOT Calpurnia AND Brutus",
    "NOT Brutus",
];

#[derive(Parser)]
#[command(name = "bsearch")]
#[command(about = "Run boolean queries against an in-memory inverted index", long_about = None)]
struct Cli {
    /// Document collection: a file, a directory searched recursively,
    /// or a glob pattern such as "corpus/*.txt"
    #[arg(long, default_value = "corpus")]
    corpus: String,
    /// Only index files with this extension; empty indexes every file
    #[arg(long, default_value = "txt")]
    ext: String,
    /// Lowercase terms before indexing and lookup
    #[arg(long, default_value_t = false)]
    lowercase: bool,
    /// Apply NFKC unicode normalization to terms
    #[arg(long, default_value_t = false)]
    normalize: bool,
    /// Reduce terms to their English stem
    #[arg(long, default_value_t = false)]
    stem: bool,
    /// Drop English stopwords
    #[arg(long, default_value_t = false)]
    stopwords: bool,
    /// Print one JSON report per query instead of plain text
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Queries to run, e.g. "Brutus AND NOT Calpurnia". Runs a demo set when omitted.
    queries: Vec<String>,
}

impl Cli {
    fn tokenizer_config(&self) -> TokenizerConfig {
        TokenizerConfig {
            lowercase: self.lowercase,
            unicode_normalize: self.normalize,
            stem: self.stem,
            remove_stopwords: self.stopwords,
        }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let ext = (!cli.ext.is_empty()).then_some(cli.ext.as_str());
    let paths = collect_documents(&cli.corpus, ext)
        .with_context(|| format!("collecting documents from {}", cli.corpus))?;
    let engine = SearchEngine::open(&paths, cli.tokenizer_config()).context("building index")?;
    tracing::info!(num_docs = engine.index().num_docs(), corpus = %cli.corpus, "ready");

    let queries: Vec<String> = if cli.queries.is_empty() {
        DEMO_QUERIES.iter().map(|q| q.to_string()).collect()
    } else {
        cli.queries.clone()
    };

    for report in engine.run_batch(&queries)? {
        if cli.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            print_report(&report);
        }
    }
    Ok(())
}

fn print_report(report: &QueryReport) {
    println!("Documents matching {}:", report.query);
    if let Some(err) = &report.error {
        println!("  error: {err}");
    } else if report.matches.is_empty() {
        println!("  (no matches)");
    }
    for doc in &report.matches {
        println!("{doc}");
    }
    println!();
}
