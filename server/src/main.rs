use anyhow::Result;
use axum::Router;
use bsearch_core::TokenizerConfig;
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use bsearch_server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Document collection: a file, or a directory searched recursively
    #[arg(long, default_value = "./corpus")]
    corpus: String,
    /// Only index files with this extension; empty indexes every file
    #[arg(long, default_value = "txt")]
    ext: String,
    /// Lowercase terms before indexing and lookup
    #[arg(long, default_value_t = false)]
    lowercase: bool,
    /// Reduce terms to their English stem
    #[arg(long, default_value_t = false)]
    stem: bool,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = TokenizerConfig {
        lowercase: args.lowercase,
        stem: args.stem,
        ..Default::default()
    };
    let ext = (!args.ext.is_empty()).then_some(args.ext.as_str());
    let app: Router = build_app(&args.corpus, ext, config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
