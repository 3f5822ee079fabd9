use anyhow::Result;
use clap::Parser;
use contentrec_core::{RecommenderConfig, DEFAULT_TOP_K};
use contentrec_server::{build_app, DEFAULT_MAX_BODY_BYTES};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Largest accepted request body, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,
    /// Default number of recommendations per request
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
    /// Stem terms with the English Snowball stemmer
    #[arg(long, default_value_t = false)]
    stem: bool,
    /// Apply NFKC normalization before tokenizing
    #[arg(long, default_value_t = false)]
    nfkc: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let defaults = RecommenderConfig::default()
        .with_top_k(args.top_k)
        .with_stemming(args.stem)
        .with_unicode_normalization(args.nfkc);
    let app = build_app(defaults, args.max_body_bytes);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
