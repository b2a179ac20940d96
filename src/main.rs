//! narrate - article to narration

use article_narrator::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // INFO by default for this crate; RUST_LOG overrides
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("article_narrator=info,warn")
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    cli::run().await
}
