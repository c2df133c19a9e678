use futures_util::StreamExt;
use ncbiutils::{ClientConfig, Efetch};

/// Fetch PubMed citations for the ids given on the command line and print them as JSON lines
///
/// ```text
/// RUST_LOG=ncbiutils=info cargo run --example fetch_citations -- 31302001 22454523
/// ```
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let ids: Vec<String> = std::env::args().skip(1).collect();
    if ids.is_empty() {
        eprintln!("usage: fetch_citations <pmid>...");
        return Ok(());
    }

    let config = ClientConfig::from_env().with_retmax(200);
    let efetch = Efetch::pubmed(config)?;

    let mut chunks = std::pin::pin!(efetch.chunks(ids));
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        match chunk.result {
            Ok(citations) => {
                for citation in citations {
                    println!("{}", serde_json::to_string(&citation)?);
                }
            }
            Err(e) => eprintln!("batch {} failed: {}", chunk.ids.join(","), e),
        }
    }

    Ok(())
}
