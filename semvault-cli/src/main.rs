//! Command-line client for a semvault collection backed by Qdrant.
//!
//! Connection settings come from flags or the `SEMVAULT_*` environment
//! variables; the embedding provider is selected with `--provider` and must
//! match whatever the collection was originally embedded with.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use semvault::{CollectionError, QueryOptions, VectorCollection, DEFAULT_LIMIT, DEFAULT_THRESHOLD};
use semvault_core::{Embedding, StoreError};
use semvault_embeddings::{OllamaEmbedding, OpenAiEmbedding};
use semvault_qdrant::QdrantVectorStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "semvault", version, about = "Semantic document collection client")]
struct Cli {
    /// Qdrant base URL
    #[arg(long, env = "SEMVAULT_URL", default_value = "http://localhost:6333")]
    url: String,

    /// Collection name
    #[arg(long, env = "SEMVAULT_COLLECTION", default_value = "documents")]
    collection: String,

    /// Qdrant API key (blank means no auth)
    #[arg(long, env = "SEMVAULT_API_KEY")]
    api_key: Option<String>,

    /// Embedding provider
    #[arg(long, value_enum, default_value_t = Provider::Ollama)]
    provider: Provider,

    /// Embedding model name
    #[arg(long, default_value = "nomic-embed-text")]
    model: String,

    /// Embedding dimension the model produces
    #[arg(long, default_value_t = 768)]
    dimension: usize,

    /// Ollama server URL (ollama provider only)
    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    ollama_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Provider {
    Ollama,
    Openai,
}

#[derive(Subcommand)]
enum Command {
    /// Semantic search over the collection
    Query {
        /// Query text
        text: String,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f32,
        /// Restrict to one metadata category
        #[arg(long)]
        category: Option<String>,
        /// Restrict to one metadata source
        #[arg(long)]
        source: Option<String>,
    },
    /// Aggregate collection statistics
    Stats,
    /// Documents modified within the past N days
    Recent {
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Delete every document in the collection
    Clear {
        /// Skip the interactive confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Export the collection to a line-delimited JSON file
    Backup {
        /// Output path, overwritten if present
        path: String,
    },
    /// Restore the collection from a backup file
    Restore {
        path: String,
        /// Clear the collection before importing
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error ({}): {err}", err.kind());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CollectionError> {
    let embedder = build_embedder(&cli)?;

    let mut builder = QdrantVectorStore::builder()
        .base_url(&cli.url)
        .collection(&cli.collection);
    if let Some(key) = &cli.api_key {
        builder = builder.api_key(key);
    }
    let store = builder.build().map_err(StoreError::from)?;

    let collection = VectorCollection::new(embedder, Arc::new(store));
    collection.initialize().await?;

    match cli.command {
        Command::Query {
            text,
            limit,
            threshold,
            category,
            source,
        } => {
            let options = QueryOptions {
                limit,
                threshold,
                category,
                source,
            };
            let matches = collection.query(&text, &options).await?;
            if matches.is_empty() {
                println!("no matches above threshold {threshold}");
                return Ok(());
            }
            for (rank, hit) in matches.iter().enumerate() {
                let category = hit.metadata.category.as_deref().unwrap_or("-");
                let source = hit.metadata.source.as_deref().unwrap_or("-");
                println!(
                    "{:>2}. score {:.3}  category={category}  source={source}",
                    rank + 1,
                    hit.score
                );
                println!("    {}", snippet(&hit.content));
            }
        }
        Command::Stats => {
            let stats = collection.get_stats().await?;
            println!("documents:     {}", stats.total_documents);
            println!("avg chunk:     {:.1} chars", stats.average_chunk_size);
            println!("last updated:  {}", stats.last_updated.to_rfc3339());
            if !stats.categories.is_empty() {
                println!("categories:");
                for (name, count) in &stats.categories {
                    println!("  {name}: {count}");
                }
            }
            if !stats.sources.is_empty() {
                println!("sources:");
                for (name, count) in &stats.sources {
                    println!("  {name}: {count}");
                }
            }
        }
        Command::Recent { days } => {
            let docs = collection.get_recent_docs(days).await?;
            if docs.is_empty() {
                println!("no documents modified in the past {days} day(s)");
                return Ok(());
            }
            for doc in docs {
                let modified = doc.metadata.last_modified.as_deref().unwrap_or("-");
                println!("{modified}  {}", doc.id);
            }
        }
        Command::Clear { yes } => {
            if !yes && !confirm_clear(&cli.collection)? {
                println!("aborted");
                return Ok(());
            }
            collection.clear_collection(true).await?;
            println!("collection '{}' cleared", cli.collection);
        }
        Command::Backup { path } => {
            let written = collection.export_backup(&path).await?;
            println!("wrote {written} record(s) to {path}");
        }
        Command::Restore { path, clear } => {
            let imported = collection.import_backup(&path, clear).await?;
            println!("imported {imported} record(s) from {path}");
        }
    }

    Ok(())
}

fn build_embedder(cli: &Cli) -> Result<Arc<dyn Embedding>, CollectionError> {
    match cli.provider {
        Provider::Ollama => Ok(Arc::new(OllamaEmbedding::new(
            &cli.ollama_url,
            &cli.model,
            cli.dimension,
        ))),
        Provider::Openai => {
            let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
                CollectionError::InvalidArgument(
                    "OPENAI_API_KEY must be set for --provider openai".to_string(),
                )
            })?;
            Ok(Arc::new(OpenAiEmbedding::new(
                api_key,
                &cli.model,
                cli.dimension,
            )))
        }
    }
}

/// Asks for an explicit `y` on stdin before a destructive clear.
fn confirm_clear(collection: &str) -> Result<bool, CollectionError> {
    print!("delete ALL documents in '{collection}'? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn snippet(content: &str) -> String {
    const MAX: usize = 160;
    let flattened = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= MAX {
        return flattened;
    }
    let truncated: String = flattened.chars().take(MAX).collect();
    format!("{truncated}…")
}
