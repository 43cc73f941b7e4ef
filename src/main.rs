//! tableqa - Question answering over tabular corpora
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tableqa::core::{Config, RunOutcome};
use tableqa::llm::{EmbeddingProvider, ModelProvider, OpenAiClient};
use tableqa::retrieval::{self, CorpusIndex, Searcher};
use tableqa::table;
use tableqa::tools;
use tableqa::{Agent, Repl};

/// tableqa - ask questions about your tables
#[derive(Parser, Debug)]
#[command(name = "tableqa")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of tabular files to ingest (csv, xlsx, txt, json)
    #[arg(long, short = 'i')]
    data: Option<PathBuf>,

    /// Partition each source into this many shards
    #[arg(long, short = 's')]
    shards: Option<usize>,

    /// Reuse the persisted index from the cache dir instead of re-ingesting
    #[arg(long)]
    cached: bool,

    /// Chat model identifier override
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Single question mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(shards) = args.shards {
        config.retrieval.shard_count = Some(shards);
    }

    if let Some(ref model) = args.model {
        config.model.chat_model = model.clone();
    }

    if args.debug {
        config.agent.debug = true;
    }

    let client = Arc::new(OpenAiClient::from_config(&config));
    let model: Arc<dyn ModelProvider> = client.clone();
    let embedder: Arc<dyn EmbeddingProvider> = client.clone();

    // Normalize the corpus and build (or reload) the index.
    let table_description = match args.data {
        Some(ref dir) => table::preprocess_tables(dir)?,
        None => String::new(),
    };

    let corpus = if args.cached && retrieval::store::corpus_exists(&config.retrieval.cache_dir) {
        retrieval::load_corpus(&config.retrieval.cache_dir)?
    } else if let Some(ref dir) = args.data {
        let paths = table::collect_file_paths(dir)?;
        CorpusIndex::ingest(&paths, embedder.clone(), &config.retrieval).await?
    } else {
        CorpusIndex::default()
    };

    let searcher = Arc::new(Searcher::new(
        corpus,
        embedder,
        config.retrieval.top_k,
    ));

    let registry = tools::default_registry(searcher, model.clone(), table_description.clone())
        .map_err(|e| anyhow::anyhow!("tool registration failed: {}", e))?;

    let agent = Agent::new(config, model, Arc::new(registry), table_description)?;

    // Single question mode
    if let Some(question) = args.prompt {
        let report = agent.execute(&question).await;
        match report.outcome {
            RunOutcome::Answer(answer) => println!("{}", answer),
            RunOutcome::Exhausted => {
                println!("I could not produce an answer for that question.")
            }
        }
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::new(agent);
    repl.run().await?;

    Ok(())
}
