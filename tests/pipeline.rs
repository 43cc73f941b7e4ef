//! End-to-end pipeline tests
//!
//! Ingests a small corpus from disk with a deterministic embedder, then
//! drives the full agent loop with a scripted reasoning model against the
//! real registry and searcher.

use std::fs;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use tableqa::agent::Agent;
use tableqa::core::{Config, Result, RunOutcome};
use tableqa::llm::{EmbeddingProvider, ModelProvider};
use tableqa::retrieval::{load_corpus, CorpusIndex, Searcher, CONTEXT_SEPARATOR};
use tableqa::tools::{RetrieveContextTool, ToolRegistry};

/// Deterministic embedder: each known topic word maps to one axis.
struct StubEmbedder;

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| stub_vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

fn stub_vector(text: &str) -> Vec<f32> {
    let topics = ["population", "price", "output"];
    let mut v: Vec<f32> = topics
        .iter()
        .map(|topic| if text.contains(topic) { 1.0 } else { 0.0 })
        .collect();
    v.push(0.1);
    v
}

/// Reasoning model that replays a scripted sequence of raw replies.
struct ScriptedModel {
    responses: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(responses: Vec<String>) -> Self {
        let mut responses = responses;
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
        }
    }
}

#[async_trait]
impl ModelProvider for ScriptedModel {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        let mut responses = self.responses.lock().unwrap();
        Ok(responses.pop().unwrap_or_else(|| "garbage".to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn write_corpus(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("indicators.csv");
    fs::write(
        &path,
        "topic,value\npopulation of the north,120\nprice index of grain,104\noutput of mills,88\n",
    )
    .unwrap();
    path
}

fn retrieval_config(cache_dir: &std::path::Path, shards: Option<usize>) -> Config {
    let mut config = Config::default();
    config.retrieval.cache_dir = cache_dir.to_path_buf();
    config.retrieval.shard_count = shards;
    config
}

#[tokio::test]
async fn single_shard_query_returns_all_chunks_ranked() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_corpus(dir.path());
    let config = retrieval_config(dir.path(), None);

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(StubEmbedder);
    let corpus = CorpusIndex::ingest(&[path], embedder.clone(), &config.retrieval)
        .await
        .unwrap();
    assert_eq!(corpus.total_chunks(), 3);
    assert!(!corpus.is_sharded());

    let searcher = Searcher::new(corpus, embedder, 3);
    let result = searcher.query("price of grain").await.unwrap();

    let parts: Vec<&str> = result.split(CONTEXT_SEPARATOR).collect();
    assert_eq!(parts.len(), 3, "k=3 over 3 chunks must return all of them");
    assert!(parts[0].contains("price index"), "best match first: {}", parts[0]);
    assert!(result.contains("population"));
    assert!(result.contains("output"));
}

#[tokio::test]
async fn sharded_ingest_merges_by_global_score() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_corpus(dir.path());
    let config = retrieval_config(dir.path(), Some(3));

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(StubEmbedder);
    let corpus = CorpusIndex::ingest(&[path], embedder.clone(), &config.retrieval)
        .await
        .unwrap();
    assert!(corpus.is_sharded());
    assert_eq!(corpus.shards().len(), 3);

    let searcher = Searcher::new(corpus, embedder, 3);
    let result = searcher.query("output").await.unwrap();
    let first = result.split(CONTEXT_SEPARATOR).next().unwrap();
    assert!(
        first.contains("output of mills"),
        "the shard holding the best match must rank first: {}",
        first
    );
}

#[tokio::test]
async fn persisted_corpus_reloads_without_reingestion() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_corpus(dir.path());
    let cache = dir.path().join("cache");
    let config = retrieval_config(&cache, Some(2));

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(StubEmbedder);
    let corpus = CorpusIndex::ingest(&[path], embedder.clone(), &config.retrieval)
        .await
        .unwrap();

    // Ingestion already persisted the corpus under the cache dir.
    let reloaded = load_corpus(&cache).unwrap();
    assert_eq!(reloaded.total_chunks(), corpus.total_chunks());

    // The reloaded index answers identically to the fresh one.
    let fresh = Searcher::new(corpus, embedder.clone(), 3);
    let cached = Searcher::new(reloaded, embedder, 3);
    assert_eq!(
        fresh.query("price").await.unwrap(),
        cached.query("price").await.unwrap()
    );
}

#[tokio::test]
async fn agent_answers_through_retrieval_tool() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_corpus(dir.path());
    let config = retrieval_config(dir.path(), None);

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(StubEmbedder);
    let corpus = CorpusIndex::ingest(&[path], embedder.clone(), &config.retrieval)
        .await
        .unwrap();
    let searcher = Arc::new(Searcher::new(corpus, embedder, 3));

    let mut registry = ToolRegistry::new();
    registry
        .register(Arc::new(RetrieveContextTool::new(searcher)))
        .unwrap();

    let retrieve = json!({
        "thoughts": "look up the price index",
        "action": {"name": "retrieve_context", "args": {"query": ["price index"]}}
    })
    .to_string();
    let finish = json!({
        "thoughts": "the context shows 104",
        "action": {"name": "Final Answer", "args": {"answer": "The price index is 104."}}
    })
    .to_string();

    let agent = Agent::new(
        config,
        Arc::new(ScriptedModel::new(vec![retrieve, finish])),
        Arc::new(registry),
        "Table: indicators.csv",
    )
    .unwrap();

    let report = agent.execute("what is the price index?").await;
    assert_eq!(
        report.outcome,
        RunOutcome::Answer("The price index is 104.".to_string())
    );
    assert_eq!(report.attempts, 2);
    // The retrieval observation fed the second round.
    assert!(report.scratchpad.entries()[0].observation.contains("104"));
}

#[tokio::test]
async fn exhausted_run_reports_no_answer() {
    let mut config = Config::default();
    config.agent.max_attempts = 2;

    let agent = Agent::new(
        config,
        Arc::new(ScriptedModel::new(vec![
            "not json".to_string(),
            "still not json".to_string(),
        ])),
        Arc::new(ToolRegistry::new()),
        "",
    )
    .unwrap();

    let report = agent.execute("anything").await;
    assert_eq!(report.outcome, RunOutcome::Exhausted);
    assert_eq!(report.attempts, 2);
    assert!(report.scratchpad.is_empty());
}
