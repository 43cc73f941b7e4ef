//! Vector index and similarity search
//!
//! A [`VectorIndex`] pairs each chunk with its embedding and answers top-k
//! cosine-similarity queries. A [`CorpusIndex`] holds one index per shard;
//! queries run against every shard independently and the results are
//! re-ranked by a single global sort over the union, so one shard's best
//! match can outrank another shard's entire top-k.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::core::config::RetrievalConfig;
use crate::core::Result;
use crate::llm::EmbeddingProvider;
use crate::retrieval::chunk::{partition_chunks, DocumentChunk};
use crate::retrieval::loader::load_and_chunk;

/// Separator line between context chunks in a query result
pub const CONTEXT_SEPARATOR: &str = "\n------------\n";

/// A similarity hit from one shard
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// Chunk text with newlines flattened for prompt insertion
    pub content: String,
    /// Cosine similarity against the query
    pub score: f32,
}

/// Cosine similarity between two vectors; 0.0 on mismatched or empty input
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }
    dot / denom
}

/// One shard's searchable structure: chunks plus their embeddings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorIndex {
    chunks: Vec<DocumentChunk>,
    embeddings: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Embed a chunk sequence into a searchable index
    pub async fn build(
        chunks: Vec<DocumentChunk>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed(&texts).await?;
        Ok(Self { chunks, embeddings })
    }

    /// An index with chunks but no vectors; every query returns nothing
    pub fn unindexed(chunks: Vec<DocumentChunk>) -> Self {
        Self {
            chunks,
            embeddings: Vec::new(),
        }
    }

    /// Top-k cosine similarity search, score descending
    pub fn search(&self, query_vec: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .zip(self.embeddings.iter())
            .map(|(chunk, embedding)| ScoredChunk {
                content: chunk.text.replace('\n', ", "),
                score: cosine_similarity(query_vec, embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        scored
    }

    /// Number of chunks in this shard
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check if the shard is empty
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The chunks owned by this shard
    pub fn chunks(&self) -> &[DocumentChunk] {
        &self.chunks
    }
}

/// All shards of an ingested corpus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusIndex {
    shards: Vec<VectorIndex>,
    sharded: bool,
}

impl CorpusIndex {
    /// Ingest a set of source files into a searchable corpus.
    ///
    /// Each source is loaded, chunked with the configured window/overlap,
    /// and (when `shard_count` is set) its chunk sequence is partitioned
    /// into contiguous shards, each embedded into its own index. Shards
    /// are embedded concurrently; a shard whose embedding fails is logged
    /// and left unindexed so ingestion of the rest can complete. The
    /// chunks and indices are persisted under the configured cache dir so
    /// later query phases can skip re-ingestion.
    pub async fn ingest(
        paths: &[std::path::PathBuf],
        embedder: Arc<dyn EmbeddingProvider>,
        config: &RetrievalConfig,
    ) -> Result<Self> {
        let mut shard_chunks: Vec<Vec<DocumentChunk>> = Vec::new();
        let mut merged: Vec<DocumentChunk> = Vec::new();

        for path in paths {
            let Some(chunks) = load_and_chunk(path, config.chunk_window, config.chunk_overlap)
            else {
                continue;
            };
            if chunks.is_empty() {
                continue;
            }
            match config.shard_count {
                Some(count) => shard_chunks.extend(partition_chunks(chunks, count)),
                None => merged.extend(chunks),
            }
        }

        let sharded = config.shard_count.is_some();
        if !sharded {
            shard_chunks = vec![merged];
        }

        let shard_total = shard_chunks.len();
        let mut set: JoinSet<(usize, VectorIndex)> = JoinSet::new();
        for (shard_id, chunks) in shard_chunks.into_iter().enumerate() {
            let embedder = Arc::clone(&embedder);
            set.spawn(async move {
                match VectorIndex::build(chunks.clone(), embedder.as_ref()).await {
                    Ok(index) => (shard_id, index),
                    Err(e) => {
                        warn!(shard = shard_id, error = %e, "shard embedding failed");
                        (shard_id, VectorIndex::unindexed(chunks))
                    }
                }
            });
        }

        let mut shards: Vec<(usize, VectorIndex)> = Vec::with_capacity(shard_total);
        while let Some(result) = set.join_next().await {
            match result {
                Ok(entry) => shards.push(entry),
                Err(e) => warn!(error = %e, "shard embedding task panicked"),
            }
        }
        shards.sort_by_key(|(shard_id, _)| *shard_id);

        let index = Self {
            shards: shards.into_iter().map(|(_, index)| index).collect(),
            sharded,
        };
        crate::retrieval::store::save_corpus(&config.cache_dir, &index)?;
        info!(
            shards = index.shards.len(),
            chunks = index.total_chunks(),
            cache_dir = %config.cache_dir.display(),
            "corpus ingested"
        );
        Ok(index)
    }

    /// Build directly from pre-partitioned shards (used by the cache loader)
    pub fn from_shards(shards: Vec<VectorIndex>, sharded: bool) -> Self {
        Self { shards, sharded }
    }

    /// The per-shard indices
    pub fn shards(&self) -> &[VectorIndex] {
        &self.shards
    }

    /// Whether the corpus was partitioned into multiple shards
    pub fn is_sharded(&self) -> bool {
        self.sharded
    }

    /// Total chunk count across all shards
    pub fn total_chunks(&self) -> usize {
        self.shards.iter().map(|s| s.len()).sum()
    }

    /// All chunks across all shards, in shard order
    pub fn all_chunks(&self) -> Vec<DocumentChunk> {
        self.shards
            .iter()
            .flat_map(|s| s.chunks().iter().cloned())
            .collect()
    }
}

/// Read-only query surface over a built corpus
pub struct Searcher {
    index: CorpusIndex,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Searcher {
    /// Create a searcher over a built corpus
    pub fn new(index: CorpusIndex, embedder: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self {
            index,
            embedder,
            top_k,
        }
    }

    /// Run one similarity query and join the ranked chunk texts.
    ///
    /// Single-shard corpora return the top-k chunks of the one index.
    /// Sharded corpora run the same top-k search against every shard,
    /// then sort the union by score descending before joining - the
    /// global ranking is one sort over all shards combined.
    pub async fn query(&self, text: &str) -> Result<String> {
        let inputs = vec![text.to_string()];
        let query_vec = self
            .embedder
            .embed(&inputs)
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();

        let hits = if self.index.is_sharded() {
            let mut union: Vec<ScoredChunk> = self
                .index
                .shards()
                .iter()
                .flat_map(|shard| shard.search(&query_vec, self.top_k))
                .collect();
            union.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            union
        } else {
            self.index
                .shards()
                .first()
                .map(|shard| shard.search(&query_vec, self.top_k))
                .unwrap_or_default()
        };

        Ok(hits
            .iter()
            .map(|hit| hit.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR))
    }

    /// Evaluate a batch of queries concurrently, order preserved.
    ///
    /// A failing query logs and yields an empty context string; the rest
    /// of the batch is unaffected.
    pub async fn query_batch(&self, texts: &[String]) -> Vec<String> {
        let futures = texts.iter().map(|text| self.query(text));
        join_all(futures)
            .await
            .into_iter()
            .zip(texts.iter())
            .map(|(result, text)| match result {
                Ok(context) => context,
                Err(e) => {
                    warn!(query = %text, error = %e, "similarity search failed");
                    String::new()
                }
            })
            .collect()
    }

    /// The underlying corpus
    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }
}
