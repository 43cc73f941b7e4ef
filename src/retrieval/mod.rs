//! Retrieval module - corpus ingestion and similarity search
//!
//! Loaders split heterogeneous sources into overlapping chunks; chunks are
//! embedded into one or more shard indices; queries merge per-shard hits
//! under a single global score ordering.

pub mod chunk;
pub mod index;
pub mod loader;
pub mod store;

pub use chunk::DocumentChunk;
pub use index::{CorpusIndex, ScoredChunk, Searcher, VectorIndex, CONTEXT_SEPARATOR};
pub use store::{load_corpus, save_corpus};
