//! Cache persistence for the ingested corpus
//!
//! The raw chunk list and the per-shard vector indices are written under
//! fixed filenames in the cache directory, so a query phase can run
//! against a previously ingested corpus without re-embedding anything.
//! The artifacts are opaque serialized blobs, not a portability contract.

use std::fs;
use std::path::Path;

use crate::core::{Result, TableqaError};
use crate::retrieval::chunk::DocumentChunk;
use crate::retrieval::index::CorpusIndex;

/// Fixed filename for the persisted chunk list
pub const CHUNKS_FILE: &str = "chunks.json";

/// Fixed filename for the persisted vector store
pub const VECTOR_STORE_FILE: &str = "vector_store.json";

/// Persist both the raw chunks and the vector store to the cache dir
pub fn save_corpus(cache_dir: &Path, index: &CorpusIndex) -> Result<()> {
    fs::create_dir_all(cache_dir)?;

    let chunks: Vec<DocumentChunk> = index.all_chunks();
    let chunks_json = serde_json::to_string(&chunks)?;
    fs::write(cache_dir.join(CHUNKS_FILE), chunks_json)?;

    let store_json = serde_json::to_string(index)?;
    fs::write(cache_dir.join(VECTOR_STORE_FILE), store_json)?;

    Ok(())
}

/// Load a previously persisted corpus from the cache dir
pub fn load_corpus(cache_dir: &Path) -> Result<CorpusIndex> {
    let path = cache_dir.join(VECTOR_STORE_FILE);
    if !path.exists() {
        return Err(TableqaError::ingestion(format!(
            "no persisted vector store at {}",
            path.display()
        )));
    }
    let content = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Whether a persisted corpus exists under the cache dir
pub fn corpus_exists(cache_dir: &Path) -> bool {
    cache_dir.join(VECTOR_STORE_FILE).exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::index::VectorIndex;

    fn chunk(text: &str) -> DocumentChunk {
        DocumentChunk {
            text: text.to_string(),
            source: "t.csv".to_string(),
            start_offset: 0,
            shard: Some(0),
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let index = CorpusIndex::from_shards(
            vec![VectorIndex::unindexed(vec![chunk("a"), chunk("b")])],
            true,
        );

        save_corpus(dir.path(), &index).unwrap();
        assert!(corpus_exists(dir.path()));
        assert!(dir.path().join(CHUNKS_FILE).exists());

        let loaded = load_corpus(dir.path()).unwrap();
        assert!(loaded.is_sharded());
        assert_eq!(loaded.total_chunks(), 2);
    }

    #[test]
    fn test_load_missing_store_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!corpus_exists(dir.path()));
        assert!(load_corpus(dir.path()).is_err());
    }
}
