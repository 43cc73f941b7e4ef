//! Overlapping fixed-window text chunker.
//!
//! Splits a source document into windows of `window` characters with
//! `overlap` characters shared between adjacent chunks, so a fact that
//! straddles a window edge still appears whole in one of the two chunks.

use serde::{Deserialize, Serialize};

/// A bounded slice of a source document, the unit of embedding and retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Chunk text
    pub text: String,
    /// Path of the source file this chunk came from
    pub source: String,
    /// Character offset of the chunk within its source document
    pub start_offset: usize,
    /// Shard that owns this chunk (None until partitioned)
    pub shard: Option<usize>,
}

/// Split one document into overlapping chunks.
///
/// `window` and `overlap` are measured in characters; multi-byte text is
/// never split inside a code point. A non-empty document always yields at
/// least one chunk; an empty document yields none.
pub fn split_text(source: &str, text: &str, window: usize, overlap: usize) -> Vec<DocumentChunk> {
    if text.is_empty() || window == 0 {
        return Vec::new();
    }

    // Overlap must leave room for forward progress.
    let overlap = overlap.min(window - 1);
    let step = window - overlap;

    // Byte offset of every char boundary, plus the end of the text.
    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    bounds.push(text.len());
    let char_count = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let end = (start + window).min(char_count);
        let piece = &text[bounds[start]..bounds[end]];
        if !piece.trim().is_empty() {
            chunks.push(DocumentChunk {
                text: piece.to_string(),
                source: source.to_string(),
                start_offset: start,
                shard: None,
            });
        }
        if end == char_count {
            break;
        }
        start += step;
    }

    chunks
}

/// Partition a chunk sequence into `count` contiguous shards of near-equal
/// size; the last shard absorbs the integer-division remainder. Each chunk
/// is stamped with its owning shard.
pub fn partition_chunks(chunks: Vec<DocumentChunk>, count: usize) -> Vec<Vec<DocumentChunk>> {
    if count <= 1 || chunks.is_empty() {
        return vec![chunks];
    }

    let part_size = chunks.len() / count;
    if part_size == 0 {
        // Fewer chunks than shards: everything lands in one shard.
        return vec![chunks];
    }

    let mut shards: Vec<Vec<DocumentChunk>> = Vec::with_capacity(count);
    let mut iter = chunks.into_iter();
    for shard_id in 0..count {
        let take = if shard_id < count - 1 {
            part_size
        } else {
            usize::MAX
        };
        let mut shard: Vec<DocumentChunk> = iter.by_ref().take(take).collect();
        for chunk in &mut shard {
            chunk.shard = Some(shard_id);
        }
        shards.push(shard);
    }
    shards
}
