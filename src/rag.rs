//! Retrieval for chat context
//!
//! Ranks a user's document chunks against the query embedding by cosine
//! similarity and assembles the context block handed to the model. The
//! vector math runs in-process; chunk embeddings are computed once at
//! document-processing time.

use aegis_core::documents::ChunkRecord;

/// Chunks retrieved per query. Balances context relevance against token
/// usage.
pub const TOP_K_DOCUMENTS: usize = 5;

/// Cosine similarity of two vectors; 0.0 when either has zero magnitude
/// or the dimensions disagree
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// The `top_k` most similar chunks to the query embedding, most similar
/// first. Chunks without an embedding are skipped.
#[must_use]
pub fn select_context<'a>(
    chunks: &'a [ChunkRecord],
    query_embedding: &[f32],
    top_k: usize,
) -> Vec<&'a ChunkRecord> {
    let mut scored: Vec<(&ChunkRecord, f32)> = chunks
        .iter()
        .filter_map(|chunk| {
            let embedding = chunk.embedding.as_ref()?;
            Some((chunk, cosine_similarity(embedding, query_embedding)))
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().take(top_k).map(|(chunk, _)| chunk).collect()
}

/// Render retrieved chunks into the context block prepended to the
/// conversation
#[must_use]
pub fn build_context_block(chunks: &[&ChunkRecord]) -> String {
    if chunks.is_empty() {
        return String::new();
    }

    let mut block = String::from(
        "Excerpts from the user's uploaded insurance documents:\n\n",
    );
    for chunk in chunks {
        block.push_str(&format!("--- From \"{}\" ---\n{}\n\n", chunk.file_name, chunk.content));
    }
    block
}
