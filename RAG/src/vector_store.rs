use crate::error::{RagError, Result};
use crate::models::{DocumentChunk, ScoredChunk};

/// Flat in-memory cosine index. Built once, read-only afterwards.
#[derive(Debug, Default)]
pub struct VectorStore {
    dimension: usize,
    entries: Vec<(Vec<f32>, DocumentChunk)>,
}

impl VectorStore {
    pub fn from_embeddings(chunks: Vec<DocumentChunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::provider(
                "Embedding",
                None,
                format!("Expected {} embeddings, got {}", chunks.len(), embeddings.len()),
            ));
        }

        let mut store = Self::default();
        for (embedding, chunk) in embeddings.into_iter().zip(chunks) {
            store.insert(embedding, chunk)?;
        }
        Ok(store)
    }

    pub fn insert(&mut self, embedding: Vec<f32>, chunk: DocumentChunk) -> Result<()> {
        if self.entries.is_empty() {
            self.dimension = embedding.len();
        } else if embedding.len() != self.dimension {
            return Err(RagError::Dimension {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }
        self.entries.push((embedding, chunk));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Top `k` chunks scoring strictly above `min_score`, best first. Equal
    /// scores keep insertion order, so results are deterministic.
    pub fn search(&self, query_embedding: &[f32], k: usize, min_score: f32) -> Result<Vec<ScoredChunk>> {
        if !self.entries.is_empty() && query_embedding.len() != self.dimension {
            return Err(RagError::Dimension {
                expected: self.dimension,
                actual: query_embedding.len(),
            });
        }

        let mut chunk_scores: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, (embedding, _))| (idx, calculate_similarity(query_embedding, embedding)))
            .filter(|(_, score)| *score > min_score)
            .collect();

        // Stable sort keeps insertion order among equal scores.
        chunk_scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let relevant_chunks: Vec<ScoredChunk> = chunk_scores
            .into_iter()
            .take(k)
            .map(|(idx, score)| ScoredChunk {
                chunk: self.entries[idx].1.clone(),
                score,
            })
            .collect();

        log::info!("Found {} relevant chunks", relevant_chunks.len());
        Ok(relevant_chunks)
    }
}

pub fn calculate_similarity(embedding1: &[f32], embedding2: &[f32]) -> f32 {
    let min_len = embedding1.len().min(embedding2.len());

    let dot_product: f32 = embedding1[..min_len]
        .iter()
        .zip(embedding2[..min_len].iter())
        .map(|(a, b)| a * b)
        .sum();

    let norm1: f32 = embedding1[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm2: f32 = embedding2[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm1 == 0.0 || norm2 == 0.0 {
        0.0
    } else {
        dot_product / (norm1 * norm2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str) -> DocumentChunk {
        DocumentChunk {
            id: content.to_string(),
            document: "doc.pdf".to_string(),
            index: 0,
            start_position: 0,
            end_position: content.len(),
            content: content.to_string(),
        }
    }

    fn store() -> VectorStore {
        VectorStore::from_embeddings(
            vec![chunk("east"), chunk("north"), chunk("north-east"), chunk("north again")],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0], vec![0.0, 2.0]],
        )
        .unwrap()
    }

    fn contents(results: &[ScoredChunk]) -> Vec<&str> {
        results.iter().map(|r| r.chunk.content.as_str()).collect()
    }

    #[test]
    fn test_similarity() {
        assert!((calculate_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(calculate_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(calculate_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_search_orders_by_score_and_keeps_ties_in_insertion_order() {
        let results = store().search(&[0.0, 1.0], 3, 0.0).unwrap();
        assert_eq!(contents(&results), vec!["north", "north again", "north-east"]);
        assert!(results[0].score >= results[2].score);
    }

    #[test]
    fn test_search_is_deterministic() {
        let store = store();
        let first = contents(&store.search(&[0.3, 0.7], 4, 0.0).unwrap())
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        for _ in 0..5 {
            let again = store.search(&[0.3, 0.7], 4, 0.0).unwrap();
            assert_eq!(contents(&again), first);
        }
    }

    #[test]
    fn test_min_score_filters_orthogonal_chunks() {
        let results = store().search(&[1.0, 0.0], 4, 0.0).unwrap();
        assert_eq!(contents(&results), vec!["east", "north-east"]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut store = store();
        let err = store.insert(vec![1.0, 2.0, 3.0], chunk("bad")).unwrap_err();
        assert!(matches!(err, RagError::Dimension { expected: 2, actual: 3 }));

        let err = store.search(&[1.0], 1, 0.0).unwrap_err();
        assert!(matches!(err, RagError::Dimension { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_empty_store() {
        let store = VectorStore::default();
        assert!(store.is_empty());
        assert!(store.search(&[1.0, 0.0], 4, 0.0).unwrap().is_empty());
    }
}
