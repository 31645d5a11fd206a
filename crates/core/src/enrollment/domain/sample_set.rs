use crate::shared::vector_math::Embedding;

use super::enrollment_aggregator::{reduce, AggregationError};

/// Samples gathered by one bounded sampling loop.
///
/// Every sample shares the dimension of the first one; later samples of a
/// different length are rejected so that [`SampleSet::reduce`] only sees
/// comparable vectors.
#[derive(Debug, Default)]
pub struct SampleSet {
    samples: Vec<Embedding>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes and records `embedding`. Returns `false` when its length
    /// differs from the samples already collected.
    pub fn push(&mut self, embedding: &Embedding) -> bool {
        if let Some(first) = self.samples.first() {
            if first.len() != embedding.len() {
                log::warn!(
                    "Dropping sample with {} dimensions (expected {})",
                    embedding.len(),
                    first.len()
                );
                return false;
            }
        }
        self.samples.push(embedding.normalized());
        true
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Unit-length embeddings in draw order.
    pub fn samples(&self) -> &[Embedding] {
        &self.samples
    }

    pub fn reduce(&self) -> Result<Embedding, AggregationError> {
        reduce(&self.samples)
    }
}
