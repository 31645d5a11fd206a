//! Reduces several embedding samples of the same face into one
//! representative enrollment embedding.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::vector_math::{l2_normalize, Embedding};

pub const DEFAULT_MAX_SAMPLES: usize = 7;
pub const DEFAULT_MAX_TRIES: usize = 30;
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 120;

#[derive(Error, Debug, PartialEq)]
pub enum AggregationError {
    #[error("cannot reduce an empty sample set")]
    EmptyInput,
    #[error("sample {index} has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Bounds on the sampling loop that feeds [`reduce`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingPolicy {
    /// Stop once this many embeddings have been collected.
    pub max_samples: usize,
    /// Stop after this many detector pulls regardless of success.
    pub max_tries: usize,
    /// Real-time spacing between consecutive pulls.
    pub interval_ms: u64,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            max_tries: DEFAULT_MAX_TRIES,
            interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
        }
    }
}

/// Element-wise mean of `samples`, L2-normalized.
///
/// All samples must share one length; an empty slice is a caller bug and
/// reported as [`AggregationError::EmptyInput`].
pub fn reduce(samples: &[Embedding]) -> Result<Embedding, AggregationError> {
    let first = samples.first().ok_or(AggregationError::EmptyInput)?;
    let dim = first.len();

    let mut sum = Array1::<f64>::zeros(dim);
    for (index, sample) in samples.iter().enumerate() {
        if sample.len() != dim {
            return Err(AggregationError::DimensionMismatch {
                index,
                expected: dim,
                actual: sample.len(),
            });
        }
        sum += &Array1::from_iter(sample.values().iter().map(|v| *v as f64));
    }
    let mean = sum / samples.len() as f64;

    let mean: Vec<f32> = mean.iter().map(|v| *v as f32).collect();
    Ok(Embedding::new(l2_normalize(&mean)))
}
