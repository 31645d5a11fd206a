//! Embedding vectors and the two primitives everything else is built on:
//! L2 normalization and Euclidean distance.

use serde::{Deserialize, Serialize};

/// Distance reported for vectors that cannot be compared.
///
/// Worse than any real distance, so it never wins a nearest-neighbour search
/// and never passes a threshold.
pub const INCOMPARABLE: f64 = f64::INFINITY;

/// Face feature vector produced by the external detector.
///
/// Immutable once built: normalization returns a new `Embedding`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unit-length copy of this embedding. See [`l2_normalize`].
    pub fn normalized(&self) -> Embedding {
        Embedding(l2_normalize(&self.0))
    }

    pub fn distance_to(&self, other: &Embedding) -> f64 {
        distance(&self.0, &other.0)
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Returns `v / ||v||`. A zero vector is returned unchanged.
pub fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let n = norm(v);
    let n = if n > 0.0 { n } else { 1.0 };
    v.iter().map(|x| (*x as f64 / n) as f32).collect()
}

/// Euclidean distance, or [`INCOMPARABLE`] when the lengths differ or
/// either side is empty.
pub fn distance(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return INCOMPARABLE;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt()
}
