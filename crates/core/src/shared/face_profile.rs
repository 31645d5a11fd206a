use serde::{Deserialize, Serialize};

use super::vector_math::Embedding;

/// An enrolled identity. `name` is the unique key within a known-face set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceProfile {
    pub name: String,
    pub embedding: Embedding,
}

impl FaceProfile {
    pub fn new(name: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            name: name.into(),
            embedding,
        }
    }
}
