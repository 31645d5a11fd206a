use serde::{Deserialize, Serialize};

use super::detection_box::DetectionBox;
use super::landmark_mesh::LandmarkMesh;
use super::vector_math::Embedding;

/// Best face found by the external detector in one frame.
///
/// Embedding and mesh are optional: detectors may find a face without
/// being able to describe it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "box")]
    pub bbox: DetectionBox,
    #[serde(default)]
    pub embedding: Option<Embedding>,
    #[serde(default)]
    pub mesh: Option<LandmarkMesh>,
}

impl Detection {
    pub fn new(bbox: DetectionBox) -> Self {
        Self {
            bbox,
            embedding: None,
            mesh: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_mesh(mut self, mesh: LandmarkMesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// The embedding, if present and non-empty.
    pub fn usable_embedding(&self) -> Option<&Embedding> {
        self.embedding.as_ref().filter(|e| !e.is_empty())
    }
}
