//! Nearest-neighbour identification against enrolled profiles.

use serde::{Deserialize, Serialize};

use crate::shared::face_profile::FaceProfile;
use crate::shared::vector_math::{distance, Embedding};

pub const DEFAULT_RECOGNITION_THRESHOLD: f64 = 0.6;
pub const DEFAULT_LOGIN_THRESHOLD: f64 = 0.75;

/// Label shown for faces that match no enrolled profile.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Distance thresholds for the two matching regimes.
///
/// Live recognition is stricter than the explicit login flow, which
/// already knows which identity to expect.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchThresholds {
    pub recognition: f64,
    pub login: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            recognition: DEFAULT_RECOGNITION_THRESHOLD,
            login: DEFAULT_LOGIN_THRESHOLD,
        }
    }
}

/// Winning candidate of a nearest-neighbour search.
#[derive(Clone, Debug, PartialEq)]
pub struct NearestMatch<'a> {
    pub index: usize,
    pub profile: &'a FaceProfile,
    pub distance: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Identity {
    Known { name: String, distance: f64 },
    Unknown,
}

impl Identity {
    pub fn label(&self) -> &str {
        match self {
            Identity::Known { name, .. } => name,
            Identity::Unknown => UNKNOWN_LABEL,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Identity::Known { .. })
    }
}

/// Closest candidate to `query` after normalizing both sides.
///
/// Ties resolve to the earliest candidate. Returns `None` for an empty
/// candidate list; incomparable candidates never win.
pub fn nearest<'a>(query: &Embedding, candidates: &'a [FaceProfile]) -> Option<NearestMatch<'a>> {
    nearest_among(query, candidates.iter().enumerate())
}

/// Identity of `query` among `known`, or `Unknown` when nothing is within
/// `threshold`. Profiles whose embedding length differs from the query's
/// are skipped.
pub fn identify(query: &Embedding, known: &[FaceProfile], threshold: f64) -> Identity {
    let comparable = known
        .iter()
        .enumerate()
        .filter(|(_, p)| p.embedding.len() == query.len());

    match nearest_among(query, comparable) {
        Some(m) if m.distance <= threshold => Identity::Known {
            name: m.profile.name.clone(),
            distance: m.distance,
        },
        _ => Identity::Unknown,
    }
}

fn nearest_among<'a>(
    query: &Embedding,
    candidates: impl Iterator<Item = (usize, &'a FaceProfile)>,
) -> Option<NearestMatch<'a>> {
    let query = query.normalized();
    let mut best: Option<NearestMatch<'a>> = None;

    for (index, profile) in candidates {
        let d = distance(query.values(), profile.embedding.normalized().values());
        if !d.is_finite() {
            continue;
        }
        if best.as_ref().map_or(true, |b| d < b.distance) {
            best = Some(NearestMatch {
                index,
                profile,
                distance: d,
            });
        }
    }

    best
}
