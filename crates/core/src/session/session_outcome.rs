use thiserror::Error;

use crate::enrollment::domain::enrollment_aggregator::AggregationError;
use crate::liveness::domain::liveness_evaluator::LivenessReport;
use crate::shared::face_profile::FaceProfile;
use crate::shared::vector_math::Embedding;

/// Which flow a bounded session runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionMode {
    /// Create a new profile.
    Enroll,
    /// Verify against a reference profile; enrolls when there is none.
    Login,
    /// Replace an existing profile. Held to the enrollment liveness bar.
    Update,
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionMode::Enroll => write!(f, "enroll"),
            SessionMode::Login => write!(f, "login"),
            SessionMode::Update => write!(f, "update"),
        }
    }
}

/// Terminal result of a bounded session.
///
/// Recoverable failures the user can retry (`FaceNotDetected`,
/// `LivenessFailed`) and the re-enrollment signal (`ProfileVersionMismatch`)
/// are outcomes, not errors.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionOutcome {
    /// New representative embedding for the caller to persist.
    Enrolled { embedding: Embedding },
    Matched { distance: f64 },
    /// Distance is kept for user-facing diagnostics.
    NoMatch { distance: f64 },
    LivenessFailed { report: LivenessReport },
    FaceNotDetected,
    /// Stored embedding was produced by an incompatible detector version.
    ProfileVersionMismatch { stored_len: usize, detected_len: usize },
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SessionOutcome::Enrolled { .. } | SessionOutcome::Matched { .. })
    }

    /// Profile to persist for `name`, when this outcome produced one.
    pub fn into_profile(self, name: &str) -> Option<FaceProfile> {
        match self {
            SessionOutcome::Enrolled { embedding } => Some(FaceProfile::new(name, embedding)),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionOutcome::Enrolled { embedding } => {
                write!(f, "enrolled ({}-dimensional embedding)", embedding.len())
            }
            SessionOutcome::Matched { distance } => write!(f, "matched (distance {distance:.3})"),
            SessionOutcome::NoMatch { distance } => write!(
                f,
                "face did not match (distance {distance:.3}); try better lighting"
            ),
            SessionOutcome::LivenessFailed { report } => write!(
                f,
                "liveness check failed ({report}); blink and move your head slightly"
            ),
            SessionOutcome::FaceNotDetected => {
                write!(f, "face not detected; try again with better lighting")
            }
            SessionOutcome::ProfileVersionMismatch {
                stored_len,
                detected_len,
            } => write!(
                f,
                "stored profile has {stored_len} dimensions but detector produces {detected_len}; re-enroll required"
            ),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("frame source failed: {0}")]
    FrameSource(Box<dyn std::error::Error>),
    #[error("sample aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),
}
