use std::time::Duration;

use crate::liveness::domain::liveness_evaluator::{LivenessEvaluator, LivenessMode};
use crate::matching::domain::matcher::{identify, Identity};
use crate::shared::detection::Detection;
use crate::shared::face_profile::FaceProfile;

use super::engine_config::EngineConfig;

/// Per-frame result of the recognition overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameVerdict {
    pub identity: Identity,
    pub live: bool,
    pub liveness_score: f64,
}

impl FrameVerdict {
    pub fn label(&self) -> &str {
        self.identity.label()
    }
}

/// Unbounded recognition loop state.
///
/// Each call to [`evaluate_frame`](Self::evaluate_frame) is one decision;
/// there is nothing to cancel, callers simply stop calling it.
pub struct ContinuousRecognizer {
    evaluator: LivenessEvaluator,
    threshold: f64,
}

impl ContinuousRecognizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            evaluator: LivenessEvaluator::new(LivenessMode::Continuous, config.liveness),
            threshold: config.matching.recognition,
        }
    }

    /// Identifies the face in `detection` among `known`.
    ///
    /// Returns `None` when there is no face or the face carries no usable
    /// embedding. Liveness still advances for a face without an embedding.
    pub fn evaluate_frame(
        &mut self,
        detection: Option<&Detection>,
        known: &[FaceProfile],
        now: Duration,
    ) -> Option<FrameVerdict> {
        let detection = detection?;
        let observation = self
            .evaluator
            .observe(&detection.bbox, detection.mesh.as_ref(), now);

        let embedding = detection.usable_embedding()?;
        Some(FrameVerdict {
            identity: identify(embedding, known, self.threshold),
            live: self.evaluator.is_live(now),
            liveness_score: observation.score,
        })
    }

    pub fn reset(&mut self) {
        self.evaluator.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liveness::domain::eye_aspect_ratio::fixtures::mesh_with_ear;
    use crate::matching::domain::matcher::UNKNOWN_LABEL;
    use crate::shared::detection_box::DetectionBox;
    use crate::shared::vector_math::Embedding;

    const OPEN: f64 = 0.30;
    const CLOSED: f64 = 0.10;

    fn known() -> Vec<FaceProfile> {
        vec![
            FaceProfile::new("alice", Embedding::new(vec![1.0, 0.0, 0.0])),
            FaceProfile::new("bob", Embedding::new(vec![0.0, 1.0, 0.0])),
        ]
    }

    fn frame(x: f64, ear: f64, embedding: &[f32]) -> Detection {
        Detection::new(DetectionBox::new(x, 50.0, 100.0, 100.0))
            .with_embedding(Embedding::new(embedding.to_vec()))
            .with_mesh(mesh_with_ear(ear))
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_no_detection_is_no_op() {
        let mut r = ContinuousRecognizer::new(&EngineConfig::default());
        assert!(r.evaluate_frame(None, &known(), ms(0)).is_none());
    }

    #[test]
    fn test_identifies_known_face() {
        let mut r = ContinuousRecognizer::new(&EngineConfig::default());
        let verdict = r
            .evaluate_frame(Some(&frame(0.0, OPEN, &[2.0, 0.0, 0.0])), &known(), ms(0))
            .unwrap();
        assert_eq!(verdict.label(), "alice");
        assert!(!verdict.live);
    }

    #[test]
    fn test_far_face_is_unknown() {
        let mut r = ContinuousRecognizer::new(&EngineConfig::default());
        let verdict = r
            .evaluate_frame(Some(&frame(0.0, OPEN, &[0.0, 0.0, 1.0])), &known(), ms(0))
            .unwrap();
        assert_eq!(verdict.identity, Identity::Unknown);
        assert_eq!(verdict.label(), UNKNOWN_LABEL);
    }

    #[test]
    fn test_mismatched_profile_length_never_matches() {
        let mut r = ContinuousRecognizer::new(&EngineConfig::default());
        let verdict = r
            .evaluate_frame(Some(&frame(0.0, OPEN, &[1.0, 0.0])), &known(), ms(0))
            .unwrap();
        assert!(!verdict.identity.is_known());
    }

    #[test]
    fn test_becomes_live_with_motion_and_blink() {
        let mut r = ContinuousRecognizer::new(&EngineConfig::default());
        let known = known();
        let frames = [
            frame(0.0, OPEN, &[1.0, 0.0, 0.0]),
            frame(10.0, CLOSED, &[1.0, 0.0, 0.0]),
            frame(20.0, OPEN, &[1.0, 0.0, 0.0]),
        ];
        let verdicts: Vec<_> = frames
            .iter()
            .enumerate()
            .map(|(i, f)| r.evaluate_frame(Some(f), &known, ms(i as u64 * 33)).unwrap())
            .collect();

        assert!(!verdicts[0].live);
        assert!(!verdicts[1].live);
        assert!(verdicts[2].live);
        assert!(verdicts[2].liveness_score >= 1.5);
    }

    #[test]
    fn test_face_without_embedding_still_feeds_liveness() {
        let mut r = ContinuousRecognizer::new(&EngineConfig::default());
        let known = known();
        let bare = |x: f64, ear: f64| {
            Detection::new(DetectionBox::new(x, 50.0, 100.0, 100.0)).with_mesh(mesh_with_ear(ear))
        };

        assert!(r.evaluate_frame(Some(&bare(0.0, OPEN)), &known, ms(0)).is_none());
        assert!(r.evaluate_frame(Some(&bare(10.0, CLOSED)), &known, ms(33)).is_none());

        let verdict = r
            .evaluate_frame(Some(&frame(20.0, OPEN, &[1.0, 0.0, 0.0])), &known, ms(66))
            .unwrap();
        assert!(verdict.live);
    }

    #[test]
    fn test_static_photo_never_live() {
        let mut r = ContinuousRecognizer::new(&EngineConfig::default());
        let known = known();
        let photo = frame(0.0, OPEN, &[1.0, 0.0, 0.0]);
        for i in 0..60 {
            let verdict = r.evaluate_frame(Some(&photo), &known, ms(i * 33)).unwrap();
            assert_eq!(verdict.label(), "alice");
            assert!(!verdict.live);
        }
    }

    #[test]
    fn test_reset_forgets_liveness() {
        let mut r = ContinuousRecognizer::new(&EngineConfig::default());
        let known = known();
        r.evaluate_frame(Some(&frame(0.0, CLOSED, &[1.0, 0.0, 0.0])), &known, ms(0));
        r.evaluate_frame(Some(&frame(10.0, OPEN, &[1.0, 0.0, 0.0])), &known, ms(33));
        r.reset();
        let verdict = r
            .evaluate_frame(Some(&frame(20.0, OPEN, &[1.0, 0.0, 0.0])), &known, ms(66))
            .unwrap();
        assert!(!verdict.live);
        assert_eq!(verdict.liveness_score, 0.0);
    }
}
