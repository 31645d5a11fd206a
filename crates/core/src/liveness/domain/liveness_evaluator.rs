//! Combines blink and head-movement signals into a liveness decision.
//!
//! One evaluator serves every flow; the [`LivenessMode`] only selects the
//! decision policy:
//!
//! | mode            | live when                                          |
//! |-----------------|----------------------------------------------------|
//! | `Continuous`    | motion score ≥ activation AND blink within window |
//! | `BoundedStrict` | blink seen AND strict movement                     |
//! | `BoundedLoose`  | blink seen OR loose movement                       |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::detection_box::DetectionBox;
use crate::shared::landmark_mesh::LandmarkMesh;

use super::blink_detector::{BlinkDetector, BlinkThresholds};
use super::eye_aspect_ratio::average_ear;
use super::motion::{
    deserialize_loose, deserialize_strict, ContinuousMotionConfig, MotionScore, MotionWindow,
    MovementThresholds,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    pub blink: BlinkThresholds,
    pub continuous: ContinuousMotionConfig,
    #[serde(deserialize_with = "deserialize_loose")]
    pub loose: MovementThresholds,
    #[serde(deserialize_with = "deserialize_strict")]
    pub strict: MovementThresholds,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            blink: BlinkThresholds::default(),
            continuous: ContinuousMotionConfig::default(),
            loose: MovementThresholds::loose(),
            strict: MovementThresholds::strict(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LivenessMode {
    /// Unbounded recognition overlay.
    Continuous,
    /// Enrollment and profile updates.
    BoundedStrict,
    /// Login against an existing profile.
    BoundedLoose,
}

/// Mutable per-session liveness state. Never shared between sessions.
#[derive(Clone, Debug, Default)]
pub struct LivenessState {
    previous_box: Option<DetectionBox>,
    blink: BlinkDetector,
    last_blink_at: Option<Duration>,
    blink_count: usize,
    score: MotionScore,
    window: MotionWindow,
}

impl LivenessState {
    fn new(thresholds: BlinkThresholds) -> Self {
        Self {
            blink: BlinkDetector::new(thresholds),
            ..Self::default()
        }
    }
}

/// What one observed frame contributed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameObservation {
    pub ear: Option<f64>,
    pub blinked: bool,
    pub score: f64,
}

/// Snapshot of the accumulated evidence, for decisions and diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct LivenessReport {
    pub blinks: usize,
    pub max_center_shift: f64,
    pub max_area_change: f64,
    pub elapsed: Duration,
    pub motion_score: f64,
    pub loose_movement: bool,
    pub strict_movement: bool,
}

impl std::fmt::Display for LivenessReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "blinks={} shift={:.1}px area={:.3} over {}ms",
            self.blinks,
            self.max_center_shift,
            self.max_area_change,
            self.elapsed.as_millis()
        )
    }
}

pub struct LivenessEvaluator {
    mode: LivenessMode,
    config: LivenessConfig,
    state: LivenessState,
}

impl LivenessEvaluator {
    pub fn new(mode: LivenessMode, config: LivenessConfig) -> Self {
        Self {
            mode,
            config,
            state: LivenessState::new(config.blink),
        }
    }

    pub fn mode(&self) -> LivenessMode {
        self.mode
    }

    /// Feed the face observed at `at`. Box deltas are taken against the
    /// previously observed face.
    pub fn observe(
        &mut self,
        bbox: &DetectionBox,
        mesh: Option<&LandmarkMesh>,
        at: Duration,
    ) -> FrameObservation {
        let state = &mut self.state;

        if let Some(prev) = state.previous_box.as_ref() {
            state.score.update(&self.config.continuous, prev, bbox);
        }
        state.window.record(state.previous_box.as_ref(), bbox, at);
        state.previous_box = Some(*bbox);

        let ear = mesh.and_then(average_ear);
        let blinked = state.blink.update(ear);
        if blinked {
            state.blink_count += 1;
            state.last_blink_at = Some(at);
        }

        log::debug!(
            "liveness: ear={:?} blinked={} score={:.2}",
            ear,
            blinked,
            state.score.value()
        );

        FrameObservation {
            ear,
            blinked,
            score: state.score.value(),
        }
    }

    /// Decision under this evaluator's mode. `now` only matters for the
    /// continuous blink window.
    pub fn is_live(&self, now: Duration) -> bool {
        match self.mode {
            LivenessMode::Continuous => {
                self.state.score.is_active(&self.config.continuous) && self.has_recent_blink(now)
            }
            LivenessMode::BoundedStrict => {
                self.state.blink_count > 0 && self.state.window.moved(&self.config.strict)
            }
            LivenessMode::BoundedLoose => {
                self.state.blink_count > 0 || self.state.window.moved(&self.config.loose)
            }
        }
    }

    pub fn report(&self) -> LivenessReport {
        let window = &self.state.window;
        LivenessReport {
            blinks: self.state.blink_count,
            max_center_shift: window.max_center_shift(),
            max_area_change: window.max_area_change(),
            elapsed: window.elapsed(),
            motion_score: self.state.score.value(),
            loose_movement: window.moved(&self.config.loose),
            strict_movement: window.moved(&self.config.strict),
        }
    }

    pub fn reset(&mut self) {
        self.state = LivenessState::new(self.config.blink);
    }

    fn has_recent_blink(&self, now: Duration) -> bool {
        let window = Duration::from_millis(self.config.continuous.blink_window_ms);
        self.state
            .last_blink_at
            .is_some_and(|t| now.saturating_sub(t) <= window)
    }
}
