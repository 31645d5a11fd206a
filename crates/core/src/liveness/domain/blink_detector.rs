use serde::{Deserialize, Serialize};

pub const DEFAULT_CLOSED_EAR: f64 = 0.18;
pub const DEFAULT_OPEN_EAR: f64 = 0.25;

/// Hysteresis band for the open/closed eye decision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkThresholds {
    /// EAR below this marks the eye as closed.
    pub closed: f64,
    /// EAR above this reopens a closed eye and counts a blink.
    pub open: f64,
}

impl Default for BlinkThresholds {
    fn default() -> Self {
        Self {
            closed: DEFAULT_CLOSED_EAR,
            open: DEFAULT_OPEN_EAR,
        }
    }
}

/// Edge detector emitting one event per closed→open transition.
#[derive(Clone, Debug, Default)]
pub struct BlinkDetector {
    thresholds: BlinkThresholds,
    eye_closed: bool,
}

impl BlinkDetector {
    pub fn new(thresholds: BlinkThresholds) -> Self {
        Self {
            thresholds,
            eye_closed: false,
        }
    }

    pub fn is_eye_closed(&self) -> bool {
        self.eye_closed
    }

    /// Feed one frame's EAR. Returns `true` when this frame completes a blink.
    /// Frames without a measurable EAR leave the state untouched.
    pub fn update(&mut self, ear: Option<f64>) -> bool {
        let Some(ear) = ear else {
            return false;
        };

        if ear < self.thresholds.closed {
            self.eye_closed = true;
            false
        } else if self.eye_closed && ear > self.thresholds.open {
            self.eye_closed = false;
            true
        } else {
            false
        }
    }
}
