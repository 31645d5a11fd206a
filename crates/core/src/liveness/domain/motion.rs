//! Head-movement signals derived from consecutive face boxes.
//!
//! Two flavours share the same box deltas: a leaky-bucket score for the
//! unbounded recognition loop, and max-shift statistics over a bounded
//! sampling run.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::shared::detection_box::DetectionBox;

/// Parameters of the leaky-bucket motion score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuousMotionConfig {
    /// Center shift (px) between frames that earns a vote.
    pub center_shift_px: f64,
    /// Relative area change between frames that earns a vote.
    pub area_change: f64,
    /// Multiplier applied to the previous score each frame.
    pub decay: f64,
    pub max_score: f64,
    /// Score at or above which motion counts as live.
    pub activation: f64,
    /// How long a blink keeps the recognition loop live.
    pub blink_window_ms: u64,
}

impl Default for ContinuousMotionConfig {
    fn default() -> Self {
        Self {
            center_shift_px: 2.0,
            area_change: 0.02,
            decay: 0.85,
            max_score: 5.0,
            activation: 1.5,
            blink_window_ms: 4000,
        }
    }
}

/// Movement needed over a bounded run for one of the session predicates.
///
/// Deserialized through [`deserialize_loose`] or [`deserialize_strict`], so
/// keys missing from a config block keep that block's preset.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MovementThresholds {
    pub center_shift_px: f64,
    pub area_change: f64,
    /// Minimum time between the first and last observed box.
    pub min_duration_ms: u64,
}

impl MovementThresholds {
    /// Low-friction gate used for login.
    pub fn loose() -> Self {
        Self {
            center_shift_px: 3.0,
            area_change: 0.03,
            min_duration_ms: 0,
        }
    }

    /// Spoof-resistant gate used for enrollment and profile updates.
    pub fn strict() -> Self {
        Self {
            center_shift_px: 8.0,
            area_change: 0.08,
            min_duration_ms: 600,
        }
    }
}

/// Config-file form of [`MovementThresholds`]; every key is optional.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MovementOverrides {
    center_shift_px: Option<f64>,
    area_change: Option<f64>,
    min_duration_ms: Option<u64>,
}

impl MovementOverrides {
    fn apply(self, preset: MovementThresholds) -> MovementThresholds {
        MovementThresholds {
            center_shift_px: self.center_shift_px.unwrap_or(preset.center_shift_px),
            area_change: self.area_change.unwrap_or(preset.area_change),
            min_duration_ms: self.min_duration_ms.unwrap_or(preset.min_duration_ms),
        }
    }
}

pub fn deserialize_loose<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<MovementThresholds, D::Error> {
    Ok(MovementOverrides::deserialize(deserializer)?.apply(MovementThresholds::loose()))
}

pub fn deserialize_strict<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<MovementThresholds, D::Error> {
    Ok(MovementOverrides::deserialize(deserializer)?.apply(MovementThresholds::strict()))
}

/// Leaky-bucket motion score: `clamp(score * decay + votes, 0, max)`.
#[derive(Clone, Debug, Default)]
pub struct MotionScore {
    score: f64,
}

impl MotionScore {
    pub fn value(&self) -> f64 {
        self.score
    }

    /// Scores the step from `previous` to `current` and returns the new score.
    pub fn update(
        &mut self,
        config: &ContinuousMotionConfig,
        previous: &DetectionBox,
        current: &DetectionBox,
    ) -> f64 {
        let mut votes = 0.0;
        if previous.center_distance(current) > config.center_shift_px {
            votes += 1.0;
        }
        if previous.relative_area_change(current) > config.area_change {
            votes += 1.0;
        }
        self.score = (self.score * config.decay + votes).clamp(0.0, config.max_score);
        self.score
    }

    pub fn is_active(&self, config: &ContinuousMotionConfig) -> bool {
        self.score >= config.activation
    }
}

/// Largest frame-to-frame movement seen during a bounded run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MotionWindow {
    first_at: Option<Duration>,
    last_at: Option<Duration>,
    max_center_shift: f64,
    max_area_change: f64,
}

impl MotionWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the box observed at `at`, given the box observed before it.
    pub fn record(&mut self, previous: Option<&DetectionBox>, current: &DetectionBox, at: Duration) {
        if self.first_at.is_none() {
            self.first_at = Some(at);
        }
        self.last_at = Some(at);

        if let Some(prev) = previous {
            self.max_center_shift = self.max_center_shift.max(prev.center_distance(current));
            self.max_area_change = self.max_area_change.max(prev.relative_area_change(current));
        }
    }

    pub fn max_center_shift(&self) -> f64 {
        self.max_center_shift
    }

    pub fn max_area_change(&self) -> f64 {
        self.max_area_change
    }

    pub fn elapsed(&self) -> Duration {
        match (self.first_at, self.last_at) {
            (Some(first), Some(last)) => last.saturating_sub(first),
            _ => Duration::ZERO,
        }
    }

    /// Movement exceeded either threshold and the run lasted long enough.
    pub fn moved(&self, thresholds: &MovementThresholds) -> bool {
        let moved = self.max_center_shift > thresholds.center_shift_px
            || self.max_area_change > thresholds.area_change;
        moved && self.elapsed() >= Duration::from_millis(thresholds.min_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn bx(x: f64, size: f64) -> DetectionBox {
        DetectionBox::new(x, 100.0, size, size)
    }

    // ── MotionScore ─────────────────────────────────────────────────

    #[test]
    fn test_score_static_boxes_never_accumulate() {
        let config = ContinuousMotionConfig::default();
        let mut score = MotionScore::default();
        for _ in 0..50 {
            score.update(&config, &bx(100.0, 80.0), &bx(100.0, 80.0));
        }
        assert_eq!(score.value(), 0.0);
        assert!(!score.is_active(&config));
    }

    #[test]
    fn test_score_two_votes_per_frame() {
        let config = ContinuousMotionConfig::default();
        let mut score = MotionScore::default();
        // 10px shift and 21% area growth
        let s = score.update(&config, &bx(100.0, 100.0), &bx(110.0, 110.0));
        assert_relative_eq!(s, 2.0);
        assert!(score.is_active(&config));
    }

    #[test]
    fn test_score_decays_after_motion_stops() {
        let config = ContinuousMotionConfig::default();
        let mut score = MotionScore::default();
        score.update(&config, &bx(100.0, 100.0), &bx(110.0, 100.0));
        let still = bx(110.0, 100.0);
        let s = score.update(&config, &still, &still);
        assert_relative_eq!(s, 0.85);
        for _ in 0..100 {
            score.update(&config, &still, &still);
        }
        assert!(score.value() < 1e-6);
    }

    #[test]
    fn test_score_clamped_to_max() {
        let config = ContinuousMotionConfig::default();
        let mut score = MotionScore::default();
        let mut x = 0.0;
        let mut size = 100.0;
        for _ in 0..100 {
            let prev = bx(x, size);
            x += 20.0;
            size *= 1.2;
            score.update(&config, &prev, &bx(x, size));
        }
        assert_relative_eq!(score.value(), config.max_score);
    }

    // ── MotionWindow ────────────────────────────────────────────────

    fn window_of(boxes: &[(DetectionBox, u64)]) -> MotionWindow {
        let mut window = MotionWindow::new();
        let mut prev: Option<DetectionBox> = None;
        for (b, ms) in boxes {
            window.record(prev.as_ref(), b, Duration::from_millis(*ms));
            prev = Some(*b);
        }
        window
    }

    #[test]
    fn test_window_tracks_maxima_and_elapsed() {
        let w = window_of(&[(bx(0.0, 100.0), 0), (bx(4.0, 100.0), 100), (bx(5.0, 110.0), 250)]);
        // Last step: centers (54, 150) -> (60, 155)
        assert_relative_eq!(w.max_center_shift(), 61.0_f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(w.max_area_change(), 0.21, epsilon = 1e-9);
        assert_eq!(w.elapsed(), Duration::from_millis(250));
    }

    #[test]
    fn test_strict_false_when_too_short_regardless_of_distance() {
        let w = window_of(&[(bx(0.0, 100.0), 0), (bx(500.0, 300.0), 50)]);
        assert!(!w.moved(&MovementThresholds::strict()));
    }

    #[test]
    fn test_strict_true_for_10px_over_700ms() {
        let w = window_of(&[(bx(0.0, 100.0), 0), (bx(10.0, 100.0), 700)]);
        assert!(w.moved(&MovementThresholds::strict()));
    }

    #[rstest]
    #[case::shift_above(4.0, 100.0, true)]
    #[case::shift_below(2.0, 100.0, false)]
    #[case::area_above(0.0, 102.0, true)]
    #[case::area_below(0.0, 101.0, false)]
    fn test_loose_predicate(#[case] x: f64, #[case] size: f64, #[case] expected: bool) {
        // Loose gate has no duration requirement
        let w = window_of(&[(bx(0.0, 100.0), 0), (bx(x, size), 10)]);
        assert_eq!(w.moved(&MovementThresholds::loose()), expected);
    }

    // ── overrides ───────────────────────────────────────────────────

    #[derive(Deserialize)]
    struct Gates {
        #[serde(deserialize_with = "deserialize_loose")]
        loose: MovementThresholds,
        #[serde(deserialize_with = "deserialize_strict")]
        strict: MovementThresholds,
    }

    #[test]
    fn test_missing_keys_keep_each_preset() {
        let gates: Gates = serde_json::from_str(r#"{"loose": {}, "strict": {"center_shift_px": 12}}"#).unwrap();
        assert_eq!(gates.loose, MovementThresholds::loose());
        assert_eq!(gates.strict.center_shift_px, 12.0);
        assert_eq!(gates.strict.area_change, 0.08);
        assert_eq!(gates.strict.min_duration_ms, 600);
    }

    #[test]
    fn test_unknown_movement_key_rejected() {
        let result: Result<Gates, _> =
            serde_json::from_str(r#"{"loose": {"min_duration": 5}, "strict": {}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_single_box_never_moves() {
        let w = window_of(&[(bx(0.0, 100.0), 0)]);
        assert!(!w.moved(&MovementThresholds::loose()));
        assert_eq!(w.elapsed(), Duration::ZERO);
    }
}
