pub mod blink_detector;
pub mod eye_aspect_ratio;
pub mod liveness_evaluator;
pub mod motion;
