use std::collections::VecDeque;

use crate::detection::domain::frame_source::FrameSource;
use crate::shared::detection::Detection;

/// Replays a fixed script of per-frame detections.
///
/// Once the script runs out every further pull reports "no face", which is
/// how a camera pointed at an empty room behaves.
pub struct ScriptedFrameSource {
    script: VecDeque<Option<Detection>>,
    pulls: usize,
}

impl ScriptedFrameSource {
    pub fn new(script: Vec<Option<Detection>>) -> Self {
        Self {
            script: script.into(),
            pulls: 0,
        }
    }

    /// A source that never sees a face.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Number of times `next_detection` has been called.
    pub fn pulls(&self) -> usize {
        self.pulls
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl FrameSource for ScriptedFrameSource {
    fn next_detection(&mut self) -> Result<Option<Detection>, Box<dyn std::error::Error>> {
        self.pulls += 1;
        Ok(self.script.pop_front().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::detection_box::DetectionBox;

    fn detection(x: f64) -> Detection {
        Detection::new(DetectionBox::new(x, 0.0, 10.0, 10.0))
    }

    #[test]
    fn test_replays_in_order_then_reports_no_face() {
        let mut source = ScriptedFrameSource::new(vec![Some(detection(1.0)), None, Some(detection(2.0))]);

        assert_eq!(source.next_detection().unwrap(), Some(detection(1.0)));
        assert_eq!(source.next_detection().unwrap(), None);
        assert_eq!(source.next_detection().unwrap(), Some(detection(2.0)));
        assert_eq!(source.next_detection().unwrap(), None);
        assert_eq!(source.pulls(), 4);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_empty_source() {
        let mut source = ScriptedFrameSource::empty();
        for _ in 0..3 {
            assert!(source.next_detection().unwrap().is_none());
        }
        assert_eq!(source.pulls(), 3);
    }
}
