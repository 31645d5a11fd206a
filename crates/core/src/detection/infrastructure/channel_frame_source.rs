use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::detection::domain::frame_source::FrameSource;
use crate::shared::detection::Detection;

/// Receives detections produced by a capture/detector thread.
///
/// Each pull waits up to `frame_timeout` for the next frame. A timeout
/// counts as a frame without a face; a disconnected sender is an error.
pub struct ChannelFrameSource {
    receiver: Receiver<Option<Detection>>,
    frame_timeout: Duration,
}

impl ChannelFrameSource {
    pub fn new(receiver: Receiver<Option<Detection>>, frame_timeout: Duration) -> Self {
        Self {
            receiver,
            frame_timeout,
        }
    }
}

impl FrameSource for ChannelFrameSource {
    fn next_detection(&mut self) -> Result<Option<Detection>, Box<dyn std::error::Error>> {
        match self.receiver.recv_timeout(self.frame_timeout) {
            Ok(detection) => Ok(detection),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err("detector channel disconnected".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::detection_box::DetectionBox;

    #[test]
    fn test_receives_sent_detection() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut source = ChannelFrameSource::new(rx, Duration::from_millis(50));
        let d = Detection::new(DetectionBox::new(1.0, 2.0, 3.0, 4.0));
        tx.send(Some(d.clone())).unwrap();
        tx.send(None).unwrap();

        assert_eq!(source.next_detection().unwrap(), Some(d));
        assert_eq!(source.next_detection().unwrap(), None);
    }

    #[test]
    fn test_timeout_is_no_face() {
        let (_tx, rx) = crossbeam_channel::unbounded();
        let mut source = ChannelFrameSource::new(rx, Duration::from_millis(5));
        assert_eq!(source.next_detection().unwrap(), None);
    }

    #[test]
    fn test_disconnected_is_error() {
        let (tx, rx) = crossbeam_channel::unbounded::<Option<Detection>>();
        drop(tx);
        let mut source = ChannelFrameSource::new(rx, Duration::from_millis(5));
        assert!(source.next_detection().is_err());
    }

    #[test]
    fn test_fed_from_capture_thread() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let producer = std::thread::spawn(move || {
            for i in 0..3 {
                let d = Detection::new(DetectionBox::new(i as f64, 0.0, 10.0, 10.0));
                tx.send(Some(d)).unwrap();
            }
        });
        let mut source = ChannelFrameSource::new(rx, Duration::from_secs(1));
        let xs: Vec<f64> = (0..3)
            .map(|_| source.next_detection().unwrap().unwrap().bbox.x)
            .collect();
        producer.join().unwrap();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }
}
