//! Replays recorded detector output.
//!
//! One JSON value per line: a detection object, or `null` for a frame in
//! which no face was found. Blank lines are treated like `null`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::detection::domain::frame_source::FrameSource;
use crate::shared::detection::Detection;

pub struct JsonlFrameSource {
    lines: Box<dyn Iterator<Item = std::io::Result<String>> + Send>,
    line_number: usize,
    exhausted: bool,
}

impl JsonlFrameSource {
    pub fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::open(path)
            .map_err(|e| format!("cannot open detections file {}: {e}", path.display()))?;
        Ok(Self::from_reader(BufReader::new(file)))
    }

    pub fn from_reader(reader: impl BufRead + Send + 'static) -> Self {
        Self {
            lines: Box::new(reader.lines()),
            line_number: 0,
            exhausted: false,
        }
    }

    /// True once the underlying stream has been read to the end.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl FrameSource for JsonlFrameSource {
    fn next_detection(&mut self) -> Result<Option<Detection>, Box<dyn std::error::Error>> {
        let Some(line) = self.lines.next() else {
            self.exhausted = true;
            return Ok(None);
        };
        self.line_number += 1;

        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let detection: Option<Detection> = serde_json::from_str(trimmed)
            .map_err(|e| format!("line {}: invalid detection record: {e}", self.line_number))?;
        Ok(detection)
    }
}
