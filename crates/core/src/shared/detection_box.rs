use serde::{Deserialize, Serialize};

/// Face bounding box in video-pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DetectionBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Euclidean distance between the two box centers.
    pub fn center_distance(&self, other: &DetectionBox) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt()
    }

    /// `|area(next) - area(self)| / area(self)`; 0.0 when `self` has no area.
    pub fn relative_area_change(&self, next: &DetectionBox) -> f64 {
        let base = self.area();
        if base <= 0.0 {
            return 0.0;
        }
        (next.area() - base).abs() / base
    }
}
