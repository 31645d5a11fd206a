//! Eye aspect ratio (EAR) from six landmarks per eye.
//!
//! `EAR = (|upper1 - lower1| + |upper2 - lower2|) / (2 * |outer - inner|)`
//!
//! Roughly 0.3 for an open eye, dropping towards 0 as the lids close.

use crate::shared::landmark_mesh::LandmarkMesh;

/// Mesh indices of the six points describing one eye.
///
/// `upper[i]` is paired with `lower[i]` for the vertical measurements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EyeIndices {
    pub outer: usize,
    pub upper: [usize; 2],
    pub inner: usize,
    pub lower: [usize; 2],
}

pub const LEFT_EYE: EyeIndices = EyeIndices {
    outer: 33,
    upper: [160, 158],
    inner: 133,
    lower: [144, 153],
};

pub const RIGHT_EYE: EyeIndices = EyeIndices {
    outer: 263,
    upper: [387, 385],
    inner: 362,
    lower: [373, 380],
};

/// EAR of one eye, or `None` when a landmark is missing or the eye has no
/// horizontal extent.
pub fn eye_aspect_ratio(mesh: &LandmarkMesh, eye: &EyeIndices) -> Option<f64> {
    let v1 = mesh.planar_distance(eye.upper[0], eye.lower[0])?;
    let v2 = mesh.planar_distance(eye.upper[1], eye.lower[1])?;
    let h = mesh.planar_distance(eye.outer, eye.inner)?;
    if h <= 0.0 {
        return None;
    }
    Some((v1 + v2) / (2.0 * h))
}

/// Mean EAR over both eyes. Falls back to the single measurable eye; `None`
/// when neither can be measured.
pub fn average_ear(mesh: &LandmarkMesh) -> Option<f64> {
    match (
        eye_aspect_ratio(mesh, &LEFT_EYE),
        eye_aspect_ratio(mesh, &RIGHT_EYE),
    ) {
        (Some(l), Some(r)) => Some((l + r) / 2.0),
        (Some(one), None) | (None, Some(one)) => Some(one),
        (None, None) => None,
    }
}
