use serde::{Deserialize, Serialize};

/// Dense facial landmark mesh for one frame, index-addressable.
///
/// Index layout follows the 468-point face mesh convention; the eye
/// indices used for blink detection live in `liveness::domain::eye_aspect_ratio`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkMesh {
    points: Vec<[f64; 3]>,
}

impl LandmarkMesh {
    pub fn new(points: Vec<[f64; 3]>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at `index`, or `None` when the mesh is too short or the point
    /// holds non-finite coordinates.
    pub fn point(&self, index: usize) -> Option<[f64; 3]> {
        self.points
            .get(index)
            .copied()
            .filter(|p| p.iter().all(|c| c.is_finite()))
    }

    /// Planar (x, y) distance between two indexed points.
    pub fn planar_distance(&self, a: usize, b: usize) -> Option<f64> {
        let pa = self.point(a)?;
        let pb = self.point(b)?;
        Some(((pb[0] - pa[0]).powi(2) + (pb[1] - pa[1]).powi(2)).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_out_of_range_is_none() {
        let mesh = LandmarkMesh::new(vec![[1.0, 2.0, 3.0]]);
        assert_eq!(mesh.point(0), Some([1.0, 2.0, 3.0]));
        assert_eq!(mesh.point(1), None);
    }

    #[test]
    fn test_non_finite_point_is_missing() {
        let mesh = LandmarkMesh::new(vec![[f64::NAN, 0.0, 0.0]]);
        assert_eq!(mesh.point(0), None);
    }

    #[test]
    fn test_planar_distance_ignores_depth() {
        let mesh = LandmarkMesh::new(vec![[0.0, 0.0, 0.0], [3.0, 4.0, 100.0]]);
        assert_relative_eq!(mesh.planar_distance(0, 1).unwrap(), 5.0);
        assert_eq!(mesh.planar_distance(0, 2), None);
    }

    #[test]
    fn test_deserializes_from_point_list() {
        let mesh: LandmarkMesh = serde_json::from_str("[[1,2,3],[4,5,6]]").unwrap();
        assert_eq!(mesh.len(), 2);
        assert_eq!(mesh.point(1), Some([4.0, 5.0, 6.0]));
    }
}
