pub mod clock;
pub mod constants;
pub mod detection;
pub mod detection_box;
pub mod face_profile;
pub mod landmark_mesh;
pub mod vector_math;
