pub mod matcher;
pub mod profile_gallery;
