pub mod continuous_recognizer;
pub mod engine_config;
pub mod session_outcome;
pub mod verification_session;
