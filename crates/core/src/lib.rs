//! Face verification and liveness engine.
//!
//! A pure reducer over a stream of per-frame face detections: embeddings
//! are matched against enrolled profiles, blink and head-movement signals
//! gate every decision, and bounded sessions terminate with a
//! [`session::session_outcome::SessionOutcome`].

pub mod detection;
pub mod enrollment;
pub mod liveness;
pub mod matching;
pub mod session;
pub mod shared;
