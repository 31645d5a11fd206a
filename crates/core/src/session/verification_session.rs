//! Bounded enroll/login flow.
//!
//! `Idle → Sampling → Deciding → Finished`. Sampling pulls detections at a
//! fixed real-time spacing until enough embeddings are collected or the
//! attempt budget runs out; deciding reduces the samples, applies the
//! liveness gate for the mode, then enrolls or compares.

use std::time::Duration;

use crate::detection::domain::frame_source::FrameSource;
use crate::enrollment::domain::sample_set::SampleSet;
use crate::liveness::domain::liveness_evaluator::{LivenessEvaluator, LivenessMode};
use crate::shared::clock::Clock;
use crate::shared::face_profile::FaceProfile;

use super::engine_config::EngineConfig;
use super::session_outcome::{SessionError, SessionMode, SessionOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sampling,
    Deciding,
    Finished,
}

/// Owns the clock and configuration for bounded sessions.
///
/// Sample and liveness state are created fresh inside each [`run`](Self::run)
/// call and dropped with it, so one session object can be reused for
/// successive attempts but never runs two at once.
pub struct VerificationSession {
    config: EngineConfig,
    clock: Box<dyn Clock>,
    state: SessionState,
}

impl VerificationSession {
    pub fn new(config: EngineConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one session to completion.
    ///
    /// `reference` is the stored profile for `Login`/`Update`. A `Login`
    /// without a reference behaves as `Enroll`.
    pub fn run(
        &mut self,
        mode: SessionMode,
        reference: Option<&FaceProfile>,
        source: &mut dyn FrameSource,
    ) -> Result<SessionOutcome, SessionError> {
        let mode = match (mode, reference) {
            (SessionMode::Login, None) => {
                log::info!("No stored profile; login falls back to enrollment");
                SessionMode::Enroll
            }
            (mode, _) => mode,
        };

        let result = self.sample_and_decide(mode, reference, source);
        self.transition(SessionState::Finished);

        match &result {
            Ok(outcome) => log::info!("Session ({mode}) finished: {outcome}"),
            Err(e) => log::warn!("Session ({mode}) aborted: {e}"),
        }
        result
    }

    fn sample_and_decide(
        &mut self,
        mode: SessionMode,
        reference: Option<&FaceProfile>,
        source: &mut dyn FrameSource,
    ) -> Result<SessionOutcome, SessionError> {
        let liveness_mode = match mode {
            SessionMode::Login => LivenessMode::BoundedLoose,
            SessionMode::Enroll | SessionMode::Update => LivenessMode::BoundedStrict,
        };
        let mut liveness = LivenessEvaluator::new(liveness_mode, self.config.liveness);

        self.transition(SessionState::Sampling);
        let samples = self.sample(source, &mut liveness)?;

        self.transition(SessionState::Deciding);
        if samples.is_empty() {
            return Ok(SessionOutcome::FaceNotDetected);
        }
        let embedding = samples.reduce()?;

        if !liveness.is_live(self.clock.now()) {
            return Ok(SessionOutcome::LivenessFailed {
                report: liveness.report(),
            });
        }

        let Some(reference) = reference.filter(|_| mode == SessionMode::Login) else {
            return Ok(SessionOutcome::Enrolled { embedding });
        };

        if reference.embedding.len() != embedding.len() {
            log::warn!(
                "Profile '{}' has {} dimensions, detector produced {}",
                reference.name,
                reference.embedding.len(),
                embedding.len()
            );
            return Ok(SessionOutcome::ProfileVersionMismatch {
                stored_len: reference.embedding.len(),
                detected_len: embedding.len(),
            });
        }

        let distance = embedding
            .normalized()
            .distance_to(&reference.embedding.normalized());
        if distance <= self.config.matching.login {
            Ok(SessionOutcome::Matched { distance })
        } else {
            Ok(SessionOutcome::NoMatch { distance })
        }
    }

    /// The bounded sampling loop. Exhausting the attempt budget is not an
    /// error; it simply ends sampling with whatever was collected.
    fn sample(
        &self,
        source: &mut dyn FrameSource,
        liveness: &mut LivenessEvaluator,
    ) -> Result<SampleSet, SessionError> {
        let policy = self.config.sampling;
        let interval = Duration::from_millis(policy.interval_ms);
        let mut samples = SampleSet::new();
        let mut tries = 0;

        while samples.len() < policy.max_samples && tries < policy.max_tries {
            let detection = source
                .next_detection()
                .map_err(SessionError::FrameSource)?;
            let now = self.clock.now();
            tries += 1;

            match detection {
                Some(d) => {
                    liveness.observe(&d.bbox, d.mesh.as_ref(), now);
                    if let Some(embedding) = d.usable_embedding() {
                        samples.push(embedding);
                    }
                }
                None => log::debug!("attempt {tries}: no face"),
            }

            if samples.len() < policy.max_samples && tries < policy.max_tries {
                self.clock.sleep(interval);
            }
        }

        log::debug!(
            "Sampling done: {} samples in {} attempts",
            samples.len(),
            tries
        );
        Ok(samples)
    }

    fn transition(&mut self, next: SessionState) {
        log::debug!("session state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// One-shot convenience over [`VerificationSession::run`].
pub fn run_session(
    mode: SessionMode,
    reference: Option<&FaceProfile>,
    source: &mut dyn FrameSource,
    config: EngineConfig,
    clock: Box<dyn Clock>,
) -> Result<SessionOutcome, SessionError> {
    VerificationSession::new(config, clock).run(mode, reference, source)
}
