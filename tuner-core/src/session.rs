//! # Tuning Session
//!
//! The loop orchestrator. A [`TunerSession`] owns the frame source and the
//! smoothing state of one tuning session, and runs the
//! estimate → smooth → resolve → evaluate pipeline once per call to
//! [`TunerSession::tick`]. Scheduling is left to the host (a GUI timer, a
//! test loop): the session never spawns, sleeps or blocks.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::audio::{FrameSource, SampleFrame};
use crate::config::{NOISE_GATE_RMS, TunerConfig};
use crate::deviation::{self, Classification};
use crate::error::AcquisitionError;
use crate::pitch;
use crate::smoothing::FrequencySmoother;
use crate::tuning;

/// Lifecycle of a tuning session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Stopped,
    Running,
}

/// A pitched tick, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Smoothed frequency in Hz.
    pub frequency_hz: f32,
    /// Label of the note or string being tuned to.
    pub target_label: String,
    /// Target frequency in Hz.
    pub target_hz: f32,
    /// Signed offset from the target; positive is sharp.
    pub cents: f32,
    pub classification: Classification,
    /// Nearest chromatic note, whatever the detection mode.
    pub nearest_note: String,
}

/// What one tick produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TunerOutput {
    /// Gate closed or no pitch found. Show a neutral state.
    NoSignal,
    Reading(Reading),
}

/// Everything the presentation layer needs from one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Input level in [0, 1] for a level meter.
    pub level: f32,
    pub output: TunerOutput,
}

/// Maps a frame's peak amplitude to a meter level; full scale at half amplitude.
fn input_level(samples: &[f32]) -> f32 {
    (pitch::peak_level(samples) * 2.0).min(1.0)
}

/// Runs the measurement pipeline on one frame.
///
/// The smoother only advances when the frame yields a pitch.
pub fn process_frame(
    frame: SampleFrame<'_>,
    smoother: &mut FrequencySmoother,
    config: &TunerConfig,
) -> TickReport {
    let level = input_level(frame.samples);

    let Some(raw) = pitch::detect_pitch_acf(frame.samples, frame.sample_rate, NOISE_GATE_RMS) else {
        return TickReport { level, output: TunerOutput::NoSignal };
    };

    let frequency_hz = smoother.update(raw);
    let target = tuning::resolve_target(frequency_hz, config);
    let deviation = deviation::evaluate(frequency_hz, target.frequency());
    debug!(
        "raw {:.2} Hz, smoothed {:.2} Hz -> {} ({:+.1} cents)",
        raw,
        frequency_hz,
        target.label(),
        deviation.cents
    );

    TickReport {
        level,
        output: TunerOutput::Reading(Reading {
            frequency_hz,
            target_label: target.label().to_string(),
            target_hz: target.frequency(),
            cents: deviation.cents,
            classification: deviation.classification,
            nearest_note: tuning::nearest_note_name(frequency_hz, config.reference_pitch()),
        }),
    }
}

/// A tuning session over some frame source.
///
/// Starts `Stopped`. Holding a source means `Running`; stopping drops the
/// source and clears the smoothing state.
pub struct TunerSession<S: FrameSource> {
    source: Option<S>,
    smoother: FrequencySmoother,
}

impl<S: FrameSource> Default for TunerSession<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FrameSource> TunerSession<S> {
    pub fn new() -> Self {
        Self {
            source: None,
            smoother: FrequencySmoother::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.source.is_some() {
            SessionState::Running
        } else {
            SessionState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// The last smoothed frequency of this session, if any.
    pub fn smoothed_frequency(&self) -> Option<f32> {
        self.smoother.current()
    }

    /// Starts the session with a source produced by `acquire`.
    ///
    /// Does nothing if already running. On failure the session stays stopped
    /// and the error is returned unchanged; there is no retry.
    pub fn start<F>(&mut self, acquire: F) -> Result<(), AcquisitionError>
    where
        F: FnOnce() -> Result<S, AcquisitionError>,
    {
        if self.is_running() {
            return Ok(());
        }

        let source = acquire()?;
        let (_, max_lag) = pitch::lag_bounds(source.sample_rate());
        // Interpolation reads one lag past the maximum.
        if source.frame_len() <= max_lag + 1 {
            return Err(AcquisitionError::FrameTooShort {
                len: source.frame_len(),
                max_lag,
            });
        }

        info!(
            "Tuning session started at {} Hz, {} samples per frame",
            source.sample_rate(),
            source.frame_len()
        );
        self.smoother.reset();
        self.source = Some(source);
        Ok(())
    }

    /// Stops the session, releasing the source and clearing smoothing state.
    pub fn stop(&mut self) {
        if self.source.take().is_some() {
            info!("Tuning session stopped");
        }
        self.smoother.reset();
    }

    /// Runs one tick. Returns `None` once the session is stopped, which tells
    /// the scheduler not to call again.
    pub fn tick(&mut self, config: &TunerConfig) -> Option<TickReport> {
        let source = self.source.as_mut()?;
        let frame = source.acquire_frame();
        Some(process_frame(frame, &mut self.smoother, config))
    }
}
