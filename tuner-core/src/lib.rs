// tuner-core/src/lib.rs

//! The core logic for the violin tuner.
//! This crate is responsible for audio capture, pitch detection, and
//! deviation measurement against a musical target. It is completely
//! headless and contains no GUI code.
//!
//! A host drives a [`TunerSession`] by calling [`TunerSession::tick`] once
//! per refresh and presenting the returned [`TickReport`].

pub mod audio;
pub mod config;
pub mod deviation;
pub mod error;
pub mod pitch;
pub mod session;
pub mod smoothing;
pub mod tuning;

pub use audio::{CpalFrameSource, FrameSource, SampleFrame};
pub use config::{DetectionMode, TunerConfig};
pub use deviation::{Classification, Deviation};
pub use error::{AcquisitionError, ConfigError};
pub use session::{Reading, SessionState, TickReport, TunerOutput, TunerSession};
pub use tuning::TuningTarget;
