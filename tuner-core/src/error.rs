//! # Error Types
//!
//! Errors the tuner kernel can surface to its caller. A frame with no
//! detectable pitch is not an error and never appears here; it is reported as
//! a `NoSignal` tick.

use thiserror::Error;

/// Failure to obtain a working frame source when starting a session.
///
/// Fatal to starting the session: the kernel does not retry, and the session
/// stays stopped.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The host has no default input device.
    #[error("no audio input device available")]
    NoInputDevice,

    /// The device offers no 32-bit float input configuration.
    #[error("no suitable f32 input format found")]
    NoSupportedConfig,

    /// Enumerating input devices failed.
    #[error(transparent)]
    Devices(#[from] cpal::DevicesError),

    /// The device name could not be queried.
    #[error(transparent)]
    DeviceName(#[from] cpal::DeviceNameError),

    /// The device refused to list its input configurations.
    #[error(transparent)]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    /// The input stream could not be built (often a permission problem).
    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),

    /// The input stream could not be started.
    #[error(transparent)]
    PlayStream(#[from] cpal::PlayStreamError),

    /// The capture thread exited before reporting whether capture started.
    #[error("audio capture thread stopped unexpectedly")]
    CaptureThread,

    /// Frames are too short to cover the autocorrelation lag range.
    #[error("frame length {len} cannot cover a maximum lag of {max_lag} samples")]
    FrameTooShort { len: usize, max_lag: usize },
}

impl AcquisitionError {
    /// A one-time actionable message for the user.
    pub fn guidance(&self) -> &'static str {
        match self {
            AcquisitionError::NoInputDevice | AcquisitionError::Devices(_) => {
                "Connect a microphone and make sure it is enabled as the default input."
            }
            AcquisitionError::BuildStream(_) | AcquisitionError::PlayStream(_) => {
                "Could not open the microphone. Check that this application has permission to use it."
            }
            AcquisitionError::NoSupportedConfig | AcquisitionError::SupportedConfigs(_) => {
                "The microphone does not support 32-bit float capture. Try another input device."
            }
            AcquisitionError::DeviceName(_) | AcquisitionError::CaptureThread => {
                "The audio system stopped responding. Try starting the tuner again."
            }
            AcquisitionError::FrameTooShort { .. } => {
                "The audio input frames are too short for pitch detection at this sample rate. Select a lower sample rate (44.1 or 48 kHz) for the input device."
            }
        }
    }
}

/// Rejected configuration changes.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("reference pitch must be a finite positive frequency, got {0} Hz")]
    InvalidReferencePitch(f32),
}
