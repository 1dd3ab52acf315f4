//! # Tuner Configuration
//!
//! The externally mutable configuration surface (reference pitch and detection
//! mode) together with the fixed constants of the measurement design.
//!
//! Only `reference_pitch` and `mode` may be changed by the user. Everything
//! else here is a constant: the noise gate, the smoothing coefficient, the
//! classification thresholds and the playable frequency range that bounds the
//! autocorrelation lag search.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Reference pitch for A4 used when the user has not changed it.
pub const DEFAULT_REFERENCE_PITCH: f32 = 440.0;

/// RMS amplitude below which a frame is treated as silence or ambient noise.
pub const NOISE_GATE_RMS: f32 = 0.015;

/// Weight given to the previous smoothed frequency when a new estimate arrives.
pub const SMOOTHING_ALPHA: f32 = 0.5;

/// `|cents| <= IN_TUNE_CENTS` is classified as in tune.
pub const IN_TUNE_CENTS: f32 = 5.0;

/// `IN_TUNE_CENTS < |cents| <= CLOSE_CENTS` is classified as close.
pub const CLOSE_CENTS: f32 = 15.0;

/// Lowest fundamental the estimator searches for, in Hz.
pub const MIN_FREQUENCY: f32 = 80.0;

/// Highest fundamental the estimator searches for, in Hz.
pub const MAX_FREQUENCY: f32 = 1200.0;

/// How the smoothed frequency is mapped to a tuning target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DetectionMode {
    /// Nearest equal-tempered semitone of the chromatic scale.
    #[default]
    FreeChromatic,
    /// Nearest open string of the violin.
    FixedStrings,
}

impl DetectionMode {
    /// All modes, in the order they are offered to the user.
    pub const ALL: [DetectionMode; 2] = [DetectionMode::FreeChromatic, DetectionMode::FixedStrings];
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionMode::FreeChromatic => write!(f, "Chromatic"),
            DetectionMode::FixedStrings => write!(f, "Violin strings"),
        }
    }
}

/// User-adjustable tuner settings, read fresh on every tick.
///
/// Deserialization applies the same validation as [`TunerConfig::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTunerConfig")]
pub struct TunerConfig {
    /// Frequency of A4 in Hz.
    reference_pitch: f32,
    /// Target resolution strategy.
    pub mode: DetectionMode,
}

/// Wire form of [`TunerConfig`] before validation.
#[derive(Deserialize)]
struct RawTunerConfig {
    reference_pitch: f32,
    mode: DetectionMode,
}

impl TryFrom<RawTunerConfig> for TunerConfig {
    type Error = ConfigError;

    fn try_from(raw: RawTunerConfig) -> Result<Self, Self::Error> {
        TunerConfig::new(raw.reference_pitch, raw.mode)
    }
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            reference_pitch: DEFAULT_REFERENCE_PITCH,
            mode: DetectionMode::default(),
        }
    }
}

impl TunerConfig {
    /// Creates a configuration, validating the reference pitch.
    pub fn new(reference_pitch: f32, mode: DetectionMode) -> Result<Self, ConfigError> {
        let mut config = Self { mode, ..Self::default() };
        config.set_reference_pitch(reference_pitch)?;
        Ok(config)
    }

    /// The configured frequency of A4 in Hz.
    pub fn reference_pitch(&self) -> f32 {
        self.reference_pitch
    }

    /// Changes the reference pitch. Rejects non-finite and non-positive values
    /// and leaves the previous value in place.
    pub fn set_reference_pitch(&mut self, hz: f32) -> Result<(), ConfigError> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(ConfigError::InvalidReferencePitch(hz));
        }
        self.reference_pitch = hz;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_a440_chromatic() {
        let config = TunerConfig::default();
        assert_eq!(config.reference_pitch(), 440.0);
        assert_eq!(config.mode, DetectionMode::FreeChromatic);
    }

    #[test]
    fn rejects_invalid_reference_pitch() {
        let mut config = TunerConfig::default();
        assert!(config.set_reference_pitch(0.0).is_err());
        assert!(config.set_reference_pitch(-440.0).is_err());
        assert!(config.set_reference_pitch(f32::NAN).is_err());
        assert!(config.set_reference_pitch(f32::INFINITY).is_err());
        assert_eq!(config.reference_pitch(), 440.0);

        config.set_reference_pitch(442.0).unwrap();
        assert_eq!(config.reference_pitch(), 442.0);
    }

    #[test]
    fn deserialization_validates_reference_pitch() {
        let config: TunerConfig =
            serde_json::from_str(r#"{"reference_pitch":442.0,"mode":"FixedStrings"}"#).unwrap();
        assert_eq!(config.reference_pitch(), 442.0);
        assert_eq!(config.mode, DetectionMode::FixedStrings);

        for bad in ["-440.0", "0.0"] {
            let json = format!(r#"{{"reference_pitch":{bad},"mode":"FreeChromatic"}}"#);
            let err = serde_json::from_str::<TunerConfig>(&json).unwrap_err();
            assert!(err.to_string().contains("reference pitch"), "{err}");
        }
    }

    #[test]
    fn serialized_config_reads_back() {
        let config = TunerConfig::new(415.0, DetectionMode::FixedStrings).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<TunerConfig>(&json).unwrap(), config);
    }

    #[test]
    fn thresholds_are_nested() {
        assert!(IN_TUNE_CENTS < CLOSE_CENTS);
        assert!(MIN_FREQUENCY < MAX_FREQUENCY);
    }
}
