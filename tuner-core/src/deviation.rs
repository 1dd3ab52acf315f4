//! # Deviation Evaluation
//!
//! Signed distance in cents between a frequency and its tuning target, and
//! the three-way classification shown to the player.

use serde::{Deserialize, Serialize};

use crate::config::{CLOSE_CENTS, IN_TUNE_CENTS};

/// How far a pitch is from its target, by absolute cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// `|cents| <= 5`
    InTune,
    /// `5 < |cents| <= 15`
    Close,
    /// `|cents| > 15`
    Off,
}

impl Classification {
    pub fn from_cents(cents: f32) -> Self {
        let magnitude = cents.abs();
        if magnitude <= IN_TUNE_CENTS {
            Classification::InTune
        } else if magnitude <= CLOSE_CENTS {
            Classification::Close
        } else {
            Classification::Off
        }
    }
}

/// Signed cents offset together with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    /// Positive is sharp, negative is flat.
    pub cents: f32,
    pub classification: Classification,
}

/// Calculates the deviation from a target frequency in cents.
///
/// - 100 cents = 1 semitone
/// - Positive values indicate sharpness, negative values indicate flatness
pub fn cents_deviation(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}

/// Evaluates a frequency against its target.
pub fn evaluate(freq: f32, target_freq: f32) -> Deviation {
    let cents = cents_deviation(freq, target_freq);
    Deviation {
        cents,
        classification: Classification::from_cents(cents),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_frequencies_are_zero_cents() {
        for &hz in &[82.41, 196.0, 440.0, 1174.66] {
            assert_eq!(cents_deviation(hz, hz), 0.0);
        }
    }

    #[test]
    fn octave_and_semitone() {
        assert!((cents_deviation(880.0, 440.0) - 1200.0).abs() < 1e-3);
        assert!((cents_deviation(220.0, 440.0) + 1200.0).abs() < 1e-3);
        let semitone_up = 440.0 * 2.0_f32.powf(1.0 / 12.0);
        assert!((cents_deviation(semitone_up, 440.0) - 100.0).abs() < 1e-2);
    }

    #[test]
    fn cents_increase_with_frequency() {
        let mut previous = f32::NEG_INFINITY;
        for step in 0..200 {
            let hz = 400.0 + step as f32 * 0.5;
            let cents = cents_deviation(hz, 440.0);
            assert!(cents > previous, "{hz} Hz gave {cents} after {previous}");
            previous = cents;
        }
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(Classification::from_cents(0.0), Classification::InTune);
        assert_eq!(Classification::from_cents(5.0), Classification::InTune);
        assert_eq!(Classification::from_cents(-5.0), Classification::InTune);
        assert_eq!(Classification::from_cents(5.0001), Classification::Close);
        assert_eq!(Classification::from_cents(-5.0001), Classification::Close);
        assert_eq!(Classification::from_cents(15.0), Classification::Close);
        assert_eq!(Classification::from_cents(15.0001), Classification::Off);
        assert_eq!(Classification::from_cents(-48.0), Classification::Off);
    }

    #[test]
    fn evaluate_reports_sign() {
        let sharp = evaluate(445.0, 440.0);
        assert!(sharp.cents > 0.0);
        assert_eq!(sharp.classification, Classification::Off);

        let flat = evaluate(438.0, 440.0);
        assert!(flat.cents < 0.0);
        assert_eq!(flat.classification, Classification::Close);
    }
}
