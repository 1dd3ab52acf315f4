//! # Musical Tuning Module
//!
//! Maps a frequency to the musical target it should be tuned to. Two
//! strategies are supported, selected by [`DetectionMode`]:
//!
//! - **Chromatic**: the nearest equal-tempered semitone relative to the
//!   configured A4.
//! - **Violin strings**: the nearest open string (G3, D4, A4, E5), scaled to
//!   the configured A4.
//!
//! Both are pure functions of the frequency, mode and reference pitch.

use serde::Serialize;

use crate::config::{DetectionMode, TunerConfig};

/// Chromatic pitch-class names, indexed by `note_number mod 12`.
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// MIDI note number of A4.
const A4_NOTE_NUMBER: i32 = 69;

/// Reference pitch the string table is written for.
const STANDARD_PITCH: f32 = 440.0;

/// An open string of the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OpenString {
    /// String name (e.g., "G3")
    pub name: &'static str,
    /// Frequency in Hz at A4 = 440 Hz
    pub frequency: f32,
}

/// Open strings of a violin in standard tuning, lowest first.
pub static VIOLIN_STRINGS: [OpenString; 4] = [
    OpenString { name: "G3", frequency: 196.00 },
    OpenString { name: "D4", frequency: 293.66 },
    OpenString { name: "A4", frequency: 440.00 },
    OpenString { name: "E5", frequency: 659.25 },
];

/// The note or string a frequency is being tuned towards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TuningTarget {
    /// Nearest chromatic semitone.
    Note {
        /// MIDI note number (A4 = 69)
        number: i32,
        /// Note name with octave (e.g., "A4", "C#3")
        name: String,
        /// Target frequency in Hz
        frequency: f32,
    },
    /// Nearest open string.
    OpenString {
        /// String name
        name: &'static str,
        /// Target frequency in Hz, scaled to the configured reference pitch
        frequency: f32,
    },
}

impl TuningTarget {
    /// Human-readable label of the target.
    pub fn label(&self) -> &str {
        match self {
            TuningTarget::Note { name, .. } => name.as_str(),
            TuningTarget::OpenString { name, .. } => name,
        }
    }

    /// Target frequency in Hz.
    pub fn frequency(&self) -> f32 {
        match self {
            TuningTarget::Note { frequency, .. } | TuningTarget::OpenString { frequency, .. } => {
                *frequency
            }
        }
    }
}

/// Converts a frequency to a continuous MIDI note number.
pub fn hz_to_note_number(freq: f32, reference_pitch: f32) -> f32 {
    A4_NOTE_NUMBER as f32 + 12.0 * (freq / reference_pitch).log2()
}

/// Equal-tempered frequency of a MIDI note number.
pub fn note_number_to_hz(note_number: i32, reference_pitch: f32) -> f32 {
    reference_pitch * 2.0_f32.powf((note_number - A4_NOTE_NUMBER) as f32 / 12.0)
}

/// Name and octave of a MIDI note number (60 is "C4", 69 is "A4").
pub fn note_name(note_number: i32) -> String {
    let pitch_class = note_number.rem_euclid(12) as usize;
    let octave = note_number.div_euclid(12) - 1;
    format!("{}{}", NOTE_NAMES[pitch_class], octave)
}

/// Name of the chromatic note nearest to a frequency, regardless of mode.
pub fn nearest_note_name(freq: f32, reference_pitch: f32) -> String {
    note_name(hz_to_note_number(freq, reference_pitch).round() as i32)
}

/// Finds the open string closest in Hz to `freq`.
///
/// Ties go to the string listed first.
pub fn nearest_string(freq: f32, strings: &'static [OpenString]) -> Option<&'static OpenString> {
    strings.iter().fold(None, |best: Option<&'static OpenString>, string| match best {
        Some(b) if (freq - b.frequency).abs() <= (freq - string.frequency).abs() => Some(b),
        _ => Some(string),
    })
}

/// Resolves the tuning target for a frequency under the given configuration.
pub fn resolve_target(freq: f32, config: &TunerConfig) -> TuningTarget {
    let reference = config.reference_pitch();
    match config.mode {
        DetectionMode::FreeChromatic => {
            let number = hz_to_note_number(freq, reference).round() as i32;
            TuningTarget::Note {
                number,
                name: note_name(number),
                frequency: note_number_to_hz(number, reference),
            }
        }
        DetectionMode::FixedStrings => {
            // The table is never empty, so a string is always found.
            let string = nearest_string(freq, &VIOLIN_STRINGS).unwrap_or(&VIOLIN_STRINGS[0]);
            TuningTarget::OpenString {
                name: string.name,
                frequency: string.frequency * (reference / STANDARD_PITCH),
            }
        }
    }
}
