//! # Pitch Detection Module
//!
//! Estimates the fundamental frequency of a monophonic frame using plain
//! time-domain autocorrelation, refined to sub-sample precision by parabolic
//! interpolation.
//!
//! ## Features
//! - RMS noise gate that rejects silence and ambient noise
//! - Lag search restricted to the playable range (80 Hz to 1200 Hz)
//! - Parabolic interpolation for sub-sample accuracy
//! - Peak level measurement for input meters

use log::trace;

use crate::config::{MAX_FREQUENCY, MIN_FREQUENCY};

/// Root-mean-square amplitude of a signal. Zero for an empty slice.
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|&s| s * s).sum::<f32>() / signal.len() as f32).sqrt()
}

/// Largest absolute sample value of a signal.
pub fn peak_level(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0_f32, |peak, &s| peak.max(s.abs()))
}

/// Unnormalized autocorrelation of `signal` at `lag`:
/// the sum of `signal[i] * signal[i + lag]` over every valid `i`.
pub fn autocorrelation(signal: &[f32], lag: usize) -> f32 {
    if lag >= signal.len() {
        return 0.0;
    }
    signal
        .iter()
        .zip(&signal[lag..])
        .map(|(&a, &b)| a * b)
        .sum()
}

/// Lag search bounds `(min_lag, max_lag)` in samples for the playable range.
///
/// The lower bound never drops below 1 so that interpolation always has a
/// left neighbour.
pub fn lag_bounds(sample_rate: u32) -> (usize, usize) {
    let min_lag = (sample_rate as f32 / MAX_FREQUENCY).floor() as usize;
    let max_lag = (sample_rate as f32 / MIN_FREQUENCY).floor() as usize;
    (min_lag.max(1), max_lag)
}

/// Detects the fundamental frequency of a frame by autocorrelation.
///
/// # Arguments
/// * `signal` - Input audio frame, long enough to cover the maximum lag
/// * `sample_rate` - Sample rate in Hz
/// * `gate_rms` - Minimum RMS amplitude for pitch detection
///
/// # Returns
/// * `Some(frequency)` - Detected frequency in Hz, always finite and positive
/// * `None` - No pitch detected (silence, noise, or no positive correlation)
pub fn detect_pitch_acf(signal: &[f32], sample_rate: u32, gate_rms: f32) -> Option<f32> {
    // --- Noise gate ---
    let level = rms(signal);
    if level < gate_rms {
        trace!("gate closed: rms {:.4} < {:.4}", level, gate_rms);
        return None;
    }

    // --- Lag search over the playable range ---
    let (min_lag, max_lag) = lag_bounds(sample_rate);
    let mut best: Option<(usize, f32)> = None;
    for lag in min_lag..=max_lag {
        let corr = autocorrelation(signal, lag);
        let best_corr = best.map_or(0.0, |(_, c)| c);
        if corr > best_corr {
            best = Some((lag, corr));
        }
    }

    // Only a strictly positive peak counts.
    let (best_lag, _) = best?;

    // --- Parabolic interpolation around the peak ---
    let y1 = autocorrelation(signal, best_lag - 1);
    let y2 = autocorrelation(signal, best_lag);
    let y3 = autocorrelation(signal, best_lag + 1);
    let denom = y1 - 2.0 * y2 + y3;
    let shift = if denom != 0.0 { 0.5 * (y1 - y3) / denom } else { 0.0 };
    let refined_lag = best_lag as f32 + shift;

    let frequency = sample_rate as f32 / refined_lag;
    trace!(
        "best lag {} (shift {:+.3}) -> {:.2} Hz",
        best_lag, shift, frequency
    );

    if frequency.is_finite() && frequency > 0.0 {
        Some(frequency)
    } else {
        None
    }
}
