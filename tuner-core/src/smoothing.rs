//! # Frequency Smoothing
//!
//! Exponential smoothing of successive raw pitch estimates. Damps
//! frame-to-frame jitter (octave-edge noise, bow-attack transients) while
//! staying responsive enough for live feedback.

use crate::config::SMOOTHING_ALPHA;

/// Combines the previous smoothed frequency with a new raw estimate.
///
/// With no previous value the raw estimate passes through unchanged.
pub fn smooth(previous: Option<f32>, raw: f32, alpha: f32) -> f32 {
    match previous {
        Some(prev) => prev * alpha + raw * (1.0 - alpha),
        None => raw,
    }
}

/// Smoothing state carried across ticks of a tuning session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencySmoother {
    last: Option<f32>,
    alpha: f32,
}

impl Default for FrequencySmoother {
    fn default() -> Self {
        Self::new(SMOOTHING_ALPHA)
    }
}

impl FrequencySmoother {
    /// Creates an empty smoother that weights the previous value by `alpha`.
    pub fn new(alpha: f32) -> Self {
        Self { last: None, alpha }
    }

    /// Feeds a raw estimate and returns the new smoothed frequency.
    pub fn update(&mut self, raw: f32) -> f32 {
        let next = smooth(self.last, raw, self.alpha);
        self.last = Some(next);
        next
    }

    /// The last smoothed frequency, if any estimate has been accepted.
    pub fn current(&self) -> Option<f32> {
        self.last
    }

    /// Forgets the smoothed frequency. Called when a session starts or stops.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_estimate_passes_through() {
        let mut smoother = FrequencySmoother::default();
        assert_eq!(smoother.current(), None);
        assert_eq!(smoother.update(441.3), 441.3);
        assert_eq!(smoother.current(), Some(441.3));
    }

    #[test]
    fn second_estimate_is_averaged() {
        let mut smoother = FrequencySmoother::default();
        smoother.update(440.0);
        assert_eq!(smoother.update(450.0), 440.0 * 0.5 + 450.0 * 0.5);
    }

    #[test]
    fn alpha_weights_the_previous_value() {
        assert_eq!(smooth(Some(100.0), 200.0, 0.75), 125.0);
        assert_eq!(smooth(None, 200.0, 0.75), 200.0);
    }

    #[test]
    fn new_smoother_uses_given_alpha() {
        let mut smoother = FrequencySmoother::new(0.75);
        assert_eq!(smoother.current(), None);
        assert_eq!(smoother.update(100.0), 100.0);
        assert_eq!(smoother.update(200.0), 125.0);
    }

    #[test]
    fn reset_clears_state() {
        let mut smoother = FrequencySmoother::default();
        smoother.update(300.0);
        smoother.reset();
        assert_eq!(smoother.current(), None);
        assert_eq!(smoother.update(200.0), 200.0);
    }
}
