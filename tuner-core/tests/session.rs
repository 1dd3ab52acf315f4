//! Drives a tuning session end to end with a scripted frame source.

use std::collections::VecDeque;
use std::f32::consts::PI;

use tuner_core::{
    AcquisitionError, Classification, DetectionMode, FrameSource, SampleFrame, SessionState,
    TickReport, TunerConfig, TunerOutput, TunerSession,
};

const SAMPLE_RATE: u32 = 44_100;
const FRAME_LEN: usize = 2048;

/// Plays back a queue of frames, repeating the last one once exhausted.
struct ScriptedSource {
    frames: VecDeque<Vec<f32>>,
    current: Vec<f32>,
    frame_len: usize,
}

impl ScriptedSource {
    fn new(frames: Vec<Vec<f32>>) -> Self {
        Self {
            frames: frames.into(),
            current: vec![0.0; FRAME_LEN],
            frame_len: FRAME_LEN,
        }
    }
}

impl FrameSource for ScriptedSource {
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn frame_len(&self) -> usize {
        self.frame_len
    }

    fn acquire_frame(&mut self) -> SampleFrame<'_> {
        if let Some(next) = self.frames.pop_front() {
            self.current = next;
        }
        SampleFrame { samples: &self.current, sample_rate: SAMPLE_RATE }
    }
}

fn sine(freq: f32) -> Vec<f32> {
    (0..FRAME_LEN)
        .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / SAMPLE_RATE as f32).sin())
        .collect()
}

fn silence() -> Vec<f32> {
    vec![0.0; FRAME_LEN]
}

fn reading(report: TickReport) -> tuner_core::Reading {
    match report.output {
        TunerOutput::Reading(reading) => reading,
        TunerOutput::NoSignal => panic!("expected a reading, got no signal"),
    }
}

fn running(frames: Vec<Vec<f32>>) -> TunerSession<ScriptedSource> {
    let mut session = TunerSession::new();
    session.start(|| Ok(ScriptedSource::new(frames))).unwrap();
    session
}

#[test]
fn a440_sine_reads_in_tune_a4() {
    let mut session = running(vec![sine(440.0)]);
    let config = TunerConfig::default();

    let reading = reading(session.tick(&config).unwrap());
    assert!((reading.frequency_hz - 440.0).abs() < 4.4, "got {}", reading.frequency_hz);
    assert_eq!(reading.target_label, "A4");
    assert_eq!(reading.target_hz, 440.0);
    assert!(reading.cents.abs() <= 5.0, "got {} cents", reading.cents);
    assert_eq!(reading.classification, Classification::InTune);
}

#[test]
fn first_reading_is_raw_then_smoothed() {
    let mut session = running(vec![sine(440.0), sine(659.25)]);
    let config = TunerConfig::default();

    let first = reading(session.tick(&config).unwrap()).frequency_hz;
    let second = reading(session.tick(&config).unwrap()).frequency_hz;

    // The raw estimate for the second frame is close to 659.25 Hz.
    let raw_second = 2.0 * second - first;
    assert!((raw_second - 659.25).abs() < 6.6, "raw second estimate {raw_second}");
    assert!(first < second && second < raw_second);
}

#[test]
fn silence_emits_no_signal_and_keeps_smoothing_state() {
    let mut session = running(vec![sine(440.0), silence(), sine(440.0)]);
    let config = TunerConfig::default();

    let first = reading(session.tick(&config).unwrap()).frequency_hz;

    let quiet = session.tick(&config).unwrap();
    assert_eq!(quiet.output, TunerOutput::NoSignal);
    assert_eq!(session.smoothed_frequency(), Some(first));

    // Same frame again: smoothing an identical estimate keeps it unchanged.
    let third = reading(session.tick(&config).unwrap()).frequency_hz;
    assert!((third - first).abs() < 1e-3);
}

#[test]
fn config_changes_apply_on_next_tick() {
    let mut session = running(vec![sine(440.0)]);
    let mut config = TunerConfig::default();

    assert_eq!(reading(session.tick(&config).unwrap()).target_label, "A4");

    config.mode = DetectionMode::FixedStrings;
    config.set_reference_pitch(442.0).unwrap();
    let reading = reading(session.tick(&config).unwrap());
    assert_eq!(reading.target_label, "A4");
    assert!((reading.target_hz - 442.0).abs() < 1e-3);
    assert!(reading.cents < 0.0, "440 Hz is flat of 442 Hz");
}

#[test]
fn state_machine_start_stop() {
    let mut session: TunerSession<ScriptedSource> = TunerSession::new();
    let config = TunerConfig::default();
    assert_eq!(session.state(), SessionState::Stopped);
    assert!(session.tick(&config).is_none());

    session.start(|| Ok(ScriptedSource::new(vec![sine(440.0)]))).unwrap();
    assert_eq!(session.state(), SessionState::Running);
    assert!(session.tick(&config).is_some());
    assert!(session.smoothed_frequency().is_some());

    // Starting again while running keeps the current source.
    session
        .start(|| -> Result<ScriptedSource, AcquisitionError> { panic!("must not reacquire") })
        .unwrap();

    session.stop();
    assert_eq!(session.state(), SessionState::Stopped);
    assert_eq!(session.smoothed_frequency(), None);
    assert!(session.tick(&config).is_none());
}

#[test]
fn acquisition_failure_leaves_session_stopped() {
    let mut session: TunerSession<ScriptedSource> = TunerSession::new();
    let err = session
        .start(|| Err(AcquisitionError::NoInputDevice))
        .unwrap_err();
    assert!(matches!(err, AcquisitionError::NoInputDevice));
    assert!(!err.guidance().is_empty());
    assert_eq!(session.state(), SessionState::Stopped);
}

#[test]
fn short_frames_are_rejected_at_start() {
    let mut session: TunerSession<ScriptedSource> = TunerSession::new();
    let err = session
        .start(|| {
            let mut source = ScriptedSource::new(Vec::new());
            source.frame_len = 256;
            Ok(source)
        })
        .unwrap_err();
    assert!(matches!(err, AcquisitionError::FrameTooShort { len: 256, max_lag: 551 }));
    assert!(err.guidance().contains("sample rate"));
    assert_eq!(session.state(), SessionState::Stopped);
}

#[test]
fn reports_serialize_for_hosts() {
    let mut session = running(vec![sine(440.0)]);
    let report = session.tick(&TunerConfig::default()).unwrap();
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"target_label\":\"A4\""));
    assert!(json.contains("\"InTune\""));

    let back: TickReport = serde_json::from_str(&json).unwrap();
    assert!(matches!(back.output, TunerOutput::Reading(_)));
}
