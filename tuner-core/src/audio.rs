//! # Audio Capture Module
//!
//! Supplies fixed-length sample frames to the tuner. [`FrameSource`] is the
//! seam the session reads from; [`CpalFrameSource`] implements it on top of
//! CPAL (Cross-Platform Audio Library).
//!
//! ## Features
//! - Automatic input device selection
//! - f32 stream configuration closest to 44.1 kHz, mono preferred
//! - Down-mixing of multi-channel input
//! - Dedicated capture thread, frames delivered over a channel
//! - Frame length sized to the negotiated sample rate
//! - Stalled streams read as silence

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SupportedStreamConfigRange;
use crossbeam_channel::{Receiver, Sender};
use log::{info, warn};

use crate::error::AcquisitionError;
use crate::pitch::lag_bounds;

/// Minimum number of samples per analysis frame (~46 ms at 44.1 kHz).
///
/// Enough for the longest autocorrelation lag (80 Hz) up to 96 kHz; see
/// [`frame_len_for`] for faster devices.
pub const BUFFER_SIZE: usize = 2048;

/// Frame durations without a new frame after which the input counts as stalled.
const STALE_FRAME_LIMIT: u32 = 4;

/// Sample rate requested from the input device.
const TARGET_SAMPLE_RATE: u32 = 44_100;

/// Frames buffered between the capture thread and the reader.
const FRAME_QUEUE_DEPTH: usize = 8;

/// One frame of mono samples, borrowed for the duration of a tick.
#[derive(Debug, Clone, Copy)]
pub struct SampleFrame<'a> {
    /// Samples, roughly in [-1, 1]
    pub samples: &'a [f32],
    /// Sample rate in Hz
    pub sample_rate: u32,
}

/// Anything that can hand the tuner a frame of audio on demand.
pub trait FrameSource {
    /// Sample rate of the frames in Hz.
    fn sample_rate(&self) -> u32;

    /// Number of samples in every frame.
    fn frame_len(&self) -> usize;

    /// Returns the most recent frame. Never blocks.
    fn acquire_frame(&mut self) -> SampleFrame<'_>;
}

/// Frame length used at a given sample rate.
///
/// [`BUFFER_SIZE`], grown to the next power of two when the rate is high
/// enough that the longest lag (plus the interpolation neighbour) would not fit.
pub fn frame_len_for(sample_rate: u32) -> usize {
    let (_, max_lag) = lag_bounds(sample_rate);
    BUFFER_SIZE.max((max_lag + 2).next_power_of_two())
}

/// Collects interleaved device samples into fixed-length mono frames.
#[derive(Debug)]
pub struct FrameAssembler {
    channels: usize,
    frame_len: usize,
    pending: Vec<f32>,
}

impl FrameAssembler {
    pub fn new(channels: u16, frame_len: usize) -> Self {
        Self {
            channels: usize::from(channels.max(1)),
            frame_len,
            pending: Vec::with_capacity(frame_len * 2),
        }
    }

    /// Appends interleaved samples and calls `emit` for every completed frame.
    pub fn push(&mut self, interleaved: &[f32], mut emit: impl FnMut(Vec<f32>)) {
        if self.channels == 1 {
            self.pending.extend_from_slice(interleaved);
        } else {
            let scale = 1.0 / self.channels as f32;
            self.pending.extend(
                interleaved
                    .chunks_exact(self.channels)
                    .map(|frame| frame.iter().sum::<f32>() * scale),
            );
        }

        while self.pending.len() >= self.frame_len {
            let frame: Vec<f32> = self.pending.drain(..self.frame_len).collect();
            emit(frame);
        }
    }
}

/// Holds the newest frame received from the capture thread.
///
/// If no frame arrives for [`STALE_FRAME_LIMIT`] frame durations the held
/// frame is zeroed, so a stalled stream reads as silence instead of repeating
/// the last note.
#[derive(Debug)]
pub struct FrameCache {
    latest: Vec<f32>,
    received_at: Option<Instant>,
    max_age: Duration,
}

impl FrameCache {
    /// Creates a cache holding a silent frame of `frame_len` samples.
    pub fn new(frame_len: usize, sample_rate: u32) -> Self {
        let frame_duration =
            Duration::from_secs_f64(frame_len as f64 / f64::from(sample_rate.max(1)));
        Self {
            latest: vec![0.0; frame_len],
            received_at: None,
            max_age: frame_duration * STALE_FRAME_LIMIT,
        }
    }

    /// Drains `receiver`, keeping only the newest frame, and returns the frame
    /// to analyse at time `now`.
    pub fn refresh(&mut self, receiver: &Receiver<Vec<f32>>, now: Instant) -> &[f32] {
        // Stale queued frames would lag the display.
        if let Some(frame) = receiver.try_iter().last() {
            self.latest = frame;
            self.received_at = Some(now);
        } else if let Some(received_at) = self.received_at {
            let age = now.saturating_duration_since(received_at);
            if age > self.max_age {
                warn!("No audio frame for {:?}; treating input as silent", age);
                self.latest.fill(0.0);
                self.received_at = None;
            }
        }
        &self.latest
    }
}

/// Live microphone input backed by a CPAL stream on its own thread.
///
/// Dropping the source stops the stream and joins the capture thread.
pub struct CpalFrameSource {
    receiver: Receiver<Vec<f32>>,
    cache: FrameCache,
    sample_rate: u32,
    frame_len: usize,
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

impl CpalFrameSource {
    /// Opens the default input device and starts capturing.
    ///
    /// Returns only once the capture thread has either started the stream or
    /// failed, so device and permission problems surface here.
    pub fn open() -> Result<Self, AcquisitionError> {
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Vec<f32>>(FRAME_QUEUE_DEPTH);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<u32, AcquisitionError>>(1);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);

        let thread_handle = thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || {
                let (stream, sample_rate) = match start_audio_capture(frame_tx) {
                    Ok(tuple) => tuple,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(sample_rate));

                // The stream callback does the work; wait for the owner to go away.
                let _ = shutdown_rx.recv();

                if let Err(e) = stream.pause() {
                    warn!("Error pausing input stream: {}", e);
                }
                drop(stream);
                info!("Audio capture stopped");
            })
            .map_err(|_| AcquisitionError::CaptureThread)?;

        match ready_rx.recv() {
            Ok(Ok(sample_rate)) => {
                let frame_len = frame_len_for(sample_rate);
                Ok(Self {
                    receiver: frame_rx,
                    cache: FrameCache::new(frame_len, sample_rate),
                    sample_rate,
                    frame_len,
                    shutdown_tx,
                    thread_handle: Some(thread_handle),
                })
            }
            Ok(Err(e)) => {
                let _ = thread_handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread_handle.join();
                Err(AcquisitionError::CaptureThread)
            }
        }
    }
}

impl FrameSource for CpalFrameSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn frame_len(&self) -> usize {
        self.frame_len
    }

    fn acquire_frame(&mut self) -> SampleFrame<'_> {
        let samples = self.cache.refresh(&self.receiver, Instant::now());
        SampleFrame {
            samples,
            sample_rate: self.sample_rate,
        }
    }
}

impl Drop for CpalFrameSource {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                warn!("Audio capture thread panicked");
            }
        }
    }
}

/// Starts audio capture from the default input device.
///
/// Completed frames are sent on `sender`; frames are dropped when the reader
/// falls behind.
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Playing stream handle and its sample rate
/// * `Err(e)` - No device, no usable format, or the stream could not start
fn start_audio_capture(sender: Sender<Vec<f32>>) -> Result<(cpal::Stream, u32), AcquisitionError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(AcquisitionError::NoInputDevice)?;

    info!("Using audio input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config =
        find_supported_config(configs, TARGET_SAMPLE_RATE).ok_or(AcquisitionError::NoSupportedConfig)?;

    let rate = TARGET_SAMPLE_RATE.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let config = supported_config.with_sample_rate(cpal::SampleRate(rate));
    let channels = config.channels();
    let sample_rate = config.sample_rate().0;
    let config: cpal::StreamConfig = config.into();

    let frame_len = frame_len_for(sample_rate);
    info!(
        "Selected sample rate: {} Hz, {} channel(s), {} samples per frame",
        sample_rate, channels, frame_len
    );

    let err_fn = |err| warn!("An error occurred on the audio stream: {}", err);

    let mut assembler = FrameAssembler::new(channels, frame_len);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            assembler.push(data, |frame| {
                // Ignore a full channel; the reader only wants the newest frame.
                let _ = sender.try_send(frame);
            });
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate))
}

/// Picks the f32 input configuration best suited to the tuner: mono before
/// multi-channel, then the one whose rate range comes closest to `target_rate`.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min = c.min_sample_rate().0;
            let max = c.max_sample_rate().0;
            let distance = if (min..=max).contains(&target_rate) {
                0
            } else {
                min.abs_diff(target_rate).min(max.abs_diff(target_rate))
            };
            (c.channels() != 1, distance)
        })
}
