//! # Audio Output Module
//!
//! This module plays the wheel's notes and chords through the default output
//! device using CPAL (Cross-Platform Audio Library).
//!
//! ## Features
//! - Lazy start: nothing touches the audio device until the first request
//! - Dedicated audio thread owning the output stream
//! - Play requests delivered to the stream callback over a channel
//! - Error reporting without affecting the wheel

use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::config::WheelConfig;
use crate::controller::AudioEngine;
use crate::synth::{Envelope, PlayRequest, PolySynth};
use crate::theory::PitchClass;
use crate::tuning;

/// Preferred output sample rate.
pub const TARGET_SAMPLE_RATE: u32 = 44_100;

/// Play requests buffered between the UI and the stream callback.
const REQUEST_QUEUE: usize = 64;

/// Running output: the channel into the stream callback and the thread that
/// keeps the stream alive.
#[derive(Debug)]
struct AudioOutput {
    requests: Sender<PlayRequest>,
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

/// [`AudioEngine`] backed by a polyphonic synthesizer on a CPAL stream.
#[derive(Debug)]
pub struct SynthEngine {
    envelope: Envelope,
    gain: f32,
    note_seconds: f32,
    chord_seconds: f32,
    output: Option<AudioOutput>,
}

impl SynthEngine {
    pub fn new(config: &WheelConfig) -> Self {
        Self {
            envelope: config.envelope,
            gain: config.master_gain,
            note_seconds: config.note_seconds,
            chord_seconds: config.chord_seconds,
            output: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.output.is_some()
    }

    fn send(&mut self, request: PlayRequest) {
        let Some(output) = &self.output else {
            log::warn!("[AUDIO] Output not started, dropping {:?}", request);
            return;
        };
        match output.requests.try_send(request) {
            Ok(()) => {}
            Err(TrySendError::Full(request)) => {
                log::warn!("[AUDIO] Request queue full, dropping {:?}", request);
            }
            Err(TrySendError::Disconnected(_)) => {
                log::error!("[AUDIO] Output stream has gone away");
                self.shutdown();
            }
        }
    }

    fn shutdown(&mut self) {
        if let Some(mut output) = self.output.take() {
            let _ = output.shutdown_tx.send(());
            if let Some(handle) = output.thread_handle.take() {
                if handle.join().is_err() {
                    log::error!("[AUDIO] Audio thread panicked");
                }
            }
        }
    }
}

impl AudioEngine for SynthEngine {
    /// Starts the audio thread on first use. Later calls return immediately;
    /// a failed start is retried on the next call.
    fn ensure_ready(&mut self) -> Result<()> {
        if self.output.is_some() {
            return Ok(());
        }

        let (request_tx, request_rx) = crossbeam_channel::bounded(REQUEST_QUEUE);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
        let (envelope, gain) = (self.envelope, self.gain);

        let thread_handle = thread::Builder::new()
            .name("audio-output".into())
            .spawn(move || {
                log::debug!("[AUDIO-THREAD] Starting audio output...");
                let stream = match start_audio_output(request_rx, envelope, gain) {
                    Ok((stream, sample_rate)) => {
                        let _ = ready_tx.send(Ok(sample_rate));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                // Blocks until shutdown is requested or the engine is dropped.
                let _ = shutdown_rx.recv();

                log::debug!("[AUDIO-THREAD] Stopping stream and exiting...");
                if let Err(e) = stream.pause() {
                    log::warn!("[AUDIO-THREAD] Error pausing stream: {}", e);
                }
                drop(stream);
            })
            .context("Cannot spawn audio thread")?;

        let sample_rate = ready_rx
            .recv()
            .context("Audio thread exited before reporting")??;
        log::info!("[AUDIO] Output ready at {} Hz", sample_rate);

        self.output = Some(AudioOutput {
            requests: request_tx,
            shutdown_tx,
            thread_handle: Some(thread_handle),
        });
        Ok(())
    }

    fn play_note(&mut self, pitch_class: PitchClass) {
        let request = PlayRequest::new(&[tuning::note_voicing(pitch_class)], self.note_seconds);
        self.send(request);
    }

    fn play_chord(&mut self, pitch_classes: &[PitchClass]) {
        let request = PlayRequest::new(&tuning::chord_voicing(pitch_classes), self.chord_seconds);
        self.send(request);
    }
}

impl Drop for SynthEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Opens the default output device and starts a stream rendering `requests`.
///
/// # Arguments
/// * `requests` - Play requests, drained at the start of every callback
/// * `envelope` - Envelope applied to every voice
/// * `gain` - Master gain of the mix
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Playing stream handle and its sample rate
/// * `Err(e)` - No device, no f32 format, or stream creation failed
fn start_audio_output(
    requests: Receiver<PlayRequest>,
    envelope: Envelope,
    gain: f32,
) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No output device available"))?;

    log::info!("[AUDIO] Using audio output device: {}", device.name()?);

    let configs = device.supported_output_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 output format found"))?;

    let sample_rate = choose_sample_rate(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
        TARGET_SAMPLE_RATE,
    );
    let config = supported_config.with_sample_rate(cpal::SampleRate(sample_rate));
    let channels = config.channels() as usize;
    let config: cpal::StreamConfig = config.into();

    let mut synth = PolySynth::new(sample_rate, envelope, gain);

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            while let Ok(request) = requests.try_recv() {
                synth.handle(request);
            }
            synth.fill(data, channels);
        },
        |err| log::error!("[AUDIO] An error occurred on the output stream: {}", err),
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate))
}

/// Picks the f32 output configuration whose sample-rate range lies closest
/// to `target_rate`, preferring fewer channels on ties.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let (min, max) = (c.min_sample_rate().0, c.max_sample_rate().0);
            let rate = choose_sample_rate(min, max, target_rate);
            (rate.abs_diff(target_rate), c.channels())
        })
}

/// Clamps `target` into a device's supported range.
fn choose_sample_rate(min: u32, max: u32, target: u32) -> u32 {
    target.clamp(min, max.max(min))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_is_clamped_into_range() {
        assert_eq!(choose_sample_rate(8_000, 192_000, 44_100), 44_100);
        assert_eq!(choose_sample_rate(48_000, 48_000, 44_100), 48_000);
        assert_eq!(choose_sample_rate(8_000, 22_050, 44_100), 22_050);
    }

    #[test]
    fn engine_starts_lazily() {
        let mut engine = SynthEngine::new(&WheelConfig::default());
        assert!(!engine.is_ready());
        // Without a started output, requests are dropped rather than queued.
        engine.play_note(PitchClass::C);
        engine.play_chord(&[PitchClass::C, PitchClass::new(4), PitchClass::new(7)]);
        assert!(!engine.is_ready());
    }
}
