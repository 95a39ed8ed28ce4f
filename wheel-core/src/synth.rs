//! # Synthesizer Module
//!
//! A small polyphonic triangle-wave synthesizer rendering the notes and
//! chords requested by the wheel. It is plain sample math with no device
//! handling, so the audio callback only has to pull samples from it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Voices kept alive at once; the oldest is dropped beyond this.
pub const MAX_VOICES: usize = 32;

/// Attack/decay/sustain/release envelope, times in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub attack: f32,
    pub decay: f32,
    /// Level held after the decay, 0.0 to 1.0.
    pub sustain: f32,
    pub release: f32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack: 0.005,
            decay: 0.1,
            sustain: 0.3,
            release: 1.0,
        }
    }
}

impl Envelope {
    /// Amplitude `t` seconds after note-on, for a note released after `hold`
    /// seconds.
    pub fn amplitude(&self, t: f32, hold: f32) -> f32 {
        if t < hold {
            return self.held_level(t);
        }
        let since_release = t - hold;
        if self.release <= 0.0 || since_release >= self.release {
            return 0.0;
        }
        self.held_level(hold) * (1.0 - since_release / self.release)
    }

    fn held_level(&self, t: f32) -> f32 {
        if self.attack > 0.0 && t < self.attack {
            t / self.attack
        } else if self.decay > 0.0 && t < self.attack + self.decay {
            let progress = (t - self.attack) / self.decay;
            1.0 - (1.0 - self.sustain) * progress
        } else {
            self.sustain
        }
    }
}

/// Most notes one request can carry: a triad.
pub const MAX_REQUEST_NOTES: usize = 3;

/// Notes to start together, sent from the UI thread to the audio callback.
///
/// Fixed size so the callback never frees heap memory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayRequest {
    frequencies: [f32; MAX_REQUEST_NOTES],
    len: usize,
    /// Seconds before every voice of the request is released.
    pub hold_seconds: f32,
}

impl PlayRequest {
    /// Notes past [`MAX_REQUEST_NOTES`] are dropped.
    pub fn new(frequencies: &[f32], hold_seconds: f32) -> Self {
        if frequencies.len() > MAX_REQUEST_NOTES {
            log::warn!(
                "[SYNTH] Dropping {} notes past the first {}",
                frequencies.len() - MAX_REQUEST_NOTES,
                MAX_REQUEST_NOTES
            );
        }
        let len = frequencies.len().min(MAX_REQUEST_NOTES);
        let mut fixed = [0.0; MAX_REQUEST_NOTES];
        fixed[..len].copy_from_slice(&frequencies[..len]);
        Self {
            frequencies: fixed,
            len,
            hold_seconds,
        }
    }

    pub fn frequencies(&self) -> &[f32] {
        &self.frequencies[..self.len]
    }
}

#[derive(Debug, Clone)]
struct Voice {
    frequency: f32,
    phase: f32,
    elapsed_samples: u64,
    hold_seconds: f32,
}

impl Voice {
    fn next_sample(&mut self, sample_rate: f32, envelope: &Envelope) -> f32 {
        let t = self.elapsed_samples as f32 / sample_rate;
        let triangle = 1.0 - 4.0 * (self.phase - 0.5).abs();

        self.phase = (self.phase + self.frequency / sample_rate).fract();
        self.elapsed_samples += 1;

        triangle * envelope.amplitude(t, self.hold_seconds)
    }

    fn is_finished(&self, sample_rate: f32, envelope: &Envelope) -> bool {
        self.elapsed_samples as f32 / sample_rate >= self.hold_seconds + envelope.release
    }
}

/// Mixes any number of overlapping voices into one mono signal.
#[derive(Debug, Clone)]
pub struct PolySynth {
    sample_rate: f32,
    envelope: Envelope,
    gain: f32,
    voices: VecDeque<Voice>,
}

impl PolySynth {
    pub fn new(sample_rate: u32, envelope: Envelope, gain: f32) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            envelope,
            gain,
            voices: VecDeque::with_capacity(MAX_VOICES),
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Starts one voice per note, dropping the oldest voices beyond
    /// [`MAX_VOICES`].
    pub fn handle(&mut self, request: PlayRequest) {
        for &frequency in request.frequencies() {
            if self.voices.len() == MAX_VOICES {
                self.voices.pop_front();
            }
            self.voices.push_back(Voice {
                frequency,
                phase: 0.0,
                elapsed_samples: 0,
                hold_seconds: request.hold_seconds,
            });
        }
    }

    /// Renders the next mono sample and retires voices whose release ended.
    pub fn next_sample(&mut self) -> f32 {
        let (sample_rate, envelope) = (self.sample_rate, self.envelope);
        let mix: f32 = self
            .voices
            .iter_mut()
            .map(|voice| voice.next_sample(sample_rate, &envelope))
            .sum();
        self.voices
            .retain(|voice| !voice.is_finished(sample_rate, &envelope));
        (mix * self.gain).clamp(-1.0, 1.0)
    }

    /// Fills an interleaved buffer, writing the same sample to every channel.
    pub fn fill(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels.max(1)) {
            let sample = self.next_sample();
            for channel_sample in frame.iter_mut() {
                *channel_sample = sample;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 1_000;

    fn play(frequencies: &[f32], hold_seconds: f32) -> PlayRequest {
        PlayRequest::new(frequencies, hold_seconds)
    }

    #[test]
    fn envelope_shape() {
        let env = Envelope::default();
        assert_eq!(env.amplitude(0.0, 0.5), 0.0);
        assert!((env.amplitude(0.005, 0.5) - 1.0).abs() < 1e-4);
        assert!((env.amplitude(0.3, 0.5) - 0.3).abs() < 1e-6);
        // Half way through the release.
        assert!((env.amplitude(1.0, 0.5) - 0.15).abs() < 1e-6);
        assert_eq!(env.amplitude(1.6, 0.5), 0.0);
    }

    #[test]
    fn zero_length_stages_do_not_divide_by_zero() {
        let env = Envelope {
            attack: 0.0,
            decay: 0.0,
            sustain: 0.5,
            release: 0.0,
        };
        assert_eq!(env.amplitude(0.0, 1.0), 0.5);
        assert_eq!(env.amplitude(1.0, 1.0), 0.0);
    }

    #[test]
    fn voices_retire_after_release() {
        let mut synth = PolySynth::new(RATE, Envelope::default(), 0.2);
        synth.handle(play(&[110.0], 0.5));
        assert_eq!(synth.active_voices(), 1);

        // 0.5 s held + 1.0 s release at 1 kHz.
        for _ in 0..1_499 {
            synth.next_sample();
        }
        assert_eq!(synth.active_voices(), 1);
        synth.next_sample();
        assert_eq!(synth.active_voices(), 0);
        assert_eq!(synth.next_sample(), 0.0);
    }

    #[test]
    fn overlapping_chords_are_polyphonic() {
        let mut synth = PolySynth::new(RATE, Envelope::default(), 0.2);
        synth.handle(play(&[130.8, 164.8, 196.0], 0.8));
        synth.next_sample();
        synth.handle(play(&[146.8, 174.6, 220.0], 0.8));
        assert_eq!(synth.active_voices(), 6);
    }

    #[test]
    fn output_is_bounded() {
        let mut synth = PolySynth::new(RATE, Envelope::default(), 1.0);
        for _ in 0..7 {
            synth.handle(play(&[50.0, 50.0, 50.0], 1.0));
        }
        let mut buffer = vec![0.0; 400];
        synth.fill(&mut buffer, 2);
        assert!(buffer.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(buffer.chunks(2).all(|frame| frame[0] == frame[1]));
        assert!(buffer.iter().any(|s| s.abs() > 0.0));
    }

    #[test]
    fn voice_count_is_capped_oldest_first() {
        let mut synth = PolySynth::new(RATE, Envelope::default(), 0.2);
        synth.handle(play(&[110.0], 0.5));
        for _ in 0..MAX_VOICES / 3 + 1 {
            synth.handle(play(&[220.0, 277.2, 329.6], 0.5));
        }
        assert_eq!(synth.active_voices(), MAX_VOICES);
        assert!(synth.voices.iter().all(|v| v.frequency != 110.0));
    }

    #[test]
    fn requests_keep_at_most_a_triad() {
        let request = PlayRequest::new(&[1.0, 2.0, 3.0, 4.0], 0.8);
        assert_eq!(request.frequencies(), [1.0, 2.0, 3.0]);
        assert_eq!(PlayRequest::new(&[440.0], 0.5).frequencies(), [440.0]);
        assert!(PlayRequest::new(&[], 0.5).frequencies().is_empty());
    }
}
