//! Synthesized drum track that stands in for a music file.
//!
//! Four-on-the-floor kicks with offbeat hats. The last bars of every phrase
//! drop the kick so the beat detector has quiet stretches to recover from.

use rand::prelude::*;
use std::f32::consts::{FRAC_PI_4, TAU};

const STEPS_PER_BAR: u32 = 16;
const BARS_PER_PHRASE: u32 = 8;
const BREAK_BARS: u32 = 2;
const GHOST_KICK_PROBABILITY: f32 = 0.3;

const KICK_START_HZ: f32 = 150.0;
const KICK_END_HZ: f32 = 48.0;
const KICK_SWEEP_TAU_SEC: f32 = 0.03;
const KICK_DECAY_TAU_SEC: f32 = 0.12;
const KICK_LENGTH_SEC: f32 = 0.5;
const HAT_DECAY_TAU_SEC: f32 = 0.02;
const HAT_LENGTH_SEC: f32 = 0.12;
const ATTACK_SEC: f32 = 0.002;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Hit {
    Kick,
    Hat,
}

struct Voice {
    hit: Hit,
    amplitude: f32,
    phase: f32, // radians
    samples_emitted: u32,
    total_samples: u32,
    attack_samples: u32,
    left_gain: f32,
    right_gain: f32,
}

impl Voice {
    fn new(hit: Hit, amplitude: f32, pan: f32, sample_rate: f32) -> Self {
        let length = match hit {
            Hit::Kick => KICK_LENGTH_SEC,
            Hit::Hat => HAT_LENGTH_SEC,
        };
        // equal-power pan, -1 left .. 1 right
        let angle = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
        Self {
            hit,
            amplitude,
            phase: 0.0,
            samples_emitted: 0,
            total_samples: ((length * sample_rate) as u32).max(1),
            attack_samples: ((ATTACK_SEC * sample_rate) as u32).max(1),
            left_gain: angle.cos(),
            right_gain: angle.sin(),
        }
    }

    fn sample(&mut self, rng: &mut StdRng, sample_rate: f32) -> f32 {
        let n = self.samples_emitted;
        let t = n as f32 / sample_rate;
        let attack = (n as f32 / self.attack_samples as f32).min(1.0);
        let raw = match self.hit {
            Hit::Kick => {
                let freq =
                    KICK_END_HZ + (KICK_START_HZ - KICK_END_HZ) * (-t / KICK_SWEEP_TAU_SEC).exp();
                self.phase = (self.phase + TAU * freq / sample_rate) % TAU;
                self.phase.sin() * (-t / KICK_DECAY_TAU_SEC).exp()
            }
            Hit::Hat => rng.gen_range(-1.0f32..1.0) * (-t / HAT_DECAY_TAU_SEC).exp(),
        };
        self.samples_emitted += 1;
        raw * attack * self.amplitude
    }

    fn finished(&self) -> bool {
        self.samples_emitted >= self.total_samples
    }
}

pub struct DrumTrack {
    sample_rate: f32,
    samples_per_step: f64,
    length_samples: u64,
    position: u64,
    next_step_at: f64,
    step: u32,
    voices: Vec<Voice>,
    rng: StdRng,
    seed: u64,
}

impl DrumTrack {
    pub fn new(sample_rate: f32, bpm: f32, length_sec: f32, seed: u64) -> Self {
        // four steps per beat
        let samples_per_step = sample_rate as f64 * 60.0 / (bpm.max(1.0) as f64 * 4.0);
        Self {
            sample_rate,
            samples_per_step,
            length_samples: (length_sec.max(0.0) as f64 * sample_rate as f64) as u64,
            position: 0,
            next_step_at: 0.0,
            step: 0,
            voices: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.length_samples
    }

    pub fn elapsed_sec(&self) -> f32 {
        self.position.min(self.length_samples) as f32 / self.sample_rate
    }

    pub fn remaining_sec(&self) -> f32 {
        self.length_samples.saturating_sub(self.position) as f32 / self.sample_rate
    }

    /// Rewinds to the start with the same hit pattern.
    pub fn restart(&mut self) {
        self.position = 0;
        self.next_step_at = 0.0;
        self.step = 0;
        self.voices.clear();
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    /// Fills both channels; anything past the end of the track is silence.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            if self.is_finished() {
                *l = 0.0;
                *r = 0.0;
                continue;
            }
            while self.position as f64 >= self.next_step_at {
                self.trigger_step();
                self.next_step_at += self.samples_per_step;
                self.step += 1;
            }
            let (vl, vr) = self.mix_sample();
            *l = vl;
            *r = vr;
            self.position += 1;
        }
    }

    fn trigger_step(&mut self) {
        let bar = self.step / STEPS_PER_BAR;
        let step_in_bar = self.step % STEPS_PER_BAR;
        let in_break = bar % BARS_PER_PHRASE >= BARS_PER_PHRASE - BREAK_BARS;

        if !in_break {
            if step_in_bar % 4 == 0 {
                self.voices
                    .push(Voice::new(Hit::Kick, 0.9, 0.0, self.sample_rate));
            } else if step_in_bar == 14 && self.rng.gen::<f32>() < GHOST_KICK_PROBABILITY {
                self.voices
                    .push(Voice::new(Hit::Kick, 0.5, 0.0, self.sample_rate));
            }
        }
        if step_in_bar % 4 == 2 {
            let amplitude = 0.2 + self.rng.gen::<f32>() * 0.1;
            let pan = self.rng.gen_range(-0.6f32..0.6);
            self.voices
                .push(Voice::new(Hit::Hat, amplitude, pan, self.sample_rate));
        }
    }

    fn mix_sample(&mut self) -> (f32, f32) {
        let mut left = 0.0f32;
        let mut right = 0.0f32;
        let mut i = 0usize;
        while i < self.voices.len() {
            let voice = &mut self.voices[i];
            let raw = voice.sample(&mut self.rng, self.sample_rate);
            left += raw * voice.left_gain;
            right += raw * voice.right_gain;
            if voice.finished() {
                self.voices.swap_remove(i);
                continue;
            }
            i += 1;
        }
        (left.tanh(), right.tanh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    #[test]
    fn track_opens_with_a_kick() {
        let mut track = DrumTrack::new(44_100.0, 120.0, 2.0, 1);
        let mut left = vec![0.0; 2048];
        let mut right = vec![0.0; 2048];
        track.render(&mut left, &mut right);
        assert!(peak(&left) > 0.3);
        // centred kick
        assert!((peak(&left) - peak(&right)).abs() < 0.2);
    }

    #[test]
    fn track_ends_in_silence() {
        let mut track = DrumTrack::new(1_000.0, 120.0, 1.0, 1);
        let mut left = vec![0.0; 1500];
        let mut right = vec![0.0; 1500];
        track.render(&mut left, &mut right);
        assert!(track.is_finished());
        assert_eq!(track.remaining_sec(), 0.0);
        assert!(left[1000..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn restart_replays_the_same_audio() {
        let mut track = DrumTrack::new(8_000.0, 128.0, 1.0, 9);
        let mut first = (vec![0.0; 4000], vec![0.0; 4000]);
        track.render(&mut first.0, &mut first.1);
        track.restart();
        assert!((track.remaining_sec() - 1.0).abs() < 1e-6);
        let mut second = (vec![0.0; 4000], vec![0.0; 4000]);
        track.render(&mut second.0, &mut second.1);
        assert_eq!(first, second);
    }
}
