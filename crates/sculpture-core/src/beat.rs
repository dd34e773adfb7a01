//! Adaptive beat detection over the low-frequency bands.
//!
//! Every frame the detector re-weights the bands from their recent history,
//! picking the band with by far the largest dynamic range (usually the kick
//! drum), and compares the weighted level against a hurdle that decays a
//! little faster each frame the music stays below it.

use std::collections::VecDeque;

use crate::constants::{
    BAND_WEIGHT_EXPONENT, BEAT_THRESHOLD, HURDLE_DECAY_DIVISOR, HURDLE_DECAY_RESET,
    ROLLING_AVG_SAMPLES,
};
use crate::error::Result;
use crate::spectrum::{AnalyzerConfig, SpectrumBuffer, StereoFrame};

/// Window statistics for a single band.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandStats {
    pub average: f32,
    /// `max - min` over the window.
    pub range: f32,
    /// Sum of absolute row-to-row changes, skipping the first two rows.
    pub jitter: f32,
}

/// Adaptive threshold state carried between frames.
#[derive(Clone, Debug, PartialEq)]
pub struct BeatState {
    pub hurdle: Option<f32>,
    pub decay_counter: u32,
}

impl Default for BeatState {
    fn default() -> Self {
        Self {
            hurdle: None,
            decay_counter: HURDLE_DECAY_RESET,
        }
    }
}

impl BeatState {
    /// Runs the level through the hurdle and stores the outcome as the new hurdle.
    fn apply(&mut self, level: f32) -> f32 {
        let level = match self.hurdle {
            Some(hurdle) if level < hurdle => {
                let decayed = hurdle - self.decay_counter as f32 / HURDLE_DECAY_DIVISOR;
                self.decay_counter += 1;
                decayed
            }
            _ => {
                self.decay_counter = HURDLE_DECAY_RESET;
                level
            }
        };
        self.hurdle = Some(level);
        level
    }
}

pub fn band_stats(buffer: &SpectrumBuffer) -> Vec<BandStats> {
    let n = buffer.sample_count();
    (0..buffer.band_count())
        .map(|band| {
            if n == 0 {
                return BandStats::default();
            }
            let mut sum = 0.0f32;
            let mut min = f32::INFINITY;
            let mut max = f32::NEG_INFINITY;
            let mut jitter = 0.0f32;
            let mut prev = 0.0f32;
            for (i, sample) in buffer.band(band).enumerate() {
                sum += sample;
                min = min.min(sample);
                max = max.max(sample);
                // rows 0 and 1 never contribute
                if i > 1 {
                    jitter += (prev - sample).abs();
                }
                prev = sample;
            }
            BandStats {
                average: sum / n as f32,
                range: max - min,
                jitter,
            }
        })
        .collect()
}

/// Raw weight `range^16 * jitter`, rescaled linearly to 0..1 across bands.
///
/// Computed in f64: the 16th power of a small range underflows f32.
/// When every band has the same raw weight all weights are 0.
pub fn band_weights(stats: &[BandStats]) -> Vec<f32> {
    let raw: Vec<f64> = stats
        .iter()
        .map(|s| (s.range as f64).powi(BAND_WEIGHT_EXPONENT) * s.jitter as f64)
        .collect();
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    raw.iter()
        .map(|&w| {
            let normalized = if span > 0.0 { (w - min) / span } else { 0.0 };
            if normalized.is_finite() {
                normalized as f32
            } else {
                0.0
            }
        })
        .collect()
}

/// Online beat-strength estimator.
///
/// Typical usage:
/// - Construct once per stream with `BeatDetector::new(&AnalyzerConfig::default())`
/// - Call `step(&frame)` from the audio analysis callback
/// - Call `reset()` when the track restarts
#[derive(Clone, Debug)]
pub struct BeatDetector {
    buffer: SpectrumBuffer,
    state: BeatState,
    weights: Vec<f32>,
}

impl BeatDetector {
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        Self::with_bands(config.band_count(), config.sample_count)
    }

    pub fn with_bands(band_count: usize, sample_count: usize) -> Result<Self> {
        let buffer = SpectrumBuffer::new(band_count, sample_count)?;
        Ok(Self {
            buffer,
            state: BeatState::default(),
            weights: vec![0.0; band_count],
        })
    }

    pub fn band_count(&self) -> usize {
        self.buffer.band_count()
    }

    pub fn buffer(&self) -> &SpectrumBuffer {
        &self.buffer
    }

    pub fn state(&self) -> &BeatState {
        &self.state
    }

    /// Band weights computed by the last successful `step`.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Clears the band history and the hurdle together.
    pub fn reset(&mut self) {
        self.buffer.reset();
        self.state = BeatState::default();
        self.weights.iter_mut().for_each(|w| *w = 0.0);
        log::info!("[beat] detector reset");
    }

    /// Consumes one stereo frame and returns a non-negative beat strength.
    ///
    /// A malformed frame leaves all state untouched.
    pub fn step(&mut self, frame: &StereoFrame) -> Result<f32> {
        self.buffer.record(frame)?;
        self.weights = band_weights(&band_stats(&self.buffer));

        // the current sample is read from the left channel only
        let level = self
            .weights
            .iter()
            .zip(&frame.left)
            .fold(frame.left[0], |acc, (&weight, &sample)| {
                acc.max(sample * weight)
            });

        let level = self.state.apply(level);
        if level.is_nan() {
            Ok(0.0)
        } else {
            Ok(level.max(0.0))
        }
    }
}

/// Trigger configuration.
///
/// - `threshold`: strengths strictly above this count as a beat
/// - `rolling_window`: number of recent strengths averaged for display
#[derive(Clone, Debug)]
pub struct TriggerConfig {
    pub threshold: f32,
    pub rolling_window: usize,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            threshold: BEAT_THRESHOLD,
            rolling_window: ROLLING_AVG_SAMPLES,
        }
    }
}

/// Caller-side policy turning beat strengths into a release decision.
#[derive(Clone, Debug)]
pub struct BeatTrigger {
    config: TriggerConfig,
    levels: VecDeque<f32>,
}

impl BeatTrigger {
    pub fn new(config: TriggerConfig) -> Self {
        let window = config.rolling_window.max(1);
        Self {
            config,
            levels: std::iter::repeat(0.0).take(window).collect(),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.config.threshold
    }

    pub fn observe(&mut self, strength: f32) -> bool {
        self.levels.pop_front();
        self.levels.push_back(strength);
        strength > self.config.threshold
    }

    pub fn rolling_average(&self) -> f32 {
        self.levels.iter().sum::<f32>() / self.levels.len() as f32
    }

    pub fn reset(&mut self) {
        self.levels.iter_mut().for_each(|l| *l = 0.0);
    }
}

impl Default for BeatTrigger {
    fn default() -> Self {
        Self::new(TriggerConfig::default())
    }
}
