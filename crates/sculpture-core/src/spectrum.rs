//! Spectrum frames and the rolling history of low-frequency band magnitudes.
//!
//! The audio source hands over one stereo frame of FFT magnitudes (0..1) per
//! analysis window. Only the first `band_count` bins, the ones below the
//! cutoff frequency, are kept for beat detection.

use crate::constants::{CUTOFF_HZ, EQ_FALL_SPEED, NYQUIST_HZ, SAMPLE_COUNT};
use crate::error::{CoreError, Result};

/// One analysis window of FFT magnitudes for both channels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl StereoFrame {
    pub fn new(left: Vec<f32>, right: Vec<f32>) -> Self {
        Self { left, right }
    }

    /// Same magnitudes on both channels.
    pub fn mono(magnitudes: Vec<f32>) -> Self {
        Self {
            right: magnitudes.clone(),
            left: magnitudes,
        }
    }

    /// Number of bins present on both channels.
    pub fn len(&self) -> usize {
        self.left.len().min(self.right.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that the first `band_count` bins exist and are finite on both channels.
    pub fn validate(&self, band_count: usize) -> Result<()> {
        if self.len() < band_count {
            return Err(CoreError::InvalidInput {
                expected: band_count,
                actual: self.len(),
            });
        }
        for band in 0..band_count {
            if !self.left[band].is_finite() || !self.right[band].is_finite() {
                return Err(CoreError::NonFiniteInput { band });
            }
        }
        Ok(())
    }
}

/// Sizing of the beat analysis.
///
/// - `sample_count`: FFT size of the source and depth of the band history
/// - `cutoff_hz`: only bins below this frequency are analysed
/// - `nyquist_hz`: highest frequency represented by the FFT
#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    pub sample_count: usize,
    pub cutoff_hz: f32,
    pub nyquist_hz: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_count: SAMPLE_COUNT,
            cutoff_hz: CUTOFF_HZ,
            nyquist_hz: NYQUIST_HZ,
        }
    }
}

impl AnalyzerConfig {
    /// Number of low-frequency bins under the cutoff (6 for the defaults).
    pub fn band_count(&self) -> usize {
        if self.sample_count == 0 || self.nyquist_hz <= 0.0 {
            return 0;
        }
        let bin_width_hz = self.nyquist_hz / self.sample_count as f32;
        (self.cutoff_hz / bin_width_hz).round().max(0.0) as usize
    }
}

/// Fixed-size ring of per-band magnitudes.
///
/// Rows are written in place; statistics walk the valid rows in storage
/// order, so once the ring has wrapped the newest row sits somewhere in the
/// middle of the window.
#[derive(Clone, Debug)]
pub struct SpectrumBuffer {
    band_count: usize,
    rows: Vec<Vec<f32>>,
    recorded: usize,
}

impl SpectrumBuffer {
    pub fn new(band_count: usize, capacity: usize) -> Result<Self> {
        if band_count == 0 {
            return Err(CoreError::InvalidConfig(
                "spectrum buffer needs at least one band".into(),
            ));
        }
        if capacity == 0 {
            return Err(CoreError::InvalidConfig(
                "spectrum buffer needs a non-zero capacity".into(),
            ));
        }
        Ok(Self {
            band_count,
            rows: vec![vec![0.0; band_count]; capacity],
            recorded: 0,
        })
    }

    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        Self::new(config.band_count(), config.sample_count)
    }

    pub fn band_count(&self) -> usize {
        self.band_count
    }

    pub fn capacity(&self) -> usize {
        self.rows.len()
    }

    /// Row that the next `record` call overwrites.
    pub fn write_index(&self) -> usize {
        self.recorded % self.rows.len()
    }

    /// Number of rows holding valid data: `min(records since reset, capacity)`.
    pub fn sample_count(&self) -> usize {
        self.recorded.min(self.rows.len())
    }

    pub fn is_full(&self) -> bool {
        self.recorded >= self.rows.len()
    }

    pub fn reset(&mut self) {
        self.recorded = 0;
        for row in &mut self.rows {
            row.iter_mut().for_each(|v| *v = 0.0);
        }
    }

    /// Stores `max(left, right)` per band into the current slot.
    ///
    /// Malformed frames are rejected before anything is written.
    pub fn record(&mut self, frame: &StereoFrame) -> Result<()> {
        frame.validate(self.band_count)?;
        let slot = self.write_index();
        let row = &mut self.rows[slot];
        for (band, value) in row.iter_mut().enumerate() {
            *value = frame.left[band].max(frame.right[band]);
        }
        self.recorded = self.recorded.saturating_add(1);
        Ok(())
    }

    /// Valid rows in storage order.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.rows[..self.sample_count()].iter().map(Vec::as_slice)
    }

    /// Samples of one band across the valid rows, in storage order.
    pub fn band(&self, band: usize) -> impl Iterator<Item = f32> + '_ {
        self.rows().filter_map(move |row| row.get(band).copied())
    }
}

/// Falling-bar smoothing for displayed spectra: a bin may jump up instantly
/// but only drops by `fall_speed` per frame.
#[derive(Clone, Debug)]
pub struct EqFalloff {
    fall_speed: f32,
    previous: Option<StereoFrame>,
}

impl Default for EqFalloff {
    fn default() -> Self {
        Self::new(EQ_FALL_SPEED)
    }
}

impl EqFalloff {
    pub fn new(fall_speed: f32) -> Self {
        Self {
            fall_speed: fall_speed.max(0.0),
            previous: None,
        }
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn apply(&mut self, frame: &StereoFrame) -> StereoFrame {
        let out = match &self.previous {
            None => frame.clone(),
            Some(prev) => StereoFrame {
                left: fall_channel(&frame.left, &prev.left, self.fall_speed),
                right: fall_channel(&frame.right, &prev.right, self.fall_speed),
            },
        };
        self.previous = Some(out.clone());
        out
    }
}

fn fall_channel(current: &[f32], previous: &[f32], fall_speed: f32) -> Vec<f32> {
    current
        .iter()
        .enumerate()
        .map(|(i, &value)| match previous.get(i) {
            Some(&prev) if value < prev => (prev - fall_speed).max(0.0),
            _ => value,
        })
        .collect()
}
