//! FFT analysis turning raw stereo audio into spectrum frames.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use sculpture_core::StereoFrame;
use std::f32::consts::PI;
use std::sync::Arc;

/// Windowed forward FFT over the most recent `2 * bins` samples.
///
/// Magnitudes are scaled so a full-scale sine centred on a bin reads about
/// `gain`, which lets loud kicks climb past the beat threshold.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    bins: usize,
    gain: f32,
    buffer: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    pub fn new(bins: usize, gain: f32) -> Self {
        let fft_size = (bins * 2).max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        Self {
            fft,
            window: (0..fft_size).map(|i| hann_window(i, fft_size)).collect(),
            bins,
            gain,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    pub fn analyze(&mut self, left: &[f32], right: &[f32]) -> StereoFrame {
        StereoFrame::new(self.channel(left), self.channel(right))
    }

    /// Uses the tail of `samples`; shorter input is zero padded at the front.
    fn channel(&mut self, samples: &[f32]) -> Vec<f32> {
        let size = self.fft_size();
        let tail = &samples[samples.len().saturating_sub(size)..];
        let pad = size - tail.len();
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { tail[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let scale = self.gain * 4.0 / size as f32;
        self.buffer[..self.bins]
            .iter()
            .map(|c| c.norm() * scale)
            .collect()
    }
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    if size < 2 {
        return 1.0;
    }
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_window_tapers_to_edges() {
        let size = 512;
        assert!(hann_window(0, size).abs() < 0.01);
        assert!(hann_window(size - 1, size).abs() < 0.01);
        assert!((hann_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn sine_lands_in_its_bin() {
        let sample_rate = 44_100.0;
        let mut analyzer = SpectrumAnalyzer::new(256, 1.0);
        let size = analyzer.fft_size();
        let freq = 2.0 * sample_rate / size as f32;
        let samples: Vec<f32> = (0..size)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect();

        let frame = analyzer.analyze(&samples, &samples);
        assert_eq!(frame.left.len(), 256);
        let loudest = frame
            .left
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |best, (i, &m)| if m > best.1 { (i, m) } else { best });
        assert_eq!(loudest.0, 2);
        assert!((loudest.1 - 0.5).abs() < 0.05, "magnitude {}", loudest.1);
        assert_eq!(frame.left, frame.right);
    }

    #[test]
    fn silence_and_short_input_give_zeros() {
        let mut analyzer = SpectrumAnalyzer::new(8, 2.0);
        let frame = analyzer.analyze(&[], &[0.0; 3]);
        assert_eq!(frame.left, vec![0.0f32; 8]);
        assert_eq!(frame.right, vec![0.0f32; 8]);
    }
}
