// Host-side tests for spectrum frames, the band history ring and EQ falloff.

use sculpture_core::{AnalyzerConfig, CoreError, EqFalloff, SpectrumBuffer, StereoFrame};

fn frame(values: &[f32]) -> StereoFrame {
    StereoFrame::mono(values.to_vec())
}

#[test]
fn default_analyzer_keeps_six_low_bands() {
    let config = AnalyzerConfig::default();
    assert_eq!(config.band_count(), 6);
    let buffer = SpectrumBuffer::from_config(&config).unwrap();
    assert_eq!(buffer.band_count(), 6);
    assert_eq!(buffer.capacity(), 256);
}

#[test]
fn sample_count_tracks_records_until_full() {
    let mut buffer = SpectrumBuffer::new(2, 5).unwrap();
    assert_eq!(buffer.sample_count(), 0);
    for n in 1..=12 {
        buffer.record(&frame(&[0.1, 0.2])).unwrap();
        assert_eq!(buffer.sample_count(), n.min(5), "after {n} records");
    }
    assert!(buffer.is_full());
}

#[test]
fn write_index_wraps_around_capacity() {
    let mut buffer = SpectrumBuffer::new(1, 3).unwrap();
    let mut seen = Vec::new();
    for _ in 0..7 {
        seen.push(buffer.write_index());
        buffer.record(&frame(&[0.5])).unwrap();
    }
    assert_eq!(seen, vec![0, 1, 2, 0, 1, 2, 0]);
}

#[test]
fn record_keeps_louder_channel_per_band() {
    let mut buffer = SpectrumBuffer::new(3, 4).unwrap();
    let stereo = StereoFrame::new(vec![0.2, 0.9, 0.4, 1.0], vec![0.6, 0.1, 0.4]);
    buffer.record(&stereo).unwrap();
    let rows: Vec<&[f32]> = buffer.rows().collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], &[0.6f32, 0.9, 0.4]);
}

#[test]
fn short_frame_is_rejected_without_advancing() {
    let mut buffer = SpectrumBuffer::new(4, 5).unwrap();
    let err = buffer.record(&frame(&[0.1, 0.2, 0.3])).unwrap_err();
    assert_eq!(
        err,
        CoreError::InvalidInput {
            expected: 4,
            actual: 3
        }
    );
    assert_eq!(buffer.sample_count(), 0);
    assert_eq!(buffer.write_index(), 0);
}

#[test]
fn mismatched_channels_use_shorter_length() {
    let mut buffer = SpectrumBuffer::new(3, 5).unwrap();
    let stereo = StereoFrame::new(vec![0.1, 0.2, 0.3], vec![0.1, 0.2]);
    assert!(matches!(
        buffer.record(&stereo),
        Err(CoreError::InvalidInput {
            expected: 3,
            actual: 2
        })
    ));
}

#[test]
fn non_finite_magnitude_is_rejected() {
    let mut buffer = SpectrumBuffer::new(3, 5).unwrap();
    let stereo = StereoFrame::new(vec![0.1, f32::NAN, 0.3], vec![0.1, 0.2, 0.3]);
    assert_eq!(
        buffer.record(&stereo),
        Err(CoreError::NonFiniteInput { band: 1 })
    );
    assert_eq!(buffer.sample_count(), 0);
}

#[test]
fn reset_forgets_history() {
    let mut buffer = SpectrumBuffer::new(2, 3).unwrap();
    for _ in 0..4 {
        buffer.record(&frame(&[0.7, 0.7])).unwrap();
    }
    buffer.reset();
    assert_eq!(buffer.sample_count(), 0);
    assert_eq!(buffer.write_index(), 0);
    assert_eq!(buffer.rows().count(), 0);
}

#[test]
fn zero_sized_buffers_are_invalid() {
    assert!(matches!(
        SpectrumBuffer::new(0, 4),
        Err(CoreError::InvalidConfig(_))
    ));
    assert!(matches!(
        SpectrumBuffer::new(4, 0),
        Err(CoreError::InvalidConfig(_))
    ));
}

#[test]
fn band_iterates_rows_in_storage_order() {
    let mut buffer = SpectrumBuffer::new(1, 3).unwrap();
    for v in [0.1, 0.2, 0.3, 0.4] {
        buffer.record(&frame(&[v])).unwrap();
    }
    // the fourth record overwrote slot 0
    let band: Vec<f32> = buffer.band(0).collect();
    assert_eq!(band, vec![0.4f32, 0.2, 0.3]);
}

#[test]
fn eq_falloff_passes_first_frame_then_limits_drops() {
    let mut eq = EqFalloff::new(0.05);
    let first = eq.apply(&StereoFrame::new(vec![0.8, 0.2], vec![0.5, 0.5]));
    assert_eq!(first.left, vec![0.8f32, 0.2]);

    let second = eq.apply(&StereoFrame::new(vec![0.0, 0.6], vec![0.5, 0.01]));
    assert!((second.left[0] - 0.75).abs() < 1e-6);
    assert_eq!(second.left[1], 0.6);
    assert_eq!(second.right[0], 0.5);
    assert!((second.right[1] - 0.45).abs() < 1e-6);

    // falls from the smoothed value, not the raw one
    let third = eq.apply(&StereoFrame::new(vec![0.0, 0.6], vec![0.5, 0.01]));
    assert!((third.left[0] - 0.70).abs() < 1e-6);
}

#[test]
fn eq_falloff_never_goes_negative() {
    let mut eq = EqFalloff::new(0.3);
    eq.apply(&frame(&[0.1]));
    let out = eq.apply(&frame(&[0.0]));
    assert_eq!(out.left[0], 0.0);
}
