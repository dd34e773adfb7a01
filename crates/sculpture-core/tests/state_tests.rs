// Host-side tests for light appearance and the centrepiece spin.

use glam::Vec3;
use sculpture_core::{LightInstance, LightPalette, SpinConfig, SpinState};

#[test]
fn palette_maps_ratio_between_off_and_on() {
    let palette = LightPalette::default();
    assert_eq!(palette.color_for(0.0), palette.off);
    assert!((palette.color_for(1.0) - palette.on).length() < 1e-6);
    let mid = palette.color_for(0.5);
    assert!((mid - (palette.on + palette.off) * 0.5).length() < 1e-6);

    assert_eq!(palette.intensity_for(0.0), 0.0);
    assert!((palette.intensity_for(0.5) - 2.0).abs() < 1e-6);
    assert!((palette.intensity_for(3.0) - 4.0).abs() < 1e-6);
    assert_eq!(palette.intensity_for(-1.0), 0.0);
}

#[test]
fn instances_pair_positions_with_ratios() {
    let palette = LightPalette::default();
    let positions = vec![Vec3::new(1.0, 65.0, -2.0), Vec3::new(5.0, 66.0, -2.0)];
    let instances = palette.instances(&positions, &[1.0, 0.0, 0.7]);
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].pos, [1.0, 65.0, -2.0]);
    assert!((instances[0].intensity - 4.0).abs() < 1e-6);
    assert_eq!(instances[1].intensity, 0.0);
    assert_eq!(instances[1].color[3], 1.0);
}

#[test]
fn light_instance_is_gpu_friendly() {
    assert_eq!(std::mem::size_of::<LightInstance>(), 32);
    let instances = [LightInstance::default(); 3];
    let floats: &[f32] = bytemuck::cast_slice(&instances);
    assert_eq!(floats.len(), 24);
    let bytes: &[u8] = bytemuck::cast_slice(&instances);
    assert_eq!(bytes.len(), 96);
}

#[test]
fn spin_waits_for_a_beat() {
    let mut spin = SpinState::new(SpinConfig::default());
    for _ in 0..10 {
        assert_eq!(spin.update(0.1, false, 100.0), 0.0);
    }
    assert!(!spin.spinning);
    assert_eq!(spin.angle, 0.0);
}

#[test]
fn spin_ramps_up_to_max_speed() {
    let mut spin = SpinState::new(SpinConfig::default());
    let first = spin.update(0.1, true, 100.0);
    assert!((first - 0.101 / 8.0).abs() < 1e-5);

    let mut prev = first;
    for _ in 0..100 {
        let speed = spin.update(0.1, false, 100.0);
        assert!(speed >= prev);
        prev = speed;
    }
    assert!((prev - 1.0).abs() < 1e-6);
    assert!(spin.angle > 0.0);
}

#[test]
fn spin_winds_down_near_track_end_and_stops() {
    let mut spin = SpinState::new(SpinConfig::default());
    spin.update(0.1, true, 100.0);
    assert!((spin.update(0.1, false, 16.5) - 0.5).abs() < 1e-6);
    assert!(spin.spinning);

    assert_eq!(spin.update(0.1, false, 0.0), 0.0);
    assert!(!spin.spinning);
    // stays stopped without a new beat
    assert_eq!(spin.update(0.1, false, 100.0), 0.0);
}
