//! Visual-side state types shared with front-ends.
//!
//! These types avoid referencing platform-specific APIs. A renderer turns the
//! accumulator's intensity ratios into light colors and strengths with
//! `LightPalette`, and reads the centrepiece rotation from `SpinState`.

use glam::Vec3;

use crate::constants::{
    LIGHT_COLOR_OFF, LIGHT_COLOR_ON, LIGHT_MAX_INTENSITY, SPIN_END_RAMP_SEC, SPIN_MAX_SPEED,
    SPIN_RAMP_NUDGE_SEC, SPIN_START_RAMP_SEC,
};

/// Per-light record ready to be uploaded as instance data.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightInstance {
    pub pos: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 4],
}

/// Maps an intensity ratio onto an emitter color and a light strength.
#[derive(Clone, Debug)]
pub struct LightPalette {
    pub on: Vec3,
    pub off: Vec3,
    pub max_intensity: f32,
}

impl Default for LightPalette {
    fn default() -> Self {
        Self {
            on: Vec3::from(LIGHT_COLOR_ON),
            off: Vec3::from(LIGHT_COLOR_OFF),
            max_intensity: LIGHT_MAX_INTENSITY,
        }
    }
}

impl LightPalette {
    pub fn color_for(&self, ratio: f32) -> Vec3 {
        self.off.lerp(self.on, ratio.clamp(0.0, 1.0))
    }

    pub fn intensity_for(&self, ratio: f32) -> f32 {
        ratio.clamp(0.0, 1.0) * self.max_intensity
    }

    /// Pairs positions with ratios; extra entries on either side are ignored.
    pub fn instances(&self, positions: &[Vec3], ratios: &[f32]) -> Vec<LightInstance> {
        positions
            .iter()
            .zip(ratios)
            .map(|(pos, &ratio)| LightInstance {
                pos: pos.to_array(),
                intensity: self.intensity_for(ratio),
                color: self.color_for(ratio).extend(1.0).to_array(),
            })
            .collect()
    }
}

/// Spin ramp settings for the centrepiece.
#[derive(Clone, Debug)]
pub struct SpinConfig {
    pub max_speed: f32,
    pub start_ramp_sec: f32,
    pub end_ramp_sec: f32,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            max_speed: SPIN_MAX_SPEED,
            start_ramp_sec: SPIN_START_RAMP_SEC,
            end_ramp_sec: SPIN_END_RAMP_SEC,
        }
    }
}

/// Rotation of the centrepiece under the lights.
///
/// A beat starts the spin, which ramps up to `max_speed` and winds down over
/// the last `end_ramp_sec` of the track. Once the speed hits zero the spin
/// stops until the next beat.
#[derive(Clone, Debug, Default)]
pub struct SpinState {
    pub config: SpinConfig,
    pub spinning: bool,
    pub angle: f32,
    pub speed: f32,
    ramp_elapsed: f32,
}

impl SpinState {
    pub fn new(config: SpinConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Advances the spin and returns the current speed in radians per second.
    pub fn update(&mut self, dt_sec: f32, triggered: bool, track_remaining_sec: f32) -> f32 {
        if triggered {
            self.spinning = true;
        }
        let mut speed = 0.0;
        if self.spinning {
            speed = if track_remaining_sec <= self.config.end_ramp_sec {
                lerp_clamped(
                    0.0,
                    self.config.max_speed,
                    ratio(track_remaining_sec, self.config.end_ramp_sec),
                )
            } else {
                self.ramp_elapsed += dt_sec + SPIN_RAMP_NUDGE_SEC;
                lerp_clamped(
                    0.0,
                    self.config.max_speed,
                    ratio(self.ramp_elapsed, self.config.start_ramp_sec),
                )
            };
            self.angle += dt_sec * speed;
        }
        if speed == 0.0 {
            self.spinning = false;
            self.ramp_elapsed = 0.0;
        }
        self.speed = speed;
        speed
    }
}

fn ratio(part: f32, whole: f32) -> f32 {
    if whole > 0.0 {
        part / whole
    } else {
        1.0
    }
}

fn lerp_clamped(start: f32, end: f32, t: f32) -> f32 {
    start + t.clamp(0.0, 1.0) * (end - start)
}
