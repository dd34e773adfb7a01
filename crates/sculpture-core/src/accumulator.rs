//! Per-frame accumulation of pattern exposure into light intensities.
//!
//! Each light remembers how much every active pattern has brightened it. A
//! pattern covering a light raises its entry by the pattern's increment; once
//! the pattern has moved on the entry falls by the same step until it is
//! removed. A light's intensity ratio is the clamped sum of its entries.
//!
//! Cost is O(lights x active patterns) per tick, so the light count is the
//! knob to turn when a frame runs long.

use fnv::FnvHashMap;
use glam::Vec3;
use rand::Rng;

use crate::constants::{
    LIGHT_MIN_HEIGHT, PATTERN_DEFAULT_COUNT, PATTERN_GRACE_FRAMES, PATTERN_MAX_COUNT,
    PATTERN_MAX_INTENSITY_INCREMENT, PATTERN_MAX_SPEED, PATTERN_MAX_SPEED_SCALE,
    PATTERN_MIN_SPEED, PATTERN_START_ARC_RADIUS,
};
use crate::error::{CoreError, Result};
use crate::pattern::{random_increment, PatternId, PatternTemplate, SpatialPattern};

/// Motion, lifetime and concurrency settings for spawned patterns.
///
/// - `min_speed` / `max_speed`: per-axis speed range in world units per second
/// - `max_speed_scale`: speed multiplier when `target_count == max_count`
/// - `max_intensity_increment`: upper bound of the random per-pattern step
/// - `start_arc_radius`: distance from the centre at which patterns appear
/// - `start_height`: world height patterns travel at
/// - `max_count`: hard ceiling for `target_count`
/// - `target_count`: number of concurrent patterns the caller asks for
/// - `grace_frames`: frames a pattern is kept before it must touch a light
#[derive(Clone, Debug)]
pub struct PatternConfig {
    pub min_speed: f32,
    pub max_speed: f32,
    pub max_speed_scale: f32,
    pub max_intensity_increment: f32,
    pub start_arc_radius: f32,
    pub start_height: f32,
    pub max_count: usize,
    pub target_count: usize,
    pub grace_frames: u32,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_speed: PATTERN_MIN_SPEED,
            max_speed: PATTERN_MAX_SPEED,
            max_speed_scale: PATTERN_MAX_SPEED_SCALE,
            max_intensity_increment: PATTERN_MAX_INTENSITY_INCREMENT,
            start_arc_radius: PATTERN_START_ARC_RADIUS,
            start_height: LIGHT_MIN_HEIGHT,
            max_count: PATTERN_MAX_COUNT,
            target_count: PATTERN_DEFAULT_COUNT,
            grace_frames: PATTERN_GRACE_FRAMES,
        }
    }
}

impl PatternConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_speed >= 0.0 && self.max_speed >= self.min_speed) {
            return Err(CoreError::InvalidConfig(format!(
                "pattern speed range {}..{} is empty",
                self.min_speed, self.max_speed
            )));
        }
        if !(self.max_intensity_increment > 0.0 && self.max_intensity_increment <= 1.0) {
            return Err(CoreError::InvalidConfig(format!(
                "max intensity increment {} must be in (0, 1]",
                self.max_intensity_increment
            )));
        }
        if self.start_arc_radius <= 0.0 {
            return Err(CoreError::InvalidConfig(
                "start arc radius must be positive".into(),
            ));
        }
        if self.max_count == 0 {
            return Err(CoreError::InvalidConfig(
                "max pattern count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// A sculpture light and its exposure to the active patterns.
#[derive(Clone, Debug)]
pub struct Light {
    pub position: Vec3,
    pub intensity_ratio: f32,
    contributions: FnvHashMap<PatternId, f32>,
}

impl Light {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            intensity_ratio: 0.0,
            contributions: FnvHashMap::default(),
        }
    }

    pub fn contribution(&self, id: PatternId) -> Option<f32> {
        self.contributions.get(&id).copied()
    }

    pub fn contributions(&self) -> &FnvHashMap<PatternId, f32> {
        &self.contributions
    }

    /// Applies one pattern's effect for this frame. Returns whether the
    /// pattern still affects the light.
    fn expose(&mut self, pattern: &SpatialPattern) -> bool {
        if pattern.contains_point(self.position) {
            let entry = self.contributions.entry(pattern.id).or_insert(0.0);
            *entry = (*entry + pattern.intensity_increment).min(1.0);
            return true;
        }
        match self.contributions.get(&pattern.id).copied() {
            Some(current) => {
                let next = (current - pattern.intensity_increment).max(0.0);
                if next > 0.0 {
                    self.contributions.insert(pattern.id, next);
                    true
                } else {
                    self.contributions.remove(&pattern.id);
                    false
                }
            }
            None => false,
        }
    }

    fn recompute_ratio(&mut self) -> f32 {
        self.intensity_ratio = self.contributions.values().sum::<f32>().clamp(0.0, 1.0);
        self.intensity_ratio
    }
}

/// Owns the active patterns and every light's accumulated exposure.
///
/// Typical usage:
/// - Construct with `PatternAccumulator::new(light_positions, config)`
/// - Call `spawn(&template, &mut rng)` when the release policy fires
/// - Call `tick(dt_sec)` once per rendered frame and map the ratios to colors
pub struct PatternAccumulator {
    config: PatternConfig,
    lights: Vec<Light>,
    ratios: Vec<f32>,
    active: Vec<SpatialPattern>,
    next_id: PatternId,
}

impl PatternAccumulator {
    pub fn new(light_positions: Vec<Vec3>, config: PatternConfig) -> Result<Self> {
        config.validate()?;
        let mut config = config;
        config.target_count = config.target_count.min(config.max_count);
        let ratios = vec![0.0; light_positions.len()];
        let lights = light_positions.into_iter().map(Light::new).collect();
        Ok(Self {
            config,
            lights,
            ratios,
            active: Vec::new(),
            next_id: 0,
        })
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn active_patterns(&self) -> &[SpatialPattern] {
        &self.active
    }

    /// Intensity ratios from the last tick, indexed like the light positions.
    pub fn intensity_ratios(&self) -> &[f32] {
        &self.ratios
    }

    pub fn contribution(&self, light_index: usize, id: PatternId) -> Option<f32> {
        self.lights.get(light_index)?.contribution(id)
    }

    pub fn target_count(&self) -> usize {
        self.config.target_count
    }

    /// Changes the concurrent-pattern cap, clamped to `max_count`. Patterns
    /// already running are left alone.
    pub fn set_target_count(&mut self, count: usize) {
        self.config.target_count = count.min(self.config.max_count);
    }

    pub fn is_at_capacity(&self) -> bool {
        self.active.len() >= self.config.target_count
    }

    /// More concurrent patterns move faster: maps `target_count` over
    /// `0..=max_count` onto `1..=max_speed_scale`.
    pub fn velocity_scale(&self) -> f32 {
        map_linear(
            self.config.target_count as f32,
            0.0,
            self.config.max_count as f32,
            1.0,
            self.config.max_speed_scale,
        )
    }

    /// Spawns `template` on the start arc heading inwards with a random speed
    /// and intensity step. Returns `None` when the cap is reached.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        template: &PatternTemplate,
        rng: &mut R,
    ) -> Option<PatternId> {
        if self.is_at_capacity() {
            return None;
        }
        let angle = rng.gen::<f32>() * std::f32::consts::TAU;
        let (sin, cos) = angle.sin_cos();
        let radius = self.config.start_arc_radius;
        let position = Vec3::new(radius * cos, self.config.start_height, radius * sin);

        let (min_speed, max_speed) = (self.config.min_speed, self.config.max_speed);
        let mut speed = || {
            if max_speed > min_speed {
                rng.gen_range(min_speed..max_speed)
            } else {
                min_speed
            }
        };
        let velocity = Vec3::new(-cos * speed(), 0.0, -sin * speed()) * self.velocity_scale();
        let increment = random_increment(self.config.max_intensity_increment, rng);

        self.spawn_with(template, position, velocity, increment)
    }

    /// Picks one of `templates` uniformly and spawns it.
    pub fn spawn_random<R: Rng + ?Sized>(
        &mut self,
        templates: &[PatternTemplate],
        rng: &mut R,
    ) -> Option<PatternId> {
        if templates.is_empty() || self.is_at_capacity() {
            return None;
        }
        let template = &templates[rng.gen_range(0..templates.len())];
        self.spawn(template, rng)
    }

    /// Spawns with caller-chosen placement. The increment is capped at 1;
    /// a non-positive or non-finite increment spawns nothing.
    pub fn spawn_with(
        &mut self,
        template: &PatternTemplate,
        position: Vec3,
        velocity: Vec3,
        intensity_increment: f32,
    ) -> Option<PatternId> {
        if !(intensity_increment.is_finite() && intensity_increment > 0.0) {
            log::warn!(
                "[pattern] ignoring spawn with intensity step {}",
                intensity_increment
            );
            return None;
        }
        if self.is_at_capacity() {
            return None;
        }
        self.next_id += 1;
        let id = self.next_id;
        let pattern = SpatialPattern::from_template(
            id,
            template,
            position,
            velocity,
            intensity_increment.min(1.0),
        );
        log::debug!(
            "[pattern] spawn id={} shape={:?} pos=({:.1},{:.1},{:.1}) step={:.3}",
            id,
            pattern.shape,
            position.x,
            position.y,
            position.z,
            pattern.intensity_increment
        );
        self.active.push(pattern);
        Some(id)
    }

    /// Advances every pattern and recomputes every light's intensity ratio.
    pub fn tick(&mut self, dt_sec: f32) -> &[f32] {
        for pattern in &mut self.active {
            pattern.advance(dt_sec);
        }

        // lights outermost: there are far more of them than patterns
        let mut relevant = vec![false; self.active.len()];
        for (light, ratio) in self.lights.iter_mut().zip(self.ratios.iter_mut()) {
            for (idx, pattern) in self.active.iter().enumerate() {
                if light.expose(pattern) {
                    relevant[idx] = true;
                }
            }
            *ratio = light.recompute_ratio();
        }

        let grace = self.config.grace_frames;
        let mut idx = 0;
        self.active.retain(|pattern| {
            let keep = relevant[idx] || pattern.frame_count <= grace;
            idx += 1;
            if !keep {
                log::debug!(
                    "[pattern] retire id={} after {} frames",
                    pattern.id,
                    pattern.frame_count
                );
            }
            keep
        });

        &self.ratios
    }

    /// Drops all patterns and clears every light.
    pub fn clear(&mut self) {
        self.active.clear();
        for light in &mut self.lights {
            light.contributions.clear();
            light.intensity_ratio = 0.0;
        }
        self.ratios.iter_mut().for_each(|r| *r = 0.0);
    }
}

/// Linear remap of `x` from `a1..a2` onto `b1..b2`.
pub fn map_linear(x: f32, a1: f32, a2: f32, b1: f32, b2: f32) -> f32 {
    if a2 == a1 {
        return b1;
    }
    b1 + (x - a1) * (b2 - b1) / (a2 - a1)
}
