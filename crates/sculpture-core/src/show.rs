//! Frame orchestration tying audio analysis to the light patterns.
//!
//! The audio side calls `on_spectrum` once per analysis window; the render
//! side calls `frame` once per animation frame. Both run on the same thread.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::accumulator::{PatternAccumulator, PatternConfig};
use crate::beat::{BeatDetector, BeatTrigger, TriggerConfig};
use crate::error::{CoreError, Result};
use crate::pattern::{default_templates, PatternId, PatternTemplate};
use crate::spectrum::{AnalyzerConfig, StereoFrame};
use crate::state::{SpinConfig, SpinState};

/// Everything needed to build a `Show`.
#[derive(Clone, Debug, Default)]
pub struct ShowConfig {
    pub analyzer: AnalyzerConfig,
    pub trigger: TriggerConfig,
    pub patterns: PatternConfig,
    pub spin: SpinConfig,
}

pub struct Show {
    detector: BeatDetector,
    trigger: BeatTrigger,
    accumulator: PatternAccumulator,
    templates: Vec<PatternTemplate>,
    spin: SpinState,
    rng: StdRng,
    muted: bool,
    release: bool,
    spin_triggered: bool,
    strength: f32,
}

impl Show {
    /// Builds a show with one random box and one random sphere template.
    pub fn new(light_positions: Vec<Vec3>, config: ShowConfig, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let templates = default_templates(&mut rng);
        Self::with_templates(light_positions, config, templates, rng)
    }

    pub fn with_templates(
        light_positions: Vec<Vec3>,
        config: ShowConfig,
        templates: Vec<PatternTemplate>,
        rng: StdRng,
    ) -> Result<Self> {
        if templates.is_empty() {
            return Err(CoreError::InvalidConfig(
                "at least one pattern template is required".into(),
            ));
        }
        let detector = BeatDetector::new(&config.analyzer)?;
        let accumulator = PatternAccumulator::new(light_positions, config.patterns)?;
        log::info!(
            "[show] lights={} bands={} templates={} target_patterns={}",
            accumulator.light_count(),
            detector.band_count(),
            templates.len(),
            accumulator.target_count()
        );
        Ok(Self {
            detector,
            trigger: BeatTrigger::new(config.trigger),
            accumulator,
            templates,
            spin: SpinState::new(config.spin),
            rng,
            muted: false,
            release: false,
            spin_triggered: false,
            strength: 0.0,
        })
    }

    pub fn detector(&self) -> &BeatDetector {
        &self.detector
    }

    pub fn trigger(&self) -> &BeatTrigger {
        &self.trigger
    }

    pub fn accumulator(&self) -> &PatternAccumulator {
        &self.accumulator
    }

    pub fn spin(&self) -> &SpinState {
        &self.spin
    }

    pub fn templates(&self) -> &[PatternTemplate] {
        &self.templates
    }

    /// Last accepted beat strength.
    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn release_pending(&self) -> bool {
        self.release
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// While muted the analysis is skipped and patterns are released freely.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn set_pattern_target(&mut self, count: usize) {
        self.accumulator.set_target_count(count);
    }

    /// Audio callback: analyses one frame and updates the release flag.
    ///
    /// Malformed frames are skipped and the previous strength is kept.
    pub fn on_spectrum(&mut self, frame: &StereoFrame) -> f32 {
        if self.muted {
            return self.strength;
        }
        match self.detector.step(frame) {
            Ok(strength) => {
                self.strength = strength;
                self.release = self.trigger.observe(strength);
                if self.release {
                    self.spin_triggered = true;
                }
            }
            Err(err) => log::warn!("[beat] skipping frame: {}", err),
        }
        self.strength
    }

    /// Render callback: releases a pattern if due, then advances the lights
    /// and the spin. Returns the per-light intensity ratios.
    pub fn frame(&mut self, dt_sec: f32, track_remaining_sec: f32) -> &[f32] {
        if self.muted || self.release {
            self.release_pattern();
        }
        let triggered = std::mem::take(&mut self.spin_triggered);
        self.spin.update(dt_sec, triggered, track_remaining_sec);
        self.accumulator.tick(dt_sec)
    }

    fn release_pattern(&mut self) -> Option<PatternId> {
        self.accumulator.spawn_random(&self.templates, &mut self.rng)
    }

    /// Track restart: the band history and the hurdle start over together.
    pub fn restart(&mut self) {
        self.detector.reset();
        self.trigger.reset();
        self.release = false;
        self.strength = 0.0;
    }
}
