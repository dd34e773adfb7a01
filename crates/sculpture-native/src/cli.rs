//! Command-line argument parsing.

use clap::Parser;
use sculpture_core::{
    GridConfig, PatternConfig, ShowConfig, LIGHT_COLS, LIGHT_ROWS, PATTERN_DEFAULT_COUNT,
    PATTERN_MAX_COUNT,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "sculpture")]
#[command(about = "Headless audio-reactive light sculpture", long_about = None)]
pub struct Args {
    /// Length of the synthesized track
    #[arg(long, value_name = "SECONDS", default_value = "30")]
    pub seconds: f32,

    /// Tempo of the synthesized track
    #[arg(long, default_value = "124")]
    pub bpm: f32,

    /// How many times the track plays; each loop restarts the beat detector
    #[arg(long, default_value = "1")]
    pub loops: u32,

    /// Render frames per second
    #[arg(long, default_value = "60")]
    pub fps: f32,

    /// Seed for the track and for every pattern decision
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Light grid rows
    #[arg(long, default_value_t = LIGHT_ROWS)]
    pub rows: usize,

    /// Light grid columns
    #[arg(long, default_value_t = LIGHT_COLS)]
    pub cols: usize,

    /// Concurrent patterns
    #[arg(long, default_value_t = PATTERN_DEFAULT_COUNT)]
    pub patterns: usize,

    /// Spectrum magnitude for a full-scale sine
    #[arg(long, default_value = "2.0")]
    pub gain: f32,

    /// Skip beat detection and release patterns every frame
    #[arg(long)]
    pub muted: bool,
}

impl Args {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.seconds > 0.0, "--seconds must be positive");
        anyhow::ensure!(self.bpm > 0.0, "--bpm must be positive");
        anyhow::ensure!(self.fps > 0.0, "--fps must be positive");
        anyhow::ensure!(self.rows > 0 && self.cols > 0, "the light grid is empty");
        if self.patterns > PATTERN_MAX_COUNT {
            log::warn!(
                "[cli] --patterns {} capped at {}",
                self.patterns,
                PATTERN_MAX_COUNT
            );
        }
        Ok(())
    }

    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            rows: self.rows,
            cols: self.cols,
            ..GridConfig::default()
        }
    }

    pub fn show_config(&self) -> ShowConfig {
        ShowConfig {
            patterns: PatternConfig {
                target_count: self.patterns,
                ..PatternConfig::default()
            },
            ..ShowConfig::default()
        }
    }
}
