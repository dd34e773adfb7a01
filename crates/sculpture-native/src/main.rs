mod analysis;
mod cli;
mod synth;

use clap::Parser;
use instant::Instant;

use analysis::SpectrumAnalyzer;
use cli::Args;
use sculpture_core::{light_grid, AnalyzerConfig, EqFalloff, LightPalette, Show};
use synth::DrumTrack;

const SAMPLE_RATE: f32 = 44_100.0;

/// Most recent samples of both channels, enough for one FFT window.
struct SampleHistory {
    left: Vec<f32>,
    right: Vec<f32>,
    len: usize,
}

impl SampleHistory {
    fn new(len: usize) -> Self {
        Self {
            left: vec![0.0; len],
            right: vec![0.0; len],
            len,
        }
    }

    fn push(&mut self, left: &[f32], right: &[f32]) {
        self.left.extend_from_slice(left);
        self.right.extend_from_slice(right);
        let excess = self.left.len().saturating_sub(self.len);
        self.left.drain(..excess);
        let excess = self.right.len().saturating_sub(self.len);
        self.right.drain(..excess);
    }
}

/// What happened during one second of the show.
#[derive(Default)]
struct Summary {
    frames: u32,
    beats: u32,
    peak_strength: f32,
    peak_low_band: f32,
    lit_sum: usize,
    glow_sum: f32,
}

impl Summary {
    fn log(&self, second: u32, show: &Show, light_count: usize) {
        let frames = self.frames.max(1) as f32;
        log::info!(
            "[show] t={:>3}s beats={} peak={:.2} eq={:.2} patterns={} lit={:.0}/{} glow={:.1} spin={:.2}",
            second,
            self.beats,
            self.peak_strength,
            self.peak_low_band,
            show.accumulator().active_patterns().len(),
            self.lit_sum as f32 / frames,
            light_count,
            self.glow_sum / frames,
            show.spin().speed
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    args.validate()?;

    let positions = light_grid(&args.grid_config());
    let light_count = positions.len();
    let mut show = Show::new(positions.clone(), args.show_config(), args.seed)?;
    show.set_muted(args.muted);

    let analyzer_config = AnalyzerConfig::default();
    let mut analyzer = SpectrumAnalyzer::new(analyzer_config.sample_count, args.gain);
    let mut history = SampleHistory::new(analyzer.fft_size());
    let mut display = EqFalloff::default();
    let palette = LightPalette::default();
    let mut track = DrumTrack::new(SAMPLE_RATE, args.bpm, args.seconds, args.seed);

    let dt = 1.0 / args.fps;
    let samples_per_frame = ((track.sample_rate() / args.fps).round() as usize).max(1);
    let mut block_left = vec![0.0f32; samples_per_frame];
    let mut block_right = vec![0.0f32; samples_per_frame];

    log::info!(
        "[native] {}s at {} bpm, {} loop(s), {} fps, {} samples per frame",
        args.seconds,
        args.bpm,
        args.loops,
        args.fps,
        samples_per_frame
    );

    let started = Instant::now();
    let mut total_frames = 0u64;
    let mut total_beats = 0u64;

    for lap in 0..args.loops {
        if lap > 0 {
            track.restart();
            show.restart();
            display.reset();
            log::info!("[native] loop {} of {}", lap + 1, args.loops);
        }

        let mut summary = Summary::default();
        let mut second = 0u32;
        let mut was_released = false;

        while !track.is_finished() {
            track.render(&mut block_left, &mut block_right);
            history.push(&block_left, &block_right);

            let spectrum = analyzer.analyze(&history.left, &history.right);
            let strength = show.on_spectrum(&spectrum);
            let shown = display.apply(&spectrum);
            let released = show.release_pending();
            if released && !was_released {
                summary.beats += 1;
                total_beats += 1;
            }
            was_released = released;

            let ratios = show.frame(dt, track.remaining_sec());
            let lit = ratios.iter().filter(|&&r| r > 0.0).count();
            let glow: f32 = palette
                .instances(&positions, ratios)
                .iter()
                .map(|instance| instance.intensity)
                .sum();

            summary.frames += 1;
            summary.peak_strength = summary.peak_strength.max(strength);
            let low_band = shown.left.first().copied().unwrap_or(0.0);
            summary.peak_low_band = summary.peak_low_band.max(low_band);
            summary.lit_sum += lit;
            summary.glow_sum += glow;
            total_frames += 1;

            let now_second = track.elapsed_sec() as u32;
            if now_second > second {
                summary.log(now_second, &show, light_count);
                summary = Summary::default();
                second = now_second;
            }
        }
    }

    let elapsed = started.elapsed().as_secs_f64();
    log::info!(
        "[native] {} frames, {} beats in {:.2}s ({:.0} frames/s)",
        total_frames,
        total_beats,
        elapsed,
        total_frames as f64 / elapsed.max(1e-9)
    );
    Ok(())
}
