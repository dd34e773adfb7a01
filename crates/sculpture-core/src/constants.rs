// Shared tuning constants for the beat detector, the patterns and the sculpture.

// Audio analysis
pub const SAMPLE_COUNT: usize = 256; // FFT size of the audio source, also the band history depth
pub const CUTOFF_HZ: f32 = 500.0; // bands below this carry the beat
pub const NYQUIST_HZ: f32 = 22050.0;
pub const BAND_WEIGHT_EXPONENT: i32 = 16; // strongly favours the band with the widest spread
pub const HURDLE_DECAY_RESET: u32 = 2;
pub const HURDLE_DECAY_DIVISOR: f32 = 50.0;
pub const EQ_FALL_SPEED: f32 = 0.05; // per frame, for displayed spectra

// Beat trigger policy
pub const BEAT_THRESHOLD: f32 = 1.15;
pub const ROLLING_AVG_SAMPLES: usize = 20;

// Pattern motion. Speeds were tuned per frame at 60 fps and are stored per second.
pub const REFERENCE_FPS: f32 = 60.0;
pub const PATTERN_MIN_SPEED: f32 = 1.5 * REFERENCE_FPS;
pub const PATTERN_MAX_SPEED: f32 = 7.0 * REFERENCE_FPS;
pub const PATTERN_MAX_SPEED_SCALE: f32 = 1.3; // speed multiplier at the maximum pattern count
pub const PATTERN_MAX_INTENSITY_INCREMENT: f32 = 0.1;
pub const PATTERN_START_ARC_RADIUS: f32 = 100.0;
pub const PATTERN_MAX_COUNT: usize = 8;
pub const PATTERN_DEFAULT_COUNT: usize = 3;
pub const PATTERN_GRACE_FRAMES: u32 = 15; // frames a new pattern survives without touching a light

// Random template sizes
pub const BOX_MIN_SIZE: [f32; 3] = [20.0, 20.0, 20.0]; // width, height, depth
pub const BOX_MAX_SIZE: [f32; 3] = [100.0, 100.0, 100.0];
pub const SPHERE_MIN_RADIUS: f32 = 25.0;
pub const SPHERE_MAX_RADIUS: f32 = 75.0;
pub const PATTERN_MIN_EXTENT: f32 = 0.01; // floor for zero, negative or NaN template sizes

// Sculpture light grid
pub const LIGHT_ROWS: usize = 13;
pub const LIGHT_COLS: usize = 38;
pub const LIGHT_WIDTH: f32 = 3.0;
pub const LIGHT_HEIGHT: f32 = 3.0;
pub const LIGHT_MARGIN: f32 = 1.0;
pub const LIGHT_MIN_HEIGHT: f32 = 65.0; // also the height patterns travel at

// Light appearance
pub const LIGHT_COLOR_ON: [f32; 3] = [0.898, 0.851, 0.792]; // 0xE5D9CA
pub const LIGHT_COLOR_OFF: [f32; 3] = [0.035, 0.035, 0.035]; // 0x090909
pub const LIGHT_MAX_INTENSITY: f32 = 4.0;

// Sculpture spin
pub const SPIN_MAX_SPEED: f32 = 1.0; // radians per second
pub const SPIN_START_RAMP_SEC: f32 = 8.0;
pub const SPIN_END_RAMP_SEC: f32 = 33.0; // spin winds down over the last part of the track
pub const SPIN_RAMP_NUDGE_SEC: f32 = 0.001; // keeps the first ramp step above zero
