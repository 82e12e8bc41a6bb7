//! Application-level configuration constants.

// Step derivation
pub const DEFAULT_SCALE: f64 = 10.0;
pub const DEFAULT_DIVISOR: f64 = 3.0;

// Cell entry limits (exclusive upper bound on the magnitude)
pub const TRANSLATION_LIMIT: f64 = 6.0;
pub const ANGULAR_LIMIT: f64 = 46.0;
pub const DEGREE_SUFFIX: char = '°';

/// FDI tooth numbers in the order the table displays them:
/// upper right, upper left, lower left, lower right.
pub const TOOTH_ROWS: [u8; 32] = [
    18, 17, 16, 15, 14, 13, 12, 11, 21, 22, 23, 24, 25, 26, 27, 28, 38, 37, 36, 35, 34, 33, 32,
    31, 41, 42, 43, 44, 45, 46, 47, 48,
];

// Playback
pub const SKIP_SECONDS: f64 = 1.0;
pub const MAJOR_TICK_INTERVAL: u32 = 5;
/// Upper bound on tick marks and progression samples built in one go.
pub const MAX_SAMPLES: usize = 10_000;

// Default progression: two channels over 17 seconds, sampled every second
pub const DEFAULT_PROGRESSION_SECONDS: f64 = 17.0;
pub const DEFAULT_PROGRESSION_STEP: f64 = 1.0;
pub const DEFAULT_CHANNEL_A: (f64, f64) = (0.0, 4.0);
pub const DEFAULT_CHANNEL_B: (f64, f64) = (0.0, 17.0);
