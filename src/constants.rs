//! Numeric and protocol constants shared across the pipeline.

/// Lower clamp for normalized band edges handed to the FIR designer.
pub const MIN_NORMALIZED_FREQ: f64 = 0.001;

/// Upper clamp for normalized band edges (Nyquist is 0.5).
pub const MAX_NORMALIZED_FREQ: f64 = 0.499;

/// `a[0]` values smaller than this are rejected as a normalization divisor.
pub const MIN_NORMALIZATION_DIVISOR: f64 = 1e-12;

/// Sample period below which the clock gate is meaningless.
pub const MIN_SAMPLE_PERIOD_US: u32 = 1;

/// First line of a capture export.
pub const EXPORT_START_MARKER: &str = "DATA_START";

/// Last line of a capture export.
pub const EXPORT_END_MARKER: &str = "DATA_END";

/// Standard DTMF row (low group) frequencies in Hz.
pub const DTMF_LOW_HZ: [f32; 4] = [697.0, 770.0, 852.0, 941.0];

/// Standard DTMF column (high group) frequencies in Hz.
pub const DTMF_HIGH_HZ: [f32; 4] = [1209.0, 1336.0, 1477.0, 1633.0];

/// Keypad symbol at `[low_index][high_index]`.
pub const DTMF_KEYPAD: [[char; 4]; 4] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

/// Frames per callback requested from the input device
pub const DEVICE_BUFFER_FRAMES: u32 = 256;
