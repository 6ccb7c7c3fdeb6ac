//! APU constants and lookup tables (NTSC)

/// Length counter lookup table, indexed by the 5-bit load value
pub const LENGTH_COUNTER_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30,
];

/// Pulse duty sequences, 8 steps each
pub const DUTY_PATTERNS: [[u8; 8]; 4] = [
    [0, 1, 0, 0, 0, 0, 0, 0], // 12.5%
    [0, 1, 1, 0, 0, 0, 0, 0], // 25%
    [0, 1, 1, 1, 1, 0, 0, 0], // 50%
    [1, 0, 0, 1, 1, 1, 1, 1], // 25% negated
];

/// 32-step triangle sequence: 15 down to 0, then back up
pub const TRIANGLE_SEQUENCE: [u8; 32] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12,
    13, 14, 15,
];

/// Noise timer periods in CPU cycles
pub const NOISE_PERIOD_TABLE: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

/// DMC output rates in CPU cycles per bit
pub const DMC_RATE_TABLE: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];

/// CPU cycles at which the 4-step sequencer fires steps 1-4
pub const FRAME_COUNTER_4_STEP_CYCLES: [u32; 4] = [7457, 14913, 22371, 29829];

/// Length of one 4-step sequence in CPU cycles
pub const FRAME_COUNTER_4_STEP_PERIOD: u32 = 29830;

/// CPU cycles at which the 5-step sequencer fires steps 1-5
pub const FRAME_COUNTER_5_STEP_CYCLES: [u32; 5] = [7457, 14913, 22371, 29829, 37281];

/// Length of one 5-step sequence in CPU cycles
pub const FRAME_COUNTER_5_STEP_PERIOD: u32 = 37282;
