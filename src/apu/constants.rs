//! APU lookup tables
//!
//! Hardware tables shared by the channel state machines. Period tables
//! exist in NTSC and PAL flavors and are selected by the region the VGM
//! header declares.

/// Length counter lookup table
/// Maps the 5-bit length counter load value to the actual counter value
pub const LENGTH_COUNTER_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30,
];

/// Duty cycle waveforms for the pulse channels
///
/// One row per duty setting. The pulse sequencer steps downward through a
/// row, so entry 0 is the last step of the waveform.
pub const PULSE_WAVEFORM_TABLE: [[u8; 8]; 4] = [
    [0, 0, 0, 0, 0, 0, 0, 1], // 12.5%
    [0, 0, 0, 0, 0, 0, 1, 1], // 25%
    [0, 0, 0, 0, 1, 1, 1, 1], // 50%
    [1, 1, 1, 1, 1, 1, 0, 0], // 25% negated
];

/// Triangle waveform, stepped upward modulo 32
pub const TRIANGLE_WAVEFORM_TABLE: [u8; 32] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11,
    12, 13, 14, 15,
];

/// Index into the triangle waveform whose output level is zero
///
/// The sequencer powers on here so an untouched channel sits at the
/// mixer zero point instead of holding a DC offset.
pub const TRIANGLE_SEQUENCER_SILENT: u32 = 15;

/// Noise channel timer periods, NTSC
pub const NOISE_TIMER_PERIOD_NTSC: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

/// Noise channel timer periods, PAL
pub const NOISE_TIMER_PERIOD_PAL: [u16; 16] = [
    4, 8, 14, 30, 60, 88, 118, 148, 188, 236, 354, 472, 708, 944, 1890, 3778,
];

/// DMC channel timer periods, NTSC
pub const DMC_TIMER_PERIOD_NTSC: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];

/// DMC channel timer periods, PAL
pub const DMC_TIMER_PERIOD_PAL: [u16; 16] = [
    398, 354, 316, 298, 276, 236, 210, 198, 176, 148, 132, 118, 98, 78, 66, 50,
];
