//! Frame counter driving the low-frequency channel clocks
//!
//! A 240 Hz divider distributes quarter-frame ticks (envelopes, linear
//! counter) and half-frame ticks (length counters, sweeps) to the
//! channels. The 240 Hz period is not a whole number of CPU cycles
//! (7457.38 cycles at the NTSC clock), so the step position is tracked
//! in Q16.16.

use crate::fixed::{int_to_q16, q16_ratio, Q16};

/// Sequencer mode, selected by bit 7 of $4017
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    /// 4-step sequence (default)
    FourStep,
    /// 5-step sequence
    FiveStep,
}

/// Ticks produced by one frame counter advance
///
/// Channels consume these in the same batch that produced them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTick {
    /// Clock envelopes and the linear counter
    pub quarter: bool,
    /// Clock length counters and sweep units
    pub half: bool,
}

/// Frame counter
#[derive(Debug, Clone)]
pub struct FrameCounter {
    mode: FrameMode,
    /// Current step, wrapping after 4 or 5 depending on mode
    step: u8,
    /// Clock every unit on the next advance (armed by a 5-step $4017 write)
    force_clock: bool,
    /// Cycle accumulator in Q16.16
    accumulator: Q16,
    /// 240 Hz period in Q16.16 CPU cycles
    period: Q16,
}

impl FrameCounter {
    pub fn new(clock_rate: u32) -> Self {
        Self {
            mode: FrameMode::FourStep,
            step: 0,
            force_clock: false,
            accumulator: 0,
            period: q16_ratio(clock_rate, 240),
        }
    }

    /// Restore the power-on state
    pub fn reset(&mut self) {
        self.mode = FrameMode::FourStep;
        self.step = 0;
        self.force_clock = false;
        self.accumulator = 0;
    }

    /// Write to the frame counter register ($4017)
    ///
    /// Resets the sequence position. With the mode bit set, every
    /// controlled unit is clocked once on the next advance.
    pub fn write_control(&mut self, value: u8) {
        self.mode = if (value & 0x80) != 0 {
            FrameMode::FiveStep
        } else {
            FrameMode::FourStep
        };
        self.step = 0;
        self.accumulator = 0;
        self.force_clock = self.mode == FrameMode::FiveStep;
    }

    /// Advance by `cycles` CPU cycles
    pub fn run(&mut self, cycles: u32) -> FrameTick {
        let mut tick = if self.force_clock {
            self.force_clock = false;
            FrameTick {
                quarter: true,
                half: true,
            }
        } else {
            FrameTick::default()
        };

        self.accumulator += int_to_q16(cycles as i32);
        while self.accumulator >= self.period {
            self.accumulator -= self.period;
            self.step += 1;
            match self.mode {
                FrameMode::FourStep => match self.step {
                    1 | 3 => tick.quarter = true,
                    2 => {
                        tick.quarter = true;
                        tick.half = true;
                    }
                    4 => {
                        tick.quarter = true;
                        tick.half = true;
                        self.step = 0;
                    }
                    _ => {}
                },
                FrameMode::FiveStep => match self.step {
                    1 | 3 => tick.quarter = true,
                    2 => {
                        tick.quarter = true;
                        tick.half = true;
                    }
                    4 => {}
                    5 => {
                        tick.quarter = true;
                        tick.half = true;
                        self.step = 0;
                    }
                    _ => {}
                },
            }
        }
        tick
    }

    pub fn mode(&self) -> FrameMode {
        self.mode
    }
}
