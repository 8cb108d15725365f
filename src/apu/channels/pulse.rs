//! Pulse wave channel
//!
//! Signal pipeline:
//!
//! ```text
//!                  Sweep -----> Timer
//!                    |            |
//!                    |            v
//!                    |        Sequencer   Length Counter
//!                    |            |             |
//!                    v            v             v
//! Envelope -------> Gate -----> Gate -------> Gate ---> (to mixer)
//! ```

use crate::apu::components::{Envelope, FrameTick, LengthCounter, Sweep, Timer};
use crate::apu::constants::PULSE_WAVEFORM_TABLE;

/// Pulse wave channel (used for both Pulse 1 and Pulse 2)
#[derive(Debug, Clone)]
pub struct PulseChannel {
    /// Enabled flag (from $4015)
    enabled: bool,
    /// Duty setting, 0-3
    duty: u8,
    /// Sequencer position, stepping downward through the waveform row
    seq_index: u32,
    /// Timer period, 11 bits
    timer_period: u16,
    timer: Timer,
    envelope: Envelope,
    sweep: Sweep,
    length: LengthCounter,
}

impl PulseChannel {
    /// `ones_complement` selects the Pulse 1 negate behavior
    pub fn new(ones_complement: bool) -> Self {
        let mut pulse = Self {
            enabled: false,
            duty: 0,
            seq_index: 0,
            timer_period: 0,
            timer: Timer::new(),
            envelope: Envelope::new(),
            sweep: Sweep::new(ones_complement),
            length: LengthCounter::new(),
        };
        pulse.reset();
        pulse
    }

    /// Restore the power-on state
    ///
    /// The channel powers on enabled: many VGM rips never touch $4015,
    /// relying on the hardware default.
    pub fn reset(&mut self) {
        self.enabled = true;
        self.duty = 0;
        self.seq_index = 0;
        self.timer_period = 0;
        self.timer.reset();
        self.envelope.reset();
        self.sweep.reset();
        self.length.reset();
    }

    /// $4000/$4004: DDLC VVVV
    pub fn write_control(&mut self, data: u8) {
        self.duty = (data >> 6) & 0x03;
        self.length.set_halt((data & 0x20) != 0);
        self.envelope.write(data);
    }

    /// $4001/$4005: EPPP NSSS
    pub fn write_sweep(&mut self, data: u8) {
        self.sweep.write(data);
    }

    /// $4002/$4006: timer period low byte
    pub fn write_timer_low(&mut self, data: u8) {
        self.timer_period = (self.timer_period & 0xFF00) | data as u16;
        self.sweep.period_updated(self.timer_period);
    }

    /// $4003/$4007: length load and timer period high bits
    ///
    /// Restarts the envelope and the waveform sequence. The timer divider
    /// itself is not reset.
    pub fn write_length_timer_high(&mut self, data: u8) {
        self.timer_period = (self.timer_period & 0x00FF) | ((data as u16 & 0x07) << 8);
        self.sweep.period_updated(self.timer_period);
        self.length.load(data >> 3);
        self.envelope.restart();
        self.seq_index = 0;
    }

    /// $4015 enable bit; disabling zeroes the length counter
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length.silence();
        }
    }

    /// Advance by `cycles` CPU cycles and return the channel output, 0-15
    pub fn run(&mut self, cycles: u32, tick: FrameTick) -> u8 {
        if tick.quarter {
            self.envelope.clock();
        }
        if tick.half {
            self.sweep.clock(&mut self.timer_period);
        }
        // The timer clocks once every other CPU cycle, so the sequencer
        // steps every 2 * (period + 1) cycles.
        if !self.sweep.muted() {
            let period = ((self.timer_period as u32) + 1) << 1;
            let fires = self.timer.run(period, cycles);
            self.seq_index = (self.seq_index + 8 - fires % 8) % 8;
        }
        if tick.half {
            self.length.clock();
        }

        if !self.enabled {
            return 0;
        }
        if !self.length.is_active() {
            return 0;
        }
        if self.sweep.muted() {
            return 0;
        }
        if PULSE_WAVEFORM_TABLE[self.duty as usize][self.seq_index as usize] == 0 {
            return 0;
        }
        self.envelope.volume()
    }

    /// Sweep target from the most recent period write or sweep clock
    pub fn sweep_target(&self) -> u32 {
        self.sweep.target()
    }

    pub fn timer_period(&self) -> u16 {
        self.timer_period
    }

    pub fn is_muted_by_sweep(&self) -> bool {
        self.sweep.muted()
    }

    pub fn length_value(&self) -> u8 {
        self.length.value()
    }
}
