//! Pitch sweep unit for the pulse channels

/// Sweep unit
///
/// Retunes the pulse timer period on half frames and tracks the two
/// muting conditions: a current period below 8, or a sweep target above
/// $7FF. The target is kept in 32-bit arithmetic because it legitimately
/// overshoots the 11-bit period range; overshooting is the muting
/// trigger, not an error.
#[derive(Debug, Clone)]
pub struct Sweep {
    /// Sweep enabled flag
    enabled: bool,
    /// Divider period, 0-7
    period: u8,
    /// Divider counter
    divider: u8,
    /// Sweep downward instead of upward
    negate: bool,
    /// Change shift amount, 0-7
    shift: u8,
    /// Divider reload flag, set by a sweep register write
    reload: bool,
    /// Last computed target period
    target: u32,
    /// Whether the channel is muted by period or target
    muted: bool,
    /// Pulse 1 subtracts one extra step on negated sweeps
    ones_complement: bool,
}

impl Sweep {
    pub fn new(ones_complement: bool) -> Self {
        Self {
            enabled: false,
            period: 0,
            divider: 0,
            negate: false,
            shift: 0,
            reload: false,
            target: 0,
            muted: true,
            ones_complement,
        }
    }

    /// Restore the power-on state; the channel starts muted because the
    /// timer period starts below 8
    pub fn reset(&mut self) {
        *self = Self::new(self.ones_complement);
    }

    /// Load from the sweep register (bits EPPP NSSS)
    pub fn write(&mut self, data: u8) {
        self.enabled = (data & 0x80) != 0;
        self.period = (data >> 4) & 0x07;
        self.negate = (data & 0x08) != 0;
        self.shift = data & 0x07;
        self.reload = true;
    }

    /// Target period the next sweep clock would produce
    pub fn target_for(&self, timer_period: u16) -> u32 {
        let period = timer_period as u32;
        let change = period >> self.shift;
        if self.negate {
            if self.ones_complement {
                period.wrapping_sub(change).wrapping_sub(1)
            } else {
                period.wrapping_sub(change)
            }
        } else {
            period + change
        }
    }

    /// Re-derive the target and mute state after a timer period write
    ///
    /// Whenever the current period changes the target period changes with
    /// it, so a $4002/$4003 write refreshes the muting decision.
    pub fn period_updated(&mut self, timer_period: u16) {
        self.target = timer_period as u32;
        self.muted = timer_period < 8 || self.target > 0x7FF;
    }

    /// Half-frame clock; retunes `timer_period` when an active sweep is
    /// not muting the channel
    pub fn clock(&mut self, timer_period: &mut u16) {
        if self.reload {
            self.divider = self.period;
            self.reload = false;
        } else if self.divider > 0 {
            self.divider -= 1;
        } else if self.enabled && self.shift > 0 {
            self.target = self.target_for(*timer_period);
            if !self.muted {
                // A muting sweep leaves the current period unchanged
                *timer_period = self.target as u16;
            }
            self.muted = *timer_period < 8 || self.target > 0x7FF;
            self.divider = self.period;
        }
    }

    /// Whether the sweep or timer is muting the channel
    pub fn muted(&self) -> bool {
        self.muted
    }

    /// Target period from the most recent write or sweep clock
    pub fn target(&self) -> u32 {
        self.target
    }
}
