// APU module - Audio Processing Unit emulation (Ricoh 2A03)
//
// The APU is driven in batches: the resampler asks for one host sample's
// worth of CPU cycles at a time, and `run_and_sample` advances every
// channel by that many cycles before mixing.
//
// ## Register Map
//
// Registers are indexed 0x00-0x17, mirroring their $4000-$4017 bus
// addresses.
//
// ### Pulse 1 / Pulse 2 ($00-$03 / $04-$07)
// | Register | Bits      | Description                           |
// |----------|-----------|---------------------------------------|
// | $00/$04  | DDLC VVVV | Duty, loop/halt, constant, volume     |
// | $01/$05  | EPPP NSSS | Sweep enable, period, negate, shift   |
// | $02/$06  | TTTT TTTT | Timer period low byte                 |
// | $03/$07  | LLLL LHHH | Length load, timer period high bits   |
//
// ### Triangle ($08-$0B)
// | Register | Bits      | Description                           |
// |----------|-----------|---------------------------------------|
// | $08      | CRRR RRRR | Linear counter control and period     |
// | $0A      | LLLL LLLL | Timer period low byte                 |
// | $0B      | LLLL LHHH | Length load, timer period high bits   |
//
// ### Noise ($0C-$0F)
// | Register | Bits      | Description                           |
// |----------|-----------|---------------------------------------|
// | $0C      | --LC VVVV | Loop/halt, constant, volume           |
// | $0E      | M--- PPPP | Mode, period table index              |
// | $0F      | LLLL L--- | Length load                           |
//
// ### DMC ($10-$13)
// | Register | Bits      | Description                           |
// |----------|-----------|---------------------------------------|
// | $10      | IL-- RRRR | Loop flag, rate table index           |
// | $11      | -DDD DDDD | Direct load of the output level       |
// | $12      | AAAA AAAA | Sample address = $C000 + A * 64       |
// | $13      | LLLL LLLL | Sample length = L * 16 + 1            |
//
// ### Control ($15, $17)
// | Register | Bits      | Description                           |
// |----------|-----------|---------------------------------------|
// | $15      | ---D NT21 | Channel enables                       |
// | $17      | MI-- ---- | Frame counter mode                    |

pub mod channels;
pub mod components;
pub mod constants;
pub mod ram;

use bitflags::bitflags;

use crate::audio::mixer;
use crate::audio::FadeOut;
use crate::fixed::q29_to_sample;
use crate::reader::ByteReader;
use channels::{DmcChannel, NoiseChannel, PulseChannel, TriangleChannel};
use components::FrameCounter;
use ram::SampleRam;

/// Video standard the recording targets; selects the noise and DMC
/// period tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Ntsc,
    Pal,
}

bitflags! {
    /// Channel selection mask for [`Apu::enable_channel`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Channels: u8 {
        const PULSE1 = 0x01;
        const PULSE2 = 0x02;
        const TRIANGLE = 0x04;
        const NOISE = 0x08;
        const DMC = 0x10;
    }
}

/// APU instance
///
/// Owns the five channel state machines, the frame sequencer, the DPCM
/// sample RAM, and the fade-out unit. The backing byte reader is borrowed
/// per call; the VGM front end owns it along with this struct.
pub struct Apu {
    region: Region,
    clock_rate: u32,
    frame_counter: FrameCounter,
    pulse1: PulseChannel,
    pulse2: PulseChannel,
    triangle: TriangleChannel,
    noise: NoiseChannel,
    dmc: DmcChannel,
    ram: SampleRam,
    fade: FadeOut,
    /// Channels muted by the host (listening controls, not hardware state)
    masked: Channels,
}

impl Apu {
    /// Create an APU for the given region and CPU clock rate
    /// (typically 1789772 Hz NTSC or 1662607 Hz PAL)
    pub fn new(region: Region, clock_rate: u32) -> Self {
        Self {
            region,
            clock_rate,
            frame_counter: FrameCounter::new(clock_rate),
            pulse1: PulseChannel::new(true),
            pulse2: PulseChannel::new(false),
            triangle: TriangleChannel::new(),
            noise: NoiseChannel::new(),
            dmc: DmcChannel::new(),
            ram: SampleRam::new(),
            fade: FadeOut::new(),
            masked: Channels::empty(),
        }
    }

    /// Restore the power-on state
    ///
    /// Registered sample RAM blocks survive a reset; they describe file
    /// contents, not chip state.
    pub fn reset(&mut self) {
        self.frame_counter.reset();
        self.pulse1.reset();
        self.pulse2.reset();
        self.triangle.reset();
        self.noise.reset();
        self.dmc.reset();
        self.fade.reset();
        self.masked = Channels::empty();
    }

    /// CPU clock rate this instance was created with
    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Write an APU register
    ///
    /// `reg` is the index 0x00-0x17; unknown indices are ignored. Register
    /// writes never fail.
    pub fn write_reg(&mut self, reg: u8, value: u8) {
        self.write_reg_with(&mut crate::reader::SliceReader::new(&[]), reg, value)
    }

    /// Write an APU register, with reader access for DMC restarts
    ///
    /// A $15 write that enables the DMC may fetch the first sample byte
    /// immediately, which needs the backing reader.
    pub fn write_reg_with(&mut self, reader: &mut dyn ByteReader, reg: u8, value: u8) {
        match reg {
            // Pulse 1
            0x00 => self.pulse1.write_control(value),
            0x01 => self.pulse1.write_sweep(value),
            0x02 => self.pulse1.write_timer_low(value),
            0x03 => self.pulse1.write_length_timer_high(value),
            // Pulse 2
            0x04 => self.pulse2.write_control(value),
            0x05 => self.pulse2.write_sweep(value),
            0x06 => self.pulse2.write_timer_low(value),
            0x07 => self.pulse2.write_length_timer_high(value),
            // Triangle
            0x08 => self.triangle.write_linear(value),
            0x0A => self.triangle.write_timer_low(value),
            0x0B => self.triangle.write_length_timer_high(value),
            // Noise
            0x0C => self.noise.write_control(value),
            0x0E => self.noise.write_mode_period(value, self.region),
            0x0F => self.noise.write_length(value),
            // DMC
            0x10 => self.dmc.write_control(value, self.region),
            0x11 => self.dmc.write_direct_load(value),
            0x12 => self.dmc.write_sample_addr(value),
            0x13 => self.dmc.write_sample_len(value),
            // Channel enables
            0x15 => {
                self.pulse1.set_enabled(value & 0x01 != 0);
                self.pulse2.set_enabled(value & 0x02 != 0);
                self.triangle.set_enabled(value & 0x04 != 0);
                self.noise.set_enabled(value & 0x08 != 0);
                self.dmc
                    .set_enabled(value & 0x10 != 0, &mut self.ram, reader);
            }
            // Frame counter
            0x17 => self.frame_counter.write_control(value),
            _ => {}
        }
    }

    /// Register a DPCM sample RAM block backed by the reader
    pub fn add_ram(&mut self, reader: &mut dyn ByteReader, offset: u64, addr: u16, len: u16) {
        self.ram.add_block(reader, offset, addr, len);
    }

    /// Mute or unmute the channels in `mask`
    ///
    /// A muted channel keeps running; only its mixer contribution is
    /// zeroed.
    pub fn enable_channel(&mut self, mask: Channels, enable: bool) {
        if enable {
            self.masked.remove(mask);
        } else {
            self.masked.insert(mask);
        }
    }

    /// Begin fading to silence over the next `samples` output samples
    pub fn enable_fade(&mut self, samples: u32) {
        self.fade.enable(samples);
    }

    /// Current DMC output level, 0-127
    pub fn dmc_output(&self) -> u8 {
        self.dmc.output()
    }

    /// Advance every channel by `cycles` CPU cycles and mix one sample
    pub fn run_and_sample(&mut self, reader: &mut dyn ByteReader, cycles: u32) -> i16 {
        let tick = self.frame_counter.run(cycles);
        let mut p1 = self.pulse1.run(cycles, tick);
        let mut p2 = self.pulse2.run(cycles, tick);
        let mut tr = self.triangle.run(cycles, tick);
        let mut ns = self.noise.run(cycles, tick);
        let mut dm = self.dmc.run(cycles, &mut self.ram, reader);
        if self.masked.contains(Channels::PULSE1) {
            p1 = 0;
        }
        if self.masked.contains(Channels::PULSE2) {
            p2 = 0;
        }
        if self.masked.contains(Channels::TRIANGLE) {
            tr = 0;
        }
        if self.masked.contains(Channels::NOISE) {
            ns = 0;
        }
        if self.masked.contains(Channels::DMC) {
            dm = 0;
        }
        let mixed = mixer::mix(p1, p2, tr, ns, dm);
        q29_to_sample(self.fade.apply(mixed))
    }
}
