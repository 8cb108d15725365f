//! VGM player front end
//!
//! Owns the byte reader and the APU it drives. Construction parses and
//! validates the container; `prepare_playback` builds the APU and
//! resampler; `get_samples` then interleaves command execution with
//! sample rendering until the stream ends.
//!
//! VGM wait commands are always expressed in 44100 Hz units regardless
//! of the host rate, so pending time is tracked as a fraction and
//! converted to host samples at the rendering boundary.

pub mod gd3;
pub mod header;

use crate::apu::{Apu, Channels, Region};
use crate::audio::{Resampler, ResamplerKind};
use crate::config::PlayerConfig;
use crate::reader::ByteReader;
pub use gd3::Gd3;
pub use header::VgmHeader;

/// Rate of the VGM timing grid; every wait command counts in these units
pub const VGM_SAMPLE_RATE: u32 = 44_100;

/// Fade length cap in seconds
const FADEOUT_SECONDS: u32 = 2;

/// Fatal playback errors
///
/// Header problems surface at construction; stream problems abort
/// `get_samples`. RAM block failures are not errors: the block is
/// dropped and the DMC plays silence.
#[derive(Debug)]
pub enum VgmError {
    /// Missing ident or the EOF offset disagrees with the file size
    InvalidHeader,
    /// No NES APU clock in the header
    Unsupported,
    /// The reader came up short inside the command stream
    TruncatedStream,
    /// A command byte outside the known opcode map
    UnknownCommand(u8),
    /// A data block declaring zero size
    BadDataBlock,
}

impl std::fmt::Display for VgmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VgmError::InvalidHeader => write!(f, "not a valid VGM file"),
            VgmError::Unsupported => write!(f, "VGM file has no NES APU data"),
            VgmError::TruncatedStream => write!(f, "VGM command stream is truncated"),
            VgmError::UnknownCommand(op) => write!(f, "unknown VGM command {:#04x}", op),
            VgmError::BadDataBlock => write!(f, "VGM data block has zero size"),
        }
    }
}

impl std::error::Error for VgmError {}

/// VGM player
///
/// Generic over the byte reader so files and in-memory streams share one
/// implementation.
pub struct Vgm<R: ByteReader> {
    reader: R,
    header: VgmHeader,
    region: Region,
    gd3: Gd3,
    /// Command stream state
    data_pos: u64,
    loops: u32,
    /// Playback state, present after `prepare_playback`
    apu: Option<Apu>,
    resampler: Option<Resampler>,
    sample_rate: u32,
    /// Wait time owed to the stream, in 1/44100ths of a host sample
    pending: u64,
    /// Host samples rendered so far
    played_samples: u64,
    /// Whole track length in host samples, loop pass included
    complete_samples: u64,
    /// Fade length in host samples; 0 when fading is off
    fadeout_samples: u32,
}

impl<R: ByteReader> Vgm<R> {
    /// Parse the container and build a player
    ///
    /// The reader stays owned by the player for the rest of playback.
    pub fn new(mut reader: R) -> Result<Self, VgmError> {
        let header = VgmHeader::parse(&mut reader)?;
        let gd3 = match header.gd3_start() {
            Some(offset) => Gd3::parse(&mut reader, offset),
            None => Gd3::default(),
        };
        let region = if header.rate_or_default() == 50 {
            Region::Pal
        } else {
            Region::Ntsc
        };
        let data_pos = header.data_start() as u64;
        let loops = if header.loop_start().is_some() { 1 } else { 0 };
        Ok(Self {
            reader,
            header,
            region,
            gd3,
            data_pos,
            loops,
            apu: None,
            resampler: None,
            sample_rate: VGM_SAMPLE_RATE,
            pending: 0,
            played_samples: 0,
            complete_samples: 0,
            fadeout_samples: 0,
        })
    }

    /// Track metadata
    pub fn gd3(&self) -> &Gd3 {
        &self.gd3
    }

    pub fn header(&self) -> &VgmHeader {
        &self.header
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Set up the APU and resampler for rendering at `sample_rate`
    ///
    /// With `fadeout`, the tail of the track (5% of its length, capped
    /// at two seconds) ramps to silence instead of stopping abruptly.
    pub fn prepare_playback(&mut self, sample_rate: u32, fadeout: bool) {
        self.prepare(sample_rate, ResamplerKind::default(), fadeout);
    }

    /// Set up playback from a [`PlayerConfig`]
    pub fn prepare_playback_with(&mut self, config: &PlayerConfig) {
        self.prepare(
            config.output.sample_rate,
            config.output.resampler,
            config.playback.fadeout,
        );
        if let Some(apu) = self.apu.as_mut() {
            apu.enable_channel(config.disabled_channels(), false);
        }
    }

    fn prepare(&mut self, sample_rate: u32, kind: ResamplerKind, fadeout: bool) {
        let clock = self.header.nes_apu_clk;
        self.apu = Some(Apu::new(self.region, clock));
        self.resampler = Some(Resampler::new(kind, clock, sample_rate));
        self.sample_rate = sample_rate;
        self.data_pos = self.header.data_start() as u64;
        self.loops = if self.header.loop_start().is_some() { 1 } else { 0 };
        self.pending = 0;
        self.played_samples = 0;
        let complete = self.header.total_samples as u64 + self.header.loop_samples as u64;
        self.complete_samples = complete * sample_rate as u64 / VGM_SAMPLE_RATE as u64;
        self.fadeout_samples = if fadeout {
            (self.complete_samples / 20).min((FADEOUT_SECONDS * sample_rate) as u64) as u32
        } else {
            0
        };
    }

    /// Mute or unmute channels on the underlying APU
    pub fn enable_channel(&mut self, mask: Channels, enable: bool) {
        if let Some(apu) = self.apu.as_mut() {
            apu.enable_channel(mask, enable);
        }
    }

    /// Render up to `buf.len()` host-rate samples
    ///
    /// Returns how many samples were produced; fewer than requested
    /// means the stream ended. Call `prepare_playback` first.
    pub fn get_samples(&mut self, buf: &mut [i16]) -> Result<usize, VgmError> {
        if self.apu.is_none() || self.resampler.is_none() {
            return Ok(0);
        }
        let mut filled = 0;
        while filled < buf.len() {
            let due = (self.pending / VGM_SAMPLE_RATE as u64) as usize;
            if due > 0 {
                let take = due.min(buf.len() - filled);
                if let (Some(apu), Some(resampler)) =
                    (self.apu.as_mut(), self.resampler.as_mut())
                {
                    resampler.fill(apu, &mut self.reader, &mut buf[filled..filled + take]);
                    self.pending -= take as u64 * VGM_SAMPLE_RATE as u64;
                    filled += take;
                    self.played_samples += take as u64;
                    if self.fadeout_samples > 0
                        && self.played_samples + self.fadeout_samples as u64
                            > self.complete_samples
                    {
                        apu.enable_fade(self.fadeout_samples);
                    }
                }
            } else if !self.exec()? {
                break;
            }
        }
        Ok(filled)
    }

    /// Execute commands until some wait time accrues
    ///
    /// Returns false when the stream has ended.
    fn exec(&mut self) -> Result<bool, VgmError> {
        loop {
            let op = self.read_u8(self.data_pos)?;
            match op {
                // One-operand commands for other chips, skipped
                0x30..=0x3F | 0x4F | 0x50 => {
                    self.data_pos += 2;
                }
                // Reserved; grew a second operand in version 1.61
                0x40..=0x4E => {
                    if self.header.version > 0x161 {
                        self.data_pos += 3;
                    } else {
                        self.data_pos += 2;
                    }
                }
                // Register writes for other chips, skipped
                0x51..=0x5F => {
                    self.data_pos += 3;
                }
                // Wait nn nn samples
                0x61 => {
                    let n = self.read_u16(self.data_pos + 1)?;
                    self.data_pos += 3;
                    self.wait(n as u32);
                    return Ok(true);
                }
                // Wait one 60 Hz frame
                0x62 => {
                    self.data_pos += 1;
                    self.wait(735);
                    return Ok(true);
                }
                // Wait one 50 Hz frame
                0x63 => {
                    self.data_pos += 1;
                    self.wait(882);
                    return Ok(true);
                }
                // End of stream; take the loop if one remains
                0x66 => {
                    if self.loops > 0 {
                        self.loops -= 1;
                        self.data_pos = self.header.loop_start().unwrap_or(0x40) as u64;
                    } else {
                        return Ok(false);
                    }
                }
                // Data block: 0x67 0x66 tt ss ss ss ss (data)
                0x67 => {
                    let size = self.read_u32(self.data_pos + 3)?;
                    if size == 0 {
                        return Err(VgmError::BadDataBlock);
                    }
                    let block_type = self.read_u8(self.data_pos + 2)?;
                    if block_type == 0xC2 && size >= 2 {
                        // NES APU RAM image: 2 bytes of target address,
                        // then the bytes themselves
                        let addr = self.read_u16(self.data_pos + 7)?;
                        let offset = self.data_pos + 9;
                        let len = (size - 2).min(u16::MAX as u32) as u16;
                        if let Some(apu) = self.apu.as_mut() {
                            apu.add_ram(&mut self.reader, offset, addr, len);
                        }
                    }
                    self.data_pos += 7 + size as u64;
                }
                // PCM RAM write, not applicable to the NES APU
                0x68 => {
                    self.data_pos += 12;
                }
                // Short wait of (n & 15) + 1 samples
                0x70..=0x7F => {
                    self.data_pos += 1;
                    self.wait((op & 0x0F) as u32 + 1);
                    return Ok(true);
                }
                // Sample-bank writes and DAC stream control, skipped
                0x80..=0x8F | 0x90..=0x95 => {
                    self.data_pos += 1;
                }
                // NES APU register write
                0xB4 => {
                    let reg = self.read_u8(self.data_pos + 1)?;
                    let value = self.read_u8(self.data_pos + 2)?;
                    self.data_pos += 3;
                    if let Some(apu) = self.apu.as_mut() {
                        apu.write_reg_with(&mut self.reader, reg, value);
                    }
                }
                // Two-operand commands for other chips, skipped
                0xA0..=0xB3 | 0xB5..=0xBF => {
                    self.data_pos += 3;
                }
                // Three-operand commands, skipped
                0xC0..=0xDF => {
                    self.data_pos += 4;
                }
                // Four-operand commands, skipped
                0xE0..=0xFF => {
                    self.data_pos += 5;
                }
                _ => return Err(VgmError::UnknownCommand(op)),
            }
        }
    }

    /// Credit `n` VGM wait units toward rendering
    fn wait(&mut self, n: u32) {
        self.pending += n as u64 * self.sample_rate as u64;
    }

    fn read_u8(&mut self, pos: u64) -> Result<u8, VgmError> {
        let mut raw = [0u8; 1];
        if self.reader.read(&mut raw, pos) != 1 {
            return Err(VgmError::TruncatedStream);
        }
        Ok(raw[0])
    }

    fn read_u16(&mut self, pos: u64) -> Result<u16, VgmError> {
        let mut raw = [0u8; 2];
        if self.reader.read(&mut raw, pos) != 2 {
            return Err(VgmError::TruncatedStream);
        }
        Ok(u16::from_le_bytes(raw))
    }

    fn read_u32(&mut self, pos: u64) -> Result<u32, VgmError> {
        let mut raw = [0u8; 4];
        if self.reader.read(&mut raw, pos) != 4 {
            return Err(VgmError::TruncatedStream);
        }
        Ok(u32::from_le_bytes(raw))
    }
}
