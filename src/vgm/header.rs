//! VGM 1.x container header
//!
//! The header is a fixed 256-byte block of little-endian fields at the
//! start of the file. Only the fields this player consumes are retained;
//! clocks for other sound chips are ignored (their commands are skipped
//! by the dispatcher).

use crate::reader::ByteReader;
use crate::vgm::VgmError;

/// "Vgm " identification word
const VGM_IDENT: u32 = 0x206D_6756;

/// Size of the header block read for parsing
const HEADER_SIZE: usize = 0x100;

/// Parsed VGM header fields
#[derive(Debug, Clone)]
pub struct VgmHeader {
    /// BCD version, e.g. 0x00000171 for 1.71
    pub version: u32,
    /// Relative offset to the GD3 tag, 0 if absent
    pub gd3_offset: u32,
    /// Total samples (sum of wait values) in 44100 Hz units
    pub total_samples: u32,
    /// Relative offset to the loop point, 0 if no loop
    pub loop_offset: u32,
    /// Samples in one loop pass, 0 if no loop
    pub loop_samples: u32,
    /// Recording rate, typically 50 (PAL) or 60 (NTSC)
    pub rate: u32,
    /// NES APU clock, typically 1789772; zero means no NES APU
    pub nes_apu_clk: u32,
    /// Relative offset to the command stream
    pub data_offset: u32,
}

impl VgmHeader {
    /// Read and validate the header
    ///
    /// Rejects files without the "Vgm " ident, with an EOF offset that
    /// does not match the actual size, or without an NES APU clock.
    pub fn parse(reader: &mut dyn ByteReader) -> Result<Self, VgmError> {
        let mut raw = [0u8; HEADER_SIZE];
        if reader.read(&mut raw, 0) != HEADER_SIZE {
            return Err(VgmError::InvalidHeader);
        }
        let field = |offset: usize| {
            u32::from_le_bytes([raw[offset], raw[offset + 1], raw[offset + 2], raw[offset + 3]])
        };

        if field(0x00) != VGM_IDENT {
            return Err(VgmError::InvalidHeader);
        }
        if field(0x04) as u64 + 4 != reader.size() {
            return Err(VgmError::InvalidHeader);
        }
        let header = Self {
            version: field(0x08),
            gd3_offset: field(0x14),
            total_samples: field(0x18),
            loop_offset: field(0x1C),
            loop_samples: field(0x20),
            rate: field(0x24),
            nes_apu_clk: field(0x84),
            data_offset: field(0x34),
        };
        if header.nes_apu_clk == 0 {
            return Err(VgmError::Unsupported);
        }
        Ok(header)
    }

    /// Recording rate with the 60 Hz default applied
    pub fn rate_or_default(&self) -> u32 {
        if self.rate == 0 {
            60
        } else {
            self.rate
        }
    }

    /// Absolute offset where the command stream begins
    ///
    /// Version 1.50 and up store a relative data offset; older files
    /// start at 0x40.
    pub fn data_start(&self) -> u32 {
        if self.version >= 0x0000_0150 && self.data_offset != 0 {
            self.data_offset + 0x34
        } else {
            0x40
        }
    }

    /// Absolute offset of the GD3 tag, if present
    pub fn gd3_start(&self) -> Option<u32> {
        if self.gd3_offset != 0 {
            Some(self.gd3_offset + 0x14)
        } else {
            None
        }
    }

    /// Absolute offset of the loop point, if the file declares a loop
    pub fn loop_start(&self) -> Option<u32> {
        if self.loop_offset != 0 && self.loop_samples != 0 {
            Some(self.loop_offset + 0x1C)
        } else {
            None
        }
    }
}
