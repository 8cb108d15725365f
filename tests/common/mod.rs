// Common test utilities for VGM playback tests
//
// Builds syntactically valid VGM byte streams in memory so scenarios can
// drive the full pipeline (header parse, command dispatch, APU, resampler)
// without fixture files.

#![allow(dead_code)]

/// NTSC NES APU clock used by all built streams
pub const NTSC_CLOCK: u32 = 1_789_772;

/// Offset where built streams place the command data
const DATA_START: u32 = 0x100;

/// In-memory VGM stream builder
///
/// Produces a version 1.61 container with an NES APU clock and the
/// commands pushed through the helper methods. The terminating 0x66 is
/// explicit (`end`) so truncated-stream cases can be built too.
pub struct VgmBuilder {
    version: u32,
    rate: u32,
    clock: u32,
    total_samples: u32,
    loop_samples: u32,
    commands: Vec<u8>,
    loop_mark: Option<u32>,
    gd3: Option<Vec<u8>>,
}

impl VgmBuilder {
    pub fn new() -> Self {
        Self {
            version: 0x0000_0161,
            rate: 60,
            clock: NTSC_CLOCK,
            total_samples: 0,
            loop_samples: 0,
            commands: Vec::new(),
            loop_mark: None,
            gd3: None,
        }
    }

    pub fn rate(&mut self, rate: u32) -> &mut Self {
        self.rate = rate;
        self
    }

    pub fn total_samples(&mut self, samples: u32) -> &mut Self {
        self.total_samples = samples;
        self
    }

    pub fn loop_samples(&mut self, samples: u32) -> &mut Self {
        self.loop_samples = samples;
        self
    }

    /// APU register write command (0xB4)
    pub fn write_reg(&mut self, reg: u8, value: u8) -> &mut Self {
        self.commands.extend_from_slice(&[0xB4, reg, value]);
        self
    }

    /// Wait command (0x61) for `n` samples at 44100 Hz
    pub fn wait(&mut self, n: u16) -> &mut Self {
        self.commands.push(0x61);
        self.commands.extend_from_slice(&n.to_le_bytes());
        self
    }

    /// NES APU RAM data block (0x67, type 0xC2)
    pub fn ram_block(&mut self, addr: u16, data: &[u8]) -> &mut Self {
        let size = data.len() as u32 + 2;
        self.commands.extend_from_slice(&[0x67, 0x66, 0xC2]);
        self.commands.extend_from_slice(&size.to_le_bytes());
        self.commands.extend_from_slice(&addr.to_le_bytes());
        self.commands.extend_from_slice(data);
        self
    }

    /// Mark the loop point at the current command position
    pub fn mark_loop(&mut self) -> &mut Self {
        self.loop_mark = Some(DATA_START + self.commands.len() as u32);
        self
    }

    /// End-of-stream command (0x66)
    pub fn end(&mut self) -> &mut Self {
        self.commands.push(0x66);
        self
    }

    /// Arbitrary command bytes, for malformed-stream cases
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.commands.extend_from_slice(bytes);
        self
    }

    /// Attach a GD3 tag with the eleven standard strings
    pub fn gd3(&mut self, strings: [&str; 11]) -> &mut Self {
        let mut body = Vec::new();
        for s in strings {
            for unit in s.encode_utf16() {
                body.extend_from_slice(&unit.to_le_bytes());
            }
            body.extend_from_slice(&[0, 0]);
        }
        let mut tag = Vec::new();
        tag.extend_from_slice(&0x2033_6447u32.to_le_bytes()); // "Gd3 "
        tag.extend_from_slice(&0x0000_0100u32.to_le_bytes());
        tag.extend_from_slice(&(body.len() as u32).to_le_bytes());
        tag.extend_from_slice(&body);
        self.gd3 = Some(tag);
        self
    }

    /// Assemble the container bytes
    pub fn build(&self) -> Vec<u8> {
        let gd3_start = DATA_START + self.commands.len() as u32;
        let total_len = gd3_start + self.gd3.as_ref().map_or(0, |g| g.len() as u32);

        let mut out = vec![0u8; DATA_START as usize];
        let mut field = |offset: usize, value: u32| {
            out[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        };
        field(0x00, 0x206D_6756); // "Vgm "
        field(0x04, total_len - 4);
        field(0x08, self.version);
        if self.gd3.is_some() {
            field(0x14, gd3_start - 0x14);
        }
        field(0x18, self.total_samples);
        if let Some(mark) = self.loop_mark {
            field(0x1C, mark - 0x1C);
        }
        field(0x20, self.loop_samples);
        field(0x24, self.rate);
        field(0x34, DATA_START - 0x34);
        field(0x84, self.clock);

        out.extend_from_slice(&self.commands);
        if let Some(gd3) = &self.gd3 {
            out.extend_from_slice(gd3);
        }
        out
    }
}

impl Default for VgmBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Peak amplitude above the mixer zero point within a sample window
pub fn peak_amplitude(samples: &[i16]) -> i32 {
    samples
        .iter()
        .map(|&s| s as i32 + 32_768)
        .max()
        .unwrap_or(0)
}

/// Count threshold crossings in both directions
pub fn count_crossings(samples: &[i16], threshold: i16) -> usize {
    samples
        .windows(2)
        .filter(|pair| {
            (pair[0] < threshold && pair[1] >= threshold)
                || (pair[0] >= threshold && pair[1] < threshold)
        })
        .count()
}
