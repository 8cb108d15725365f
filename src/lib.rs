// NES APU VGM Player Library
// Cycle-accurate NES APU emulation driven by VGM command streams

// Public modules
pub mod apu;
pub mod audio;
pub mod config;
pub mod fixed;
pub mod reader;
pub mod vgm;

// Re-export main types for convenience
pub use apu::{Apu, Channels, Region};
pub use audio::{FadeOut, Resampler, ResamplerKind};
pub use config::{ConfigError, PlayerConfig};
pub use reader::{ByteReader, FileReader, SliceReader};
pub use vgm::{Gd3, Vgm, VgmError, VgmHeader};
