// Audio module - mixing, fade-out, and sample rate conversion
//
// This module provides:
// - Non-linear APU mixing in Q3.29 (accurate NES audio reproduction)
// - A 256-step fade-out ramp for ending looped tracks
// - Sample rate conversion from the CPU clock to 44.1/48 kHz hosts

pub mod fade;
pub mod mixer;
pub mod resampler;

pub use fade::FadeOut;
pub use resampler::{Resampler, ResamplerKind};
