//! Core types for the feed pipeline.
//!
//! - [`StillFrame`] is the fundamental unit flowing through the system: one
//!   complete JPEG image extracted from the byte stream, markers included.
//! - [`Artifact`] is a downloadable result produced by capture or record.
//! - [`SampleRate`] controls how often the recorder samples the surface.

mod artifact;
mod frame;
mod sample_rate;

pub use artifact::Artifact;
pub use frame::StillFrame;
pub use sample_rate::SampleRate;

/// JPEG start-of-image marker. The first two bytes of every frame.
pub const SOI: [u8; 2] = [0xFF, 0xD8];

/// JPEG end-of-image marker. The last two bytes of every frame.
pub const EOI: [u8; 2] = [0xFF, 0xD9];
