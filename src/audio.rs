//! Audio playback and spectral analysis.
//!
//! A preset selects a WAV asset; playback runs through cpal while an
//! analysis thread turns the tapped signal into byte spectra for the
//! deformation engine.

pub mod analysis;
pub mod playback;
pub mod system;

pub use playback::Preset;
pub use system::{AudioSystem, TapState};
