//! Signal frontend (C1): decode, resample, and reduce to a dominant-frequency track.

mod frontend;
mod stft;

pub use frontend::decode_audio;
pub use stft::{dominant_frequency_track, DominantFrequencyTrack};
