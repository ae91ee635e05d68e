pub mod audio_codec;

pub use audio_codec::{AudioCodec, FfmpegAudioCodec, LoudnormTarget};
