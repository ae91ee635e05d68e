//! Audio decoding: arbitrary container bytes -> mono float32 @ 22050 Hz.

use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::SignalError;
use crate::model::AudioClip;

/// Audio extensions accepted by the ingest boundary.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["mp3", "wav", "m4a"];

/// Decode `bytes` (declared as `ext`) to mono float32 samples at 22,050 Hz.
pub fn decode_audio(bytes: &[u8], ext: &str) -> Result<AudioClip, SignalError> {
    if !ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
        return Err(SignalError::UnsupportedFormat(ext.to_string()));
    }

    let cursor = std::io::Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    hint.with_extension(ext);

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| SignalError::DecodeError(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or(SignalError::NoAudioTrack)?
        .clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| SignalError::DecodeError(e.to_string()))?;

    let track_id = track.id;
    let source_rate = track.codec_params.sample_rate.unwrap_or(AudioClip::SAMPLE_RATE);

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(_)) => break,
            Err(e) => return Err(SignalError::DecodeError(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(SignalError::DecodeError(e.to_string())),
        };

        samples.extend(downmix_to_mono(&decoded));
    }

    let resampled = if source_rate == AudioClip::SAMPLE_RATE {
        samples
    } else {
        linear_resample(&samples, source_rate, AudioClip::SAMPLE_RATE)
    };

    Ok(AudioClip::new(resampled))
}

/// Average all channels of a decoded buffer down to a single mono float channel.
fn downmix_to_mono(buffer: &AudioBufferRef) -> Vec<f32> {
    macro_rules! mono_from {
        ($buf:expr, $conv:expr) => {{
            let channels = $buf.spec().channels.count().max(1);
            let frames = $buf.frames();
            let mut out = Vec::with_capacity(frames);
            for frame in 0..frames {
                let mut sum = 0.0f32;
                for ch in 0..channels {
                    sum += $conv($buf.chan(ch)[frame]);
                }
                out.push(sum / channels as f32);
            }
            out
        }};
    }

    match buffer {
        AudioBufferRef::U8(buf) => mono_from!(buf, |s: u8| (s as f32 - 128.0) / 128.0),
        AudioBufferRef::U16(buf) => mono_from!(buf, |s: u16| (s as f32 - 32768.0) / 32768.0),
        AudioBufferRef::U24(buf) => {
            mono_from!(buf, |s: symphonia::core::sample::u24| (s.inner() as f32 - 8_388_608.0)
                / 8_388_608.0)
        }
        AudioBufferRef::U32(buf) => {
            mono_from!(buf, |s: u32| (s as f64 - 2_147_483_648.0) as f32 / 2_147_483_648.0)
        }
        AudioBufferRef::S8(buf) => mono_from!(buf, |s: i8| s as f32 / 128.0),
        AudioBufferRef::S16(buf) => mono_from!(buf, |s: i16| s as f32 / 32768.0),
        AudioBufferRef::S24(buf) => {
            mono_from!(buf, |s: symphonia::core::sample::i24| s.inner() as f32 / 8_388_608.0)
        }
        AudioBufferRef::S32(buf) => mono_from!(buf, |s: i32| s as f64 as f32 / 2_147_483_648.0),
        AudioBufferRef::F32(buf) => mono_from!(buf, |s: f32| s),
        AudioBufferRef::F64(buf) => mono_from!(buf, |s: f64| s as f32),
    }
}

/// Linear-interpolation resample, matching the approach used elsewhere in this
/// codebase for integer PCM but generalized to float samples.
fn linear_resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if samples.is_empty() || from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let new_len = (samples.len() as f64 / ratio) as usize;

    (0..new_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos.floor() as usize;
            let frac = pos.fract() as f32;

            if idx + 1 >= samples.len() {
                samples[idx.min(samples.len() - 1)]
            } else {
                let a = samples[idx];
                let b = samples[idx + 1];
                a + (b - a) * frac
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_extension() {
        let err = decode_audio(&[0u8; 8], "ogg").unwrap_err();
        assert!(matches!(err, SignalError::UnsupportedFormat(_)));
    }

    #[test]
    fn resample_preserves_duration_ratio() {
        let samples: Vec<f32> = (0..16000).map(|i| (i as f32 / 16000.0).sin()).collect();
        let resampled = linear_resample(&samples, 16000, 22050);
        let expected_len = (samples.len() as f64 * 22050.0 / 16000.0) as usize;
        assert!((resampled.len() as i64 - expected_len as i64).abs() <= 1);
    }

    #[test]
    fn resample_identity_when_rates_match() {
        let samples = vec![0.1f32, 0.2, 0.3];
        let resampled = linear_resample(&samples, 22050, 22050);
        assert_eq!(resampled, samples);
    }
}
