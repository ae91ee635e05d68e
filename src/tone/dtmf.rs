//! DTMF key-press detector (C5): low-row/high-column dual-tone decoding.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::model::{AudioClip, DetectedTone};

const ROWS: [f64; 4] = [697.0, 770.0, 852.0, 941.0];
const COLS: [f64; 4] = [1209.0, 1336.0, 1477.0, 1633.0];
const KEYPAD: [[char; 4]; 4] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

#[derive(Debug, Clone, Copy)]
pub struct DtmfConfig {
    pub window_ms: f64,
    pub freq_error_hz: f64,
    pub low_band_max_hz: f64,
    pub high_band_min_hz: f64,
    pub high_band_max_hz: f64,
    pub coalesce_span_s: f64,
    pub min_frame_members: usize,
}

impl Default for DtmfConfig {
    fn default() -> Self {
        Self {
            window_ms: 40.0,
            freq_error_hz: 20.0,
            low_band_max_hz: 1050.0,
            high_band_min_hz: 1100.0,
            high_band_max_hz: 2000.0,
            coalesce_span_s: 0.25,
            min_frame_members: 4,
        }
    }
}

fn nearest_within(freq: f64, table: &[f64; 4], tolerance: f64) -> Option<usize> {
    table
        .iter()
        .enumerate()
        .map(|(i, &f)| (i, (freq - f).abs()))
        .filter(|&(_, diff)| diff <= tolerance)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .map(|(i, _)| i)
}

fn peak_frequency_in_band(
    spectrum: &[Complex<f32>],
    bin_hz: f64,
    band_min_hz: f64,
    band_max_hz: f64,
) -> Option<f64> {
    let lo = (band_min_hz / bin_hz).floor() as usize;
    let hi = ((band_max_hz / bin_hz).ceil() as usize).min(spectrum.len() - 1);
    if lo > hi {
        return None;
    }

    spectrum[lo..=hi]
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.norm().partial_cmp(&b.norm()).unwrap())
        .map(|(i, _)| (lo + i) as f64 * bin_hz)
}

fn detect_frame_key(window: &[f32], sample_rate: u32, config: &DtmfConfig) -> Option<char> {
    let n = window.len();
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex<f32>> = window.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft.process(&mut buffer);

    let nyquist = n / 2 + 1;
    let bin_hz = f64::from(sample_rate) / n as f64;

    let row_freq = peak_frequency_in_band(&buffer[..nyquist], bin_hz, 0.0, config.low_band_max_hz)?;
    let col_freq = peak_frequency_in_band(
        &buffer[..nyquist],
        bin_hz,
        config.high_band_min_hz,
        config.high_band_max_hz,
    )?;

    let row_idx = nearest_within(row_freq, &ROWS, config.freq_error_hz)?;
    let col_idx = nearest_within(col_freq, &COLS, config.freq_error_hz)?;

    Some(KEYPAD[row_idx][col_idx])
}

/// Detect DTMF key presses across a clip, coalescing consecutive same-key
/// frames spanning at least `min_frame_members` windows into one event.
pub fn classify_dtmf(clip: &AudioClip, config: DtmfConfig) -> Vec<DetectedTone> {
    let window_len = ((clip.sample_rate as f64) * config.window_ms / 1000.0) as usize;
    if window_len == 0 || clip.samples.len() < window_len {
        return Vec::new();
    }

    let frame_count = clip.samples.len() / window_len;
    let frames: Vec<(f64, Option<char>)> = (0..frame_count)
        .map(|i| {
            let start = i * window_len;
            let window = &clip.samples[start..start + window_len];
            let time = start as f64 / f64::from(clip.sample_rate);
            (time, detect_frame_key(window, clip.sample_rate, &config))
        })
        .collect();

    let mut out = Vec::new();
    let mut i = 0;
    while i < frames.len() {
        let Some(key) = frames[i].1 else {
            i += 1;
            continue;
        };

        let group_start = i;
        let mut j = i + 1;
        while j < frames.len()
            && frames[j].1 == Some(key)
            && frames[j].0 - frames[group_start].0 <= config.coalesce_span_s
        {
            j += 1;
        }

        if j - group_start >= config.min_frame_members {
            out.push(DetectedTone::Dtmf {
                key,
                start_time_s: frames[group_start].0,
            });
        }

        i = j;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dtmf_clip(row_hz: f64, col_hz: f64, duration_s: f64) -> AudioClip {
        let sample_rate = AudioClip::SAMPLE_RATE;
        let n = (duration_s * f64::from(sample_rate)) as usize;
        let samples: Vec<f32> = (0..n)
            .map(|i| {
                let t = i as f64 / f64::from(sample_rate);
                let row = (2.0 * std::f64::consts::PI * row_hz * t).sin();
                let col = (2.0 * std::f64::consts::PI * col_hz * t).sin();
                ((row + col) * 0.5) as f32
            })
            .collect();
        AudioClip::new(samples)
    }

    #[test]
    fn detects_sustained_key_press() {
        // A press held across multiple coalescing spans re-fires once the
        // 250 ms span from the current group's start is exceeded, rather
        // than coalescing into a single record for the whole hold.
        let clip = dtmf_clip(697.0, 1209.0, 0.5);
        let tones = classify_dtmf(&clip, DtmfConfig::default());
        assert_eq!(tones.len(), 2);
        match &tones[0] {
            DetectedTone::Dtmf { key, start_time_s } => {
                assert_eq!(*key, '1');
                assert_eq!(*start_time_s, 0.0);
            }
            _ => panic!("expected Dtmf"),
        }
        match &tones[1] {
            DetectedTone::Dtmf { key, start_time_s } => {
                assert_eq!(*key, '1');
                assert_eq!(*start_time_s, 0.28);
            }
            _ => panic!("expected Dtmf"),
        }
    }

    #[test]
    fn rejects_too_brief_key_press() {
        let clip = dtmf_clip(941.0, 1477.0, 0.04 * 3.0);
        let tones = classify_dtmf(&clip, DtmfConfig::default());
        assert!(tones.is_empty());
    }

    #[test]
    fn silence_yields_no_keys() {
        let clip = AudioClip::new(vec![0.0f32; 22050]);
        let tones = classify_dtmf(&clip, DtmfConfig::default());
        assert!(tones.is_empty());
    }
}
