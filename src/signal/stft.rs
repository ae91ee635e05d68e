//! Short-time Fourier transform reduction: one dominant frequency bin per frame.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::model::AudioClip;

const N_FFT: usize = 2048;
const TIME_RESOLUTION_MS: u32 = 100;

/// A per-frame dominant-frequency track, plus enough bookkeeping to recover
/// each frame's start time.
#[derive(Debug, Clone)]
pub struct DominantFrequencyTrack {
    pub frequencies: Vec<f64>,
    pub hop: usize,
    pub sample_rate: u32,
    pub file_duration_s: f64,
}

impl DominantFrequencyTrack {
    /// Frame-time `t[k] = k * hop / sample_rate`, as specified.
    pub fn frame_time(&self, k: usize) -> f64 {
        (k * self.hop) as f64 / f64::from(self.sample_rate)
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

fn hann_window(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (n - 1) as f32).cos()))
        .collect()
}

/// Reduce `clip` to a dominant-frequency-per-frame track via STFT.
///
/// Frame count `F = floor((N - n_fft) / hop) + 1`; frames that don't fit a
/// full window are dropped, matching a non-overlap-padded STFT.
pub fn dominant_frequency_track(clip: &AudioClip) -> DominantFrequencyTrack {
    let n_fft = N_FFT;
    let hop = (clip.sample_rate as usize * TIME_RESOLUTION_MS as usize) / 1000;
    let samples = &clip.samples;

    if samples.len() < n_fft {
        return DominantFrequencyTrack {
            frequencies: Vec::new(),
            hop,
            sample_rate: clip.sample_rate,
            file_duration_s: clip.duration_s,
        };
    }

    let window = hann_window(n_fft);
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);

    let frame_count = (samples.len() - n_fft) / hop + 1;
    let nyquist = n_fft / 2 + 1;
    let bin_hz = f64::from(clip.sample_rate) / n_fft as f64;

    let mut frequencies = Vec::with_capacity(frame_count);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); n_fft];

    for k in 0..frame_count {
        let start = k * hop;
        for i in 0..n_fft {
            buffer[i] = Complex::new(samples[start + i] * window[i], 0.0);
        }
        fft.process(&mut buffer);

        let mut max_mag = f32::MIN;
        let mut max_bin = 0usize;
        for (bin, c) in buffer.iter().take(nyquist).enumerate() {
            let mag = c.norm();
            if mag > max_mag {
                max_mag = mag;
                max_bin = bin;
            }
        }

        let freq = (max_bin as f64 * bin_hz * 10.0).round() / 10.0;
        frequencies.push(freq);
    }

    DominantFrequencyTrack {
        frequencies,
        hop,
        sample_rate: clip.sample_rate,
        file_duration_s: clip.duration_s,
    }
}
