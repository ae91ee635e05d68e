//! Hi-low alternating tone classifier (C4, part 2).
//!
//! Unlike Quick-Call and long tones, hi-low detection works directly on the
//! raw per-frame dominant-frequency track rather than tolerant runs: a siren
//! warble alternates between two frequencies too fast for the run grouper to
//! treat either one as stable.

use crate::model::DetectedTone;
use crate::signal::DominantFrequencyTrack;

#[derive(Debug, Clone, Copy)]
pub struct HiLowConfig {
    pub bucket_gap_s: f64,
    pub min_points: usize,
}

impl Default for HiLowConfig {
    fn default() -> Self {
        Self {
            bucket_gap_s: 0.35,
            min_points: 6,
        }
    }
}

/// Bucket consecutive frames into groups separated by gaps > `bucket_gap_s`,
/// then emit a `HiLowTone` for any group with enough points that alternates
/// `D[i] == D[i+2]` throughout.
pub fn classify_hi_low_tones(track: &DominantFrequencyTrack, config: HiLowConfig) -> Vec<DetectedTone> {
    if track.is_empty() {
        return Vec::new();
    }

    let points: Vec<(f64, f64)> = (0..track.len())
        .map(|k| (track.frame_time(k), track.frequencies[k]))
        .collect();

    let mut groups: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current = vec![points[0]];
    let mut current_time = points[0].0;

    for &(t, f) in &points[1..] {
        if t - current_time <= config.bucket_gap_s {
            current.push((t, f));
            current_time = t;
        } else {
            groups.push(std::mem::take(&mut current));
            current = vec![(t, f)];
            current_time = t;
        }
    }
    groups.push(current);

    groups
        .into_iter()
        .filter(|g| g.len() >= config.min_points)
        .filter(|g| g[0].1 != g[1].1)
        .filter(|g| (0..g.len() - 2).all(|i| g[i].1 == g[i + 2].1))
        .map(|g| DetectedTone::HiLowTone {
            detected: (g[0].1, g[1].1),
            start_time_s: g[0].0,
            end_time_s: g.last().unwrap().0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(frequencies: Vec<f64>) -> DominantFrequencyTrack {
        DominantFrequencyTrack {
            frequencies,
            hop: 2205,
            sample_rate: 22050,
            file_duration_s: frequencies_duration(&frequencies),
        }
    }

    fn frequencies_duration(f: &[f64]) -> f64 {
        f.len() as f64 * 0.1
    }

    #[test]
    fn emits_hi_low_for_alternating_pattern() {
        let freqs = vec![500.0, 700.0, 500.0, 700.0, 500.0, 700.0, 500.0];
        let t = track(freqs);
        let out = classify_hi_low_tones(&t, HiLowConfig::default());
        assert_eq!(out.len(), 1);
        match &out[0] {
            DetectedTone::HiLowTone {
                detected,
                start_time_s,
                end_time_s,
            } => {
                assert_eq!(*detected, (500.0, 700.0));
                assert_eq!(*start_time_s, 0.0);
                assert!(*end_time_s > *start_time_s);
            }
            _ => panic!("expected HiLowTone"),
        }
    }

    #[test]
    fn rejects_group_too_short() {
        let freqs = vec![500.0, 700.0, 500.0, 700.0];
        let t = track(freqs);
        let out = classify_hi_low_tones(&t, HiLowConfig::default());
        assert!(out.is_empty());
    }

    #[test]
    fn rejects_non_alternating_pattern() {
        let freqs = vec![500.0, 700.0, 500.0, 900.0, 500.0, 700.0];
        let t = track(freqs);
        let out = classify_hi_low_tones(&t, HiLowConfig::default());
        assert!(out.is_empty());
    }

    #[test]
    fn splits_groups_on_large_time_gap() {
        let mut track_frames = vec![500.0, 700.0, 500.0, 700.0, 500.0, 700.0];
        track_frames.extend(vec![0.0; 40]);
        track_frames.extend(vec![500.0, 700.0, 500.0, 700.0, 500.0, 700.0]);
        let t = track(track_frames);
        let out = classify_hi_low_tones(&t, HiLowConfig::default());
        assert_eq!(out.len(), 2);
    }
}
