//! Frequency grouper (C2): collapse a dominant-frequency track into tolerant runs.

use crate::model::FrequencyRun;
use crate::signal::DominantFrequencyTrack;

/// Collapse consecutive, mutually-tolerant frequencies into runs of length >= 2.
///
/// Two adjacent frequencies belong to the same run when
/// `|f[i] - f[i-1]| <= f[i-1] * threshold_percent / 100` (strict `<=`).
pub fn group_runs(track: &DominantFrequencyTrack, threshold_percent: f64) -> Vec<FrequencyRun> {
    let freqs = &track.frequencies;
    if freqs.is_empty() {
        return Vec::new();
    }

    let mut runs = Vec::new();
    let mut start_idx = 0usize;
    let mut current: Vec<f64> = vec![freqs[0]];

    for i in 1..freqs.len() {
        let threshold = freqs[i - 1] * threshold_percent / 100.0;
        if (freqs[i] - freqs[i - 1]).abs() <= threshold {
            current.push(freqs[i]);
        } else {
            if current.len() >= 2 {
                runs.push(FrequencyRun {
                    start_time_s: start_time(track, start_idx),
                    frequencies: std::mem::take(&mut current),
                });
            }
            current = vec![freqs[i]];
            start_idx = i;
        }
    }

    if current.len() >= 2 {
        runs.push(FrequencyRun {
            start_time_s: start_time(track, start_idx),
            frequencies: current,
        });
    }

    runs
}

fn start_time(track: &DominantFrequencyTrack, start_idx: usize) -> f64 {
    start_idx as f64 * track.file_duration_s / track.frequencies.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(frequencies: Vec<f64>) -> DominantFrequencyTrack {
        DominantFrequencyTrack {
            frequencies,
            hop: 2205,
            sample_rate: 22050,
            file_duration_s: 10.0,
        }
    }

    #[test]
    fn merges_tolerant_runs_and_drops_singletons() {
        let t = track(vec![500.0, 505.0, 510.0, 900.0, 500.0, 505.0]);
        let runs = group_runs(&t, 2.0);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].frequencies, vec![500.0, 505.0, 510.0]);
        assert_eq!(runs[1].frequencies, vec![500.0, 505.0]);
    }

    #[test]
    fn every_adjacent_pair_within_tolerance() {
        let t = track(vec![100.0, 101.0, 102.5, 300.0, 301.0, 302.0, 303.0]);
        let runs = group_runs(&t, 2.0);
        for run in &runs {
            for w in run.frequencies.windows(2) {
                let threshold = w[0] * 2.0 / 100.0;
                assert!((w[1] - w[0]).abs() <= threshold + f64::EPSILON);
            }
        }
    }
}
