//! Long-tone classifier (C4, part 1): single sustained frequencies used as all-calls.

use crate::model::{DetectedTone, FrequencyRun};

#[derive(Debug, Clone, Copy)]
pub struct LongToneConfig {
    pub min_run_frames: usize,
    pub min_frequency_hz: f64,
}

impl Default for LongToneConfig {
    fn default() -> Self {
        Self {
            min_run_frames: 15,
            min_frequency_hz: 250.0,
        }
    }
}

/// Emit a `LongTone` per run that is long enough, loud-frequency enough, not
/// already claimed by a Quick-Call tone, and not a duplicate of an
/// already-emitted frequency within this clip.
pub fn classify_long_tones(
    runs: &[FrequencyRun],
    quick_calls: &[DetectedTone],
    config: LongToneConfig,
    hop_seconds: f64,
) -> Vec<DetectedTone> {
    let excluded: Vec<f64> = quick_calls
        .iter()
        .filter_map(|t| match t {
            DetectedTone::QuickCall { actual, .. } => Some([actual.0, actual.1]),
            _ => None,
        })
        .flatten()
        .collect();

    let mut seen = Vec::new();
    let mut out = Vec::new();

    for run in runs.iter().filter(|r| r.len() >= config.min_run_frames) {
        let freq = run.first();
        if freq <= config.min_frequency_hz {
            continue;
        }
        if excluded.contains(&freq) || seen.contains(&freq) {
            continue;
        }
        seen.push(freq);

        out.push(DetectedTone::LongTone {
            detected: freq,
            start_time_s: run.start_time_s,
            end_time_s: run.start_time_s + run.len() as f64 * hop_seconds,
        });
    }

    out
}
