//! Quick-Call II classifier (C3): A-then-B two-tone sequential pager tones.

use crate::model::{DetectedTone, FrequencyRun};

/// The 82 canonical Quick-Call II frequencies, 288.5-2573.2 Hz.
pub const QCII_TABLE: [f64; 82] = [
    288.5, 296.5, 304.7, 313.8, 321.7, 330.5, 339.6, 349.0, 358.6, 368.5, 378.6, 389.0, 399.8,
    410.8, 422.1, 433.7, 445.7, 457.9, 470.5, 483.5, 496.8, 510.5, 524.6, 539.0, 553.9, 569.1,
    584.8, 600.9, 617.4, 634.5, 651.9, 669.9, 688.3, 707.3, 726.8, 746.8, 767.4, 788.5, 810.2,
    832.5, 855.5, 879.0, 903.2, 928.1, 953.7, 979.9, 989.0, 1006.9, 1034.7, 1063.2, 1092.4,
    1122.5, 1153.4, 1185.2, 1217.8, 1251.4, 1285.8, 1321.2, 1357.6, 1395.0, 1433.4, 1472.9,
    1513.5, 1555.2, 1598.0, 1642.0, 1687.2, 1733.7, 1781.5, 1830.5, 1881.0, 1930.2, 1981.1,
    2043.8, 2094.5, 2155.6, 2212.2, 2271.7, 2334.6, 2401.0, 2468.2, 2573.2,
];

/// Tunables for Quick-Call classification.
#[derive(Debug, Clone, Copy)]
pub struct QuickCallConfig {
    pub threshold_percent: f64,
    pub min_run_frames: usize,
    pub max_a_tone_frames: usize,
    pub min_b_tone_frames: usize,
}

impl Default for QuickCallConfig {
    fn default() -> Self {
        Self {
            threshold_percent: 2.0,
            min_run_frames: 8,
            max_a_tone_frames: 12,
            min_b_tone_frames: 28,
        }
    }
}

/// Return the QCII table entry minimizing `|target - q|`.
pub fn snap(target: f64) -> f64 {
    QCII_TABLE
        .iter()
        .copied()
        .min_by(|a, b| {
            (target - a)
                .abs()
                .partial_cmp(&(target - b).abs())
                .unwrap()
        })
        .expect("QCII_TABLE is non-empty")
}

fn snaps_within_tolerance(freq: f64, threshold_percent: f64) -> bool {
    QCII_TABLE
        .iter()
        .any(|&q| (freq - q).abs() <= q * threshold_percent / 100.0)
}

/// Classify Quick-Call II tones from frequency runs, assigning monotonic `tone_id`s.
pub fn classify_quick_calls(runs: &[FrequencyRun], config: QuickCallConfig) -> Vec<DetectedTone> {
    let mut out = Vec::new();
    let mut previous: Option<&FrequencyRun> = None;
    let mut next_tone_id: u32 = 0;

    for run in runs.iter().filter(|r| r.len() >= config.min_run_frames) {
        let Some(prev) = previous else {
            previous = Some(run);
            continue;
        };

        if snaps_within_tolerance(run.first(), config.threshold_percent) {
            if prev.len() <= config.max_a_tone_frames && run.len() >= config.min_b_tone_frames {
                let actual = (prev.first(), run.first());
                let exact = (snap(actual.0), snap(actual.1));
                out.push(DetectedTone::QuickCall {
                    tone_id: next_tone_id,
                    exact,
                    actual,
                    start_time_s: prev.start_time_s,
                });
                next_tone_id += 1;
            }
            previous = Some(run);
        }
        // else: current run doesn't snap to the QCII table; skip it and keep `previous`.
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(start: f64, freq: f64, len: usize) -> FrequencyRun {
        FrequencyRun {
            start_time_s: start,
            frequencies: vec![freq; len],
        }
    }

    #[test]
    fn snap_is_idempotent() {
        for &q in QCII_TABLE.iter() {
            assert_eq!(snap(snap(q)), snap(q));
        }
        assert_eq!(snap(snap(700.3)), snap(700.3));
    }

    #[test]
    fn emits_quick_call_for_a_then_b_pattern() {
        let runs = vec![run(5.0, 726.8, 10), run(6.0, 1122.5, 30)];
        let tones = classify_quick_calls(&runs, QuickCallConfig::default());
        assert_eq!(tones.len(), 1);
        match &tones[0] {
            DetectedTone::QuickCall {
                tone_id,
                exact,
                actual,
                start_time_s,
            } => {
                assert_eq!(*tone_id, 0);
                assert_eq!(*exact, (726.8, 1122.5));
                assert_eq!(*actual, (726.8, 1122.5));
                assert_eq!(*start_time_s, 5.0);
            }
            _ => panic!("expected QuickCall"),
        }
    }

    #[test]
    fn rejects_when_b_tone_too_short() {
        let runs = vec![run(5.0, 726.8, 10), run(6.0, 1122.5, 10)];
        let tones = classify_quick_calls(&runs, QuickCallConfig::default());
        assert!(tones.is_empty());
    }

    #[test]
    fn rejects_when_a_tone_too_long() {
        let runs = vec![run(5.0, 726.8, 13), run(6.0, 1122.5, 30)];
        let tones = classify_quick_calls(&runs, QuickCallConfig::default());
        assert!(tones.is_empty());
    }

    #[test]
    fn ignores_non_qcii_runs_between_candidates() {
        let runs = vec![run(1.0, 726.8, 10), run(2.0, 4000.0, 9), run(3.0, 1122.5, 30)];
        let tones = classify_quick_calls(&runs, QuickCallConfig::default());
        assert_eq!(tones.len(), 1);
    }

    #[test]
    fn assigns_monotonic_tone_ids_across_clip() {
        let runs = vec![
            run(1.0, 726.8, 10),
            run(2.0, 1122.5, 30),
            run(10.0, 953.7, 10),
            run(11.0, 1433.4, 30),
        ];
        let tones = classify_quick_calls(&runs, QuickCallConfig::default());
        let ids: Vec<u32> = tones
            .iter()
            .map(|t| match t {
                DetectedTone::QuickCall { tone_id, .. } => *tone_id,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ids, vec![0, 1]);
    }
}
