//! Audio segmenter (C8): groups Quick-Call tones by time, computes cut
//! intervals, and produces one trimmed/filtered/normalized artifact per group.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::error;

use crate::codec::{AudioCodec, LoudnormTarget};
use crate::error::SegmenterError;
use crate::model::{DetectionResult, MatchRecord, Segment};

#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    pub post_cut_s: f64,
    pub pre_cut_s: f64,
    pub group_gap_s: f64,
    pub trim_tones: bool,
    pub filter_spec: Option<String>,
    pub normalize: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            post_cut_s: 5.5,
            pre_cut_s: 2.0,
            group_gap_s: 6.5,
            trim_tones: true,
            filter_spec: None,
            normalize: true,
        }
    }
}

#[derive(Debug, Clone)]
struct Interval {
    start_s: f64,
    end_s: Option<f64>,
    tone_ids: Vec<u32>,
}

fn group_by_time(mut tones: Vec<(u32, f64)>, group_gap_s: f64) -> Vec<Vec<(u32, f64)>> {
    tones.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    let mut groups = Vec::new();
    let mut current = vec![tones[0]];

    for &(id, t) in &tones[1..] {
        if t - current.last().unwrap().1 <= group_gap_s {
            current.push((id, t));
        } else {
            groups.push(std::mem::take(&mut current));
            current = vec![(id, t)];
        }
    }
    groups.push(current);
    groups
}

fn compute_intervals(groups: &[Vec<(u32, f64)>], config: &SegmenterConfig) -> Vec<Interval> {
    let mut intervals = Vec::new();
    let mut i = 0;

    while i < groups.len() {
        if i + 1 < groups.len() {
            let g0 = &groups[i];
            let g1 = &groups[i + 1];

            let start = g0.iter().map(|t| t.1).fold(f64::MIN, f64::max) + config.post_cut_s;
            let mut end = g1.iter().map(|t| t.1).fold(f64::MAX, f64::min) - config.pre_cut_s;
            if end <= start {
                end = start + 0.1;
            }

            let tone_ids = g0.iter().chain(g1.iter()).map(|t| t.0).collect();
            intervals.push(Interval {
                start_s: start,
                end_s: Some(end),
                tone_ids,
            });
            i += 2;
        } else {
            let g = &groups[i];
            let start = g.iter().map(|t| t.1).fold(f64::MIN, f64::max) + config.post_cut_s;
            let tone_ids = g.iter().map(|t| t.0).collect();
            intervals.push(Interval {
                start_s: start,
                end_s: None,
                tone_ids,
            });
            i += 1;
        }
    }

    if intervals.len() > 4 {
        let first_group = &groups[0];
        let first_start = first_group.iter().map(|t| t.1).fold(f64::MAX, f64::min);
        return vec![Interval {
            start_s: 0.0,
            end_s: Some(first_start),
            tone_ids: first_group.iter().map(|t| t.0).collect(),
        }];
    }

    intervals
}

fn profile_slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

fn matches_for_interval(matches: &[MatchRecord], interval: &Interval) -> Vec<MatchRecord> {
    matches
        .iter()
        .filter(|m| m.tone_ids.iter().any(|id| interval.tone_ids.contains(id)))
        .cloned()
        .collect()
}

/// Run the C8 pipeline: group, compute intervals, and produce one [`Segment`]
/// per interval that has at least one associated match.
pub fn segment(
    detection: &DetectionResult,
    source_path: &Path,
    output_dir: &Path,
    original_timestamp: i64,
    call_length: f64,
    codec: &dyn AudioCodec,
    config: &SegmenterConfig,
) -> Vec<Result<Segment, SegmenterError>> {
    if detection.matches.is_empty() {
        return Vec::new();
    }

    let quick_call_times: Vec<(u32, f64)> = detection.quick_calls().map(|(id, _, _, t)| (id, t)).collect();
    if quick_call_times.is_empty() {
        return Vec::new();
    }

    let intervals = if config.trim_tones {
        let groups = group_by_time(quick_call_times, config.group_gap_s);
        compute_intervals(&groups, config)
    } else {
        vec![Interval {
            start_s: 0.0,
            end_s: None,
            tone_ids: quick_call_times.iter().map(|t| t.0).collect(),
        }]
    };

    intervals
        .iter()
        .map(|interval| {
            build_segment(
                interval,
                &detection.matches,
                source_path,
                output_dir,
                original_timestamp,
                call_length,
                codec,
                config,
            )
        })
        .collect()
}

fn build_segment(
    interval: &Interval,
    all_matches: &[MatchRecord],
    source_path: &Path,
    output_dir: &Path,
    original_timestamp: i64,
    call_length: f64,
    codec: &dyn AudioCodec,
    config: &SegmenterConfig,
) -> Result<Segment, SegmenterError> {
    let matches = matches_for_interval(all_matches, interval);
    let first_match = matches.first().ok_or(SegmenterError::NoMatches)?;

    let adjusted_timestamp = original_timestamp + (interval.start_s - config.post_cut_s).max(0.0) as i64;
    let timestamp_str = DateTime::<Utc>::from_timestamp(adjusted_timestamp, 0)
        .unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).unwrap())
        .format("%Y%m%d_%H%M%S");
    let output_file_name = format!("{}_{}.mp3", profile_slug(&first_match.profile_name), timestamp_str);
    let output_path = output_dir.join(&output_file_name);

    let temp_dir = tempfile::tempdir()?;
    let mut current = temp_dir.path().join("segment.mp3");

    codec
        .extract(source_path, interval.start_s, interval.end_s, &current)
        .map_err(|e| {
            error!(error = %e, "segment extraction failed");
            e
        })?;

    if let Some(filter_spec) = &config.filter_spec {
        let filtered = temp_dir.path().join("filtered.mp3");
        codec.apply_filter(&current, &filtered, filter_spec).map_err(|e| {
            error!(error = %e, "segment filter failed");
            e
        })?;
        current = filtered;
    }

    if config.normalize {
        let normalized = temp_dir.path().join("normalized.mp3");
        codec
            .loudnorm(&current, &normalized, LoudnormTarget::default())
            .map_err(|e| {
                error!(error = %e, "segment normalization failed");
                e
            })?;
        current = normalized;
    }

    std::fs::copy(&current, &output_path)?;

    let clamped_call_length = match interval.end_s {
        Some(end) => (end - interval.start_s).max(0.0),
        None => (call_length - interval.start_s).max(0.0),
    };

    Ok(Segment {
        local_audio_path: output_path,
        timestamp: adjusted_timestamp,
        call_length: clamped_call_length,
        interval_tone_ids: interval.tone_ids.clone(),
        matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugifies_profile_name() {
        assert_eq!(profile_slug("Walworth Co. Fire/EMS"), "walworth_co__fire_ems");
    }

    #[test]
    fn single_group_produces_trailing_unpaired_interval() {
        let groups = vec![vec![(0u32, 3.0), (1u32, 4.0)]];
        let config = SegmenterConfig::default();
        let intervals = compute_intervals(&groups, &config);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].end_s, None);
        assert_eq!(intervals[0].start_s, 4.0 + config.post_cut_s);
    }

    #[test]
    fn pairs_consecutive_groups_into_one_interval() {
        let groups = vec![vec![(0u32, 1.0)], vec![(1u32, 20.0)]];
        let config = SegmenterConfig::default();
        let intervals = compute_intervals(&groups, &config);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].tone_ids, vec![0, 1]);
        assert!(intervals[0].end_s.unwrap() > intervals[0].start_s);
    }

    #[test]
    fn degenerate_interval_gets_minimum_width() {
        let groups = vec![vec![(0u32, 1.0)], vec![(1u32, 1.5)]];
        let config = SegmenterConfig::default();
        let intervals = compute_intervals(&groups, &config);
        assert!(intervals[0].end_s.unwrap() > intervals[0].start_s);
    }

    #[test]
    fn more_than_four_intervals_triggers_safety_clamp() {
        let groups: Vec<Vec<(u32, f64)>> = (0..10).map(|i| vec![(i, i as f64 * 100.0)]).collect();
        let config = SegmenterConfig::default();
        let intervals = compute_intervals(&groups, &config);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start_s, 0.0);
        assert_eq!(intervals[0].end_s, Some(0.0));
        assert_eq!(intervals[0].tone_ids, vec![0]);
    }
}
