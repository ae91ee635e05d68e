//! Core data model shared across the extraction, matching, and segmentation stages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decoded, resampled audio ready for analysis.
///
/// Immutable once constructed: `samples` is always mono float32 at
/// [`AudioClip::SAMPLE_RATE`] Hz in `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub duration_s: f64,
}

impl AudioClip {
    pub const SAMPLE_RATE: u32 = 22_050;

    pub fn new(samples: Vec<f32>) -> Self {
        let duration_s = samples.len() as f64 / f64::from(Self::SAMPLE_RATE);
        Self {
            samples,
            sample_rate: Self::SAMPLE_RATE,
            duration_s,
        }
    }
}

/// A run of consecutive, mutually-tolerant dominant frequencies produced by the grouper.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRun {
    pub start_time_s: f64,
    pub frequencies: Vec<f64>,
}

impl FrequencyRun {
    pub fn first(&self) -> f64 {
        self.frequencies[0]
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// A classified tone extracted from a clip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum DetectedTone {
    QuickCall {
        tone_id: u32,
        exact: (f64, f64),
        actual: (f64, f64),
        start_time_s: f64,
    },
    LongTone {
        detected: f64,
        start_time_s: f64,
        end_time_s: f64,
    },
    HiLowTone {
        detected: (f64, f64),
        start_time_s: f64,
        end_time_s: f64,
    },
    Dtmf {
        key: char,
        start_time_s: f64,
    },
}

/// A configured agency tone signature. `c_tone`/`d_tone` of `0.0` mean "unset".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneProfile {
    pub profile_id: String,
    pub profile_name: String,
    pub a_tone: f64,
    pub b_tone: f64,
    #[serde(default)]
    pub c_tone: f64,
    #[serde(default)]
    pub d_tone: f64,
    #[serde(default = "default_tolerance_percent")]
    pub tone_tolerance_percent: f64,
    #[serde(default = "default_ignore_seconds")]
    pub ignore_seconds: f64,
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_tolerance_percent() -> f64 {
    2.0
}

fn default_ignore_seconds() -> f64 {
    300.0
}

impl ToneProfile {
    pub fn has_four_tone_extension(&self) -> bool {
        self.c_tone > 0.0 && self.d_tone > 0.0
    }
}

/// The outcome of matching a single [`DetectedTone::QuickCall`] against a [`ToneProfile`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRecord {
    pub profile_id: String,
    pub profile_name: String,
    pub tones_matched: Vec<f64>,
    pub tone_ids: Vec<u32>,
    pub was_suppressed: bool,
}

/// A single cooldown suppression window for one profile, within one stream scope.
#[derive(Debug, Clone, PartialEq)]
pub struct CooldownEntry {
    pub profile_id: String,
    pub last_detected: f64,
    pub ignore_seconds: f64,
}

impl CooldownEntry {
    pub fn is_active(&self, now: f64) -> bool {
        now <= self.last_detected + self.ignore_seconds
    }
}

/// Opaque, pass-through metadata describing the call that produced a clip.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CallMetadata {
    pub start_time: i64,
    pub call_length: f64,
    pub talkgroup_id: u64,
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A trimmed/normalized output artifact produced by the segmenter for one group of matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub local_audio_path: std::path::PathBuf,
    pub timestamp: i64,
    pub call_length: f64,
    pub interval_tone_ids: Vec<u32>,
    pub matches: Vec<MatchRecord>,
}

/// Per-clip aggregate produced by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DetectionResult {
    pub quick_call: Vec<DetectedTone>,
    pub long_tones: Vec<DetectedTone>,
    pub hi_low_tones: Vec<DetectedTone>,
    pub dtmf_tones: Vec<DetectedTone>,
    pub matches: Vec<MatchRecord>,
    #[serde(skip)]
    pub segments: Vec<Segment>,
}

impl DetectionResult {
    pub fn is_empty(&self) -> bool {
        self.quick_call.is_empty()
            && self.long_tones.is_empty()
            && self.hi_low_tones.is_empty()
            && self.dtmf_tones.is_empty()
    }

    pub fn quick_calls(&self) -> impl Iterator<Item = (u32, (f64, f64), (f64, f64), f64)> + '_ {
        self.quick_call.iter().filter_map(|t| match t {
            DetectedTone::QuickCall {
                tone_id,
                exact,
                actual,
                start_time_s,
            } => Some((*tone_id, *exact, *actual, *start_time_s)),
            _ => None,
        })
    }
}

/// The result of [`crate::orchestrator::Orchestrator::process`].
#[derive(Debug)]
pub enum Outcome {
    Detected(DetectionResult),
    Pending,
    TooShort,
}
