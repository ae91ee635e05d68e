//! Tone classification: turns a dominant-frequency track into typed [`crate::model::DetectedTone`]s.

mod dtmf;
mod grouper;
mod hilow;
mod longtone;
mod quickcall;

pub use dtmf::{classify_dtmf, DtmfConfig};
pub use grouper::group_runs;
pub use hilow::{classify_hi_low_tones, HiLowConfig};
pub use longtone::{classify_long_tones, LongToneConfig};
pub use quickcall::{classify_quick_calls, snap, QuickCallConfig, QCII_TABLE};

use crate::model::AudioClip;
use crate::signal::{dominant_frequency_track, DominantFrequencyTrack};

/// Tunables for the whole tone-extraction stage (C1-C5).
#[derive(Debug, Clone, Copy)]
pub struct ExtractionConfig {
    pub run_threshold_percent: f64,
    pub quick_call: QuickCallConfig,
    pub long_tone: LongToneConfig,
    pub hi_low: HiLowConfig,
    pub dtmf: DtmfConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            run_threshold_percent: 2.0,
            quick_call: QuickCallConfig::default(),
            long_tone: LongToneConfig::default(),
            hi_low: HiLowConfig::default(),
            dtmf: DtmfConfig::default(),
        }
    }
}

/// Everything the extraction stage produces from one clip, keyed by kind.
#[derive(Debug, Clone, Default)]
pub struct ExtractedTones {
    pub quick_call: Vec<crate::model::DetectedTone>,
    pub long_tones: Vec<crate::model::DetectedTone>,
    pub hi_low_tones: Vec<crate::model::DetectedTone>,
    pub dtmf_tones: Vec<crate::model::DetectedTone>,
}

/// Run the full C1-C5 extraction pipeline over one clip.
pub fn extract(clip: &AudioClip, config: &ExtractionConfig) -> ExtractedTones {
    let track: DominantFrequencyTrack = dominant_frequency_track(clip);
    let runs = group_runs(&track, config.run_threshold_percent);

    let quick_call = classify_quick_calls(&runs, config.quick_call);
    let hop_seconds = track.hop as f64 / f64::from(track.sample_rate);
    let long_tones = classify_long_tones(&runs, &quick_call, config.long_tone, hop_seconds);
    let hi_low_tones = classify_hi_low_tones(&track, config.hi_low);
    let dtmf_tones = classify_dtmf(clip, config.dtmf);

    ExtractedTones {
        quick_call,
        long_tones,
        hi_low_tones,
        dtmf_tones,
    }
}
