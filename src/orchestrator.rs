//! Orchestrator (C9): the end-to-end pipeline for one upload.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use crate::catalog::ProfileCatalog;
use crate::codec::AudioCodec;
use crate::cooldown::CooldownStore;
use crate::error::OrchestratorError;
use crate::match_engine::match_quick_calls;
use crate::model::{CallMetadata, DetectionResult, Outcome};
use crate::segment::{self, SegmenterConfig};
use crate::signal::decode_audio;
use crate::sinks::{notify_all, NotificationSink};
use crate::splitjoin::SplitJoinBuffer;
use crate::tone::{self, ExtractionConfig};

/// Wires C1-C8 together for a single upload and fans the result out to
/// whatever [`NotificationSink`]s are configured.
pub struct Orchestrator {
    pub codec: Arc<dyn AudioCodec>,
    pub cooldown: Arc<dyn CooldownStore>,
    pub catalog: Arc<dyn ProfileCatalog>,
    pub sinks: Vec<Arc<dyn NotificationSink>>,
    pub split_join: Arc<SplitJoinBuffer>,
    pub extraction: ExtractionConfig,
    pub segmenter: SegmenterConfig,
    pub min_audio_length_s: f64,
    pub split_join_enabled: bool,
    pub working_dir: PathBuf,
}

impl Orchestrator {
    pub fn process(
        &self,
        audio_blob: &[u8],
        ext: &str,
        metadata: CallMetadata,
        stream_scope: &str,
    ) -> Result<Outcome, OrchestratorError> {
        if stream_scope.is_empty() {
            return Err(OrchestratorError::UnknownScope(stream_scope.to_string()));
        }

        info!(scope = stream_scope, talkgroup = metadata.talkgroup_id, "decoding upload");
        let raw_clip = decode_audio(audio_blob, ext)?;
        let clip = self.split_join.join_with_pending(metadata.talkgroup_id, raw_clip);

        if clip.duration_s < self.min_audio_length_s {
            return Ok(Outcome::TooShort);
        }

        let extracted = tone::extract(&clip, &self.extraction);
        let nothing_detected = extracted.quick_call.is_empty()
            && extracted.long_tones.is_empty()
            && extracted.hi_low_tones.is_empty()
            && extracted.dtmf_tones.is_empty();

        if nothing_detected {
            if self.split_join_enabled {
                info!(talkgroup = metadata.talkgroup_id, "buffering clip for split-join");
                self.split_join.buffer(metadata.talkgroup_id, clip);
                return Ok(Outcome::Pending);
            }
            return Ok(Outcome::Detected(DetectionResult::default()));
        }

        let now = metadata.start_time as f64;
        let profiles = self.catalog.list_profiles(stream_scope);
        let matches = match_quick_calls(&extracted.quick_call, &profiles, self.cooldown.as_ref(), stream_scope, now);

        let mut result = DetectionResult {
            quick_call: extracted.quick_call,
            long_tones: extracted.long_tones,
            hi_low_tones: extracted.hi_low_tones,
            dtmf_tones: extracted.dtmf_tones,
            matches,
            segments: Vec::new(),
        };

        let has_live_match = result.matches.iter().any(|m| !m.was_suppressed);
        if has_live_match {
            self.run_segmenter(audio_blob, ext, &metadata, &mut result);
        }

        Ok(Outcome::Detected(result))
    }

    fn run_segmenter(&self, audio_blob: &[u8], ext: &str, metadata: &CallMetadata, result: &mut DetectionResult) {
        let source_path = self
            .working_dir
            .join(format!("{}_{}.{}", metadata.talkgroup_id, metadata.start_time, ext));

        if let Err(e) = std::fs::write(&source_path, audio_blob) {
            error!(error = %e, "failed to persist upload for segmenting");
            return;
        }

        let outcomes = segment::segment(
            result,
            &source_path,
            &self.working_dir,
            metadata.start_time,
            metadata.call_length,
            self.codec.as_ref(),
            &self.segmenter,
        );

        for outcome in outcomes {
            match outcome {
                Ok(seg) => {
                    notify_all(&self.sinks, &seg);
                    result.segments.push(seg);
                }
                Err(e) => error!(error = %e, "segment production failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TomlProfileCatalog;
    use crate::codec::FfmpegAudioCodec;
    use crate::cooldown::InMemoryCooldownStore;

    fn orchestrator(working_dir: PathBuf) -> Orchestrator {
        Orchestrator {
            codec: Arc::new(FfmpegAudioCodec),
            cooldown: Arc::new(InMemoryCooldownStore::default()),
            catalog: Arc::new(TomlProfileCatalog::empty()),
            sinks: Vec::new(),
            split_join: Arc::new(SplitJoinBuffer::new(std::time::Duration::from_secs(45))),
            extraction: ExtractionConfig::default(),
            segmenter: SegmenterConfig::default(),
            min_audio_length_s: 4.5,
            split_join_enabled: true,
            working_dir,
        }
    }

    fn sine_wav_bytes(freq_hz: f64, duration_s: f64) -> Vec<u8> {
        let sample_rate = 22050u32;
        let n = (duration_s * f64::from(sample_rate)) as u32;
        let mut samples = Vec::with_capacity(n as usize);
        for i in 0..n {
            let t = i as f64 / f64::from(sample_rate);
            samples.push(((2.0 * std::f64::consts::PI * freq_hz * t).sin() * i16::MAX as f64) as i16);
        }

        let data_len = samples.len() as u32 * 2;
        let mut buf = Vec::new();
        buf.extend(b"RIFF");
        buf.extend((36 + data_len).to_le_bytes());
        buf.extend(b"WAVEfmt ");
        buf.extend(16u32.to_le_bytes());
        buf.extend(1u16.to_le_bytes());
        buf.extend(1u16.to_le_bytes());
        buf.extend(sample_rate.to_le_bytes());
        buf.extend((sample_rate * 2).to_le_bytes());
        buf.extend(2u16.to_le_bytes());
        buf.extend(16u16.to_le_bytes());
        buf.extend(b"data");
        buf.extend(data_len.to_le_bytes());
        for s in samples {
            buf.extend(s.to_le_bytes());
        }
        buf
    }

    #[test]
    fn rejects_clip_shorter_than_minimum() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path().to_path_buf());
        let bytes = sine_wav_bytes(440.0, 1.0);
        let outcome = orch
            .process(&bytes, "wav", CallMetadata::default(), "scope-a")
            .unwrap();
        assert!(matches!(outcome, Outcome::TooShort));
    }

    #[test]
    fn rejects_empty_stream_scope() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path().to_path_buf());
        let bytes = sine_wav_bytes(440.0, 5.0);
        let err = orch.process(&bytes, "wav", CallMetadata::default(), "").unwrap_err();
        assert!(matches!(err, OrchestratorError::UnknownScope(_)));
    }

    #[test]
    fn silent_clip_without_split_join_yields_empty_detection() {
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(dir.path().to_path_buf());
        orch.split_join_enabled = false;
        let bytes = sine_wav_bytes(0.0, 5.0);
        let outcome = orch
            .process(&bytes, "wav", CallMetadata::default(), "scope-a")
            .unwrap();
        match outcome {
            Outcome::Detected(result) => assert!(result.is_empty()),
            _ => panic!("expected Detected"),
        }
    }

    #[test]
    fn silent_clip_with_split_join_is_pending() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path().to_path_buf());
        let bytes = sine_wav_bytes(0.0, 5.0);
        let outcome = orch
            .process(&bytes, "wav", CallMetadata::default(), "scope-a")
            .unwrap();
        assert!(matches!(outcome, Outcome::Pending));
    }
}
