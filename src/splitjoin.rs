//! Split-join buffer: stitches together consecutive silent-detection clips
//! from the same talkgroup, so a pager tone split across two transmissions
//! is still recognized as one.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::model::AudioClip;

const SILENCE_GAP_S: f64 = 2.0;

struct BufferedClip {
    clip: AudioClip,
    buffered_at: Instant,
}

/// Per-`talkgroup_id` buffer of clips pending a detection.
pub struct SplitJoinBuffer {
    buffers: DashMap<u64, Mutex<BufferedClip>>,
    ttl: Duration,
}

impl SplitJoinBuffer {
    pub fn new(ttl: Duration) -> Self {
        Self {
            buffers: DashMap::new(),
            ttl,
        }
    }

    /// Prepend any buffered clip for `talkgroup_id` to `clip`, joined by
    /// [`SILENCE_GAP_S`] of silence, evicting expired buffers along the way.
    pub fn join_with_pending(&self, talkgroup_id: u64, clip: AudioClip) -> AudioClip {
        self.evict_expired();

        let Some((_, entry)) = self.buffers.remove(&talkgroup_id) else {
            return clip;
        };

        let pending = entry.into_inner().clip;
        join_clips(pending, clip)
    }

    /// Buffer `clip` under `talkgroup_id`, replacing any existing buffer.
    pub fn buffer(&self, talkgroup_id: u64, clip: AudioClip) {
        self.buffers.insert(
            talkgroup_id,
            Mutex::new(BufferedClip {
                clip,
                buffered_at: Instant::now(),
            }),
        );
    }

    fn evict_expired(&self) {
        let ttl = self.ttl;
        self.buffers
            .retain(|_, entry| entry.lock().buffered_at.elapsed() < ttl);
    }
}

fn join_clips(first: AudioClip, second: AudioClip) -> AudioClip {
    let silence_samples = (SILENCE_GAP_S * f64::from(AudioClip::SAMPLE_RATE)) as usize;
    let mut samples = Vec::with_capacity(first.samples.len() + silence_samples + second.samples.len());
    samples.extend(first.samples);
    samples.extend(std::iter::repeat(0.0f32).take(silence_samples));
    samples.extend(second.samples);
    AudioClip::new(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(duration_s: f64) -> AudioClip {
        let n = (duration_s * f64::from(AudioClip::SAMPLE_RATE)) as usize;
        AudioClip::new(vec![0.1f32; n])
    }

    #[test]
    fn first_clip_for_talkgroup_passes_through_unjoined() {
        let buf = SplitJoinBuffer::new(Duration::from_secs(45));
        let joined = buf.join_with_pending(1, clip(1.0));
        assert_eq!(joined.duration_s, 1.0);
    }

    #[test]
    fn buffered_clip_is_prepended_with_silence_gap() {
        let buf = SplitJoinBuffer::new(Duration::from_secs(45));
        buf.buffer(1, clip(1.0));
        let joined = buf.join_with_pending(1, clip(1.0));
        assert!((joined.duration_s - (1.0 + SILENCE_GAP_S + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn buffer_is_consumed_once() {
        let buf = SplitJoinBuffer::new(Duration::from_secs(45));
        buf.buffer(1, clip(1.0));
        buf.join_with_pending(1, clip(1.0));
        let second_join = buf.join_with_pending(1, clip(1.0));
        assert_eq!(second_join.duration_s, 1.0);
    }

    #[test]
    fn different_talkgroups_do_not_interfere() {
        let buf = SplitJoinBuffer::new(Duration::from_secs(45));
        buf.buffer(1, clip(1.0));
        let joined = buf.join_with_pending(2, clip(1.0));
        assert_eq!(joined.duration_s, 1.0);
    }
}
