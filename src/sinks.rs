//! Notification sinks (§6.3): fan-out collaborators invoked once a segment is produced.
//!
//! Concrete delivery backends (email, push, webhook, social, MQTT, transcription
//! upload) are out of scope; only the trait seam and an in-memory reference
//! implementation used by tests ship here.

use parking_lot::Mutex;

use crate::error::SinkError;
use crate::model::Segment;

pub trait NotificationSink: Send + Sync {
    fn notify(&self, segment: &Segment) -> Result<(), SinkError>;
}

/// Fan out to every sink, tolerating individual failures.
///
/// Each sink's outcome is logged and returned; a failing sink never stops the
/// others from running.
pub fn notify_all(sinks: &[std::sync::Arc<dyn NotificationSink>], segment: &Segment) -> Vec<Result<(), SinkError>> {
    sinks
        .iter()
        .map(|sink| {
            let result = sink.notify(segment);
            if let Err(ref e) = result {
                tracing::error!(error = %e, "notification sink failed");
            }
            result
        })
        .collect()
}

/// Collects every delivered segment in memory; used by tests and as a
/// starting point for a real sink implementation.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<Segment>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<Segment> {
        self.delivered.lock().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, segment: &Segment) -> Result<(), SinkError> {
        self.delivered.lock().push(segment.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn segment() -> Segment {
        Segment {
            local_audio_path: "/tmp/test.mp3".into(),
            timestamp: 0,
            call_length: 10.0,
            interval_tone_ids: vec![0],
            matches: Vec::new(),
        }
    }

    struct FailingSink;
    impl NotificationSink for FailingSink {
        fn notify(&self, _segment: &Segment) -> Result<(), SinkError> {
            Err(SinkError::Failed("unreachable".to_string()))
        }
    }

    #[test]
    fn recording_sink_collects_segments() {
        let sink = RecordingSink::new();
        sink.notify(&segment()).unwrap();
        assert_eq!(sink.delivered().len(), 1);
    }

    #[test]
    fn one_failing_sink_does_not_block_others() {
        let recorder = Arc::new(RecordingSink::new());
        let sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(FailingSink), recorder.clone()];

        let results = notify_all(&sinks, &segment());
        assert!(results[0].is_err());
        assert!(results[1].is_ok());
        assert_eq!(recorder.delivered().len(), 1);
    }
}
