use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use icad_tone_core::catalog::TomlProfileCatalog;
use icad_tone_core::codec::FfmpegAudioCodec;
use icad_tone_core::cooldown::InMemoryCooldownStore;
use icad_tone_core::model::CallMetadata;
use icad_tone_core::orchestrator::Orchestrator;
use icad_tone_core::segment::SegmenterConfig;
use icad_tone_core::splitjoin::SplitJoinBuffer;
use icad_tone_core::tone::ExtractionConfig;

pub struct ProcessOptions {
    pub file: PathBuf,
    pub scope: String,
    pub talkgroup: u64,
    pub start_time: i64,
    pub call_length: f64,
    pub catalog: PathBuf,
    pub output: PathBuf,
}

pub fn run_process(options: ProcessOptions) -> Result<(), Box<dyn std::error::Error>> {
    let ext = options
        .file
        .extension()
        .and_then(|e| e.to_str())
        .ok_or("file has no extension")?
        .to_string();
    let bytes = std::fs::read(&options.file)?;

    let catalog = TomlProfileCatalog::load(&options.catalog)?;
    let codec = FfmpegAudioCodec::new()?;

    let orchestrator = Orchestrator {
        codec: Arc::new(codec),
        cooldown: Arc::new(InMemoryCooldownStore::default()),
        catalog: Arc::new(catalog),
        sinks: Vec::new(),
        split_join: Arc::new(SplitJoinBuffer::new(Duration::from_secs(45))),
        extraction: ExtractionConfig::default(),
        segmenter: SegmenterConfig::default(),
        min_audio_length_s: 4.5,
        split_join_enabled: true,
        working_dir: options.output,
    };

    let metadata = CallMetadata {
        start_time: options.start_time,
        call_length: options.call_length,
        talkgroup_id: options.talkgroup,
        extra: Default::default(),
    };

    let outcome = orchestrator.process(&bytes, &ext, metadata, &options.scope)?;
    println!("{}", serde_json::to_string_pretty(&outcome_to_json(&outcome))?);

    Ok(())
}

fn outcome_to_json(outcome: &icad_tone_core::model::Outcome) -> serde_json::Value {
    use icad_tone_core::model::Outcome;
    match outcome {
        Outcome::Detected(result) => serde_json::json!({ "status": "detected", "result": result }),
        Outcome::Pending => serde_json::json!({ "status": "pending" }),
        Outcome::TooShort => serde_json::json!({ "status": "too_short" }),
    }
}
