//! The `AudioCodec` collaborator: decode, trim, filter, and normalize audio.
//!
//! `FfmpegAudioCodec` shells out to `ffmpeg` for the file-to-file operations
//! and delegates decoding to [`crate::signal::decode_audio`].

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::error;

use crate::error::CodecError;

/// Two-pass loudnorm target, matching EBU R128 broadcast defaults.
#[derive(Debug, Clone, Copy)]
pub struct LoudnormTarget {
    pub integrated_lufs: f64,
    pub true_peak_dbtp: f64,
    pub lra: f64,
}

impl Default for LoudnormTarget {
    fn default() -> Self {
        Self {
            integrated_lufs: -16.0,
            true_peak_dbtp: -1.5,
            lra: 11.0,
        }
    }
}

/// File-oriented audio operations the segmenter (C8) delegates to.
pub trait AudioCodec: Send + Sync {
    fn decode_to_mono_f32_22050(&self, bytes: &[u8], ext: &str) -> Result<Vec<f32>, CodecError>;
    fn extract(&self, in_path: &Path, start_s: f64, end_s: Option<f64>, out_path: &Path) -> Result<(), CodecError>;
    fn apply_filter(&self, in_path: &Path, out_path: &Path, filter_spec: &str) -> Result<(), CodecError>;
    fn loudnorm(&self, in_path: &Path, out_path: &Path, target: LoudnormTarget) -> Result<(), CodecError>;
}

fn check_ffmpeg() -> Result<(), CodecError> {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|_| CodecError::FfmpegMissing)?;
    Ok(())
}

fn run_ffmpeg(args: &[&str]) -> Result<std::process::Output, CodecError> {
    let output = Command::new("ffmpeg")
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(CodecError::FfmpegFailed(stderr));
    }

    Ok(output)
}

/// Default `AudioCodec`: `ffmpeg` subprocess calls for file operations.
pub struct FfmpegAudioCodec;

impl FfmpegAudioCodec {
    pub fn new() -> Result<Self, CodecError> {
        check_ffmpeg()?;
        Ok(Self)
    }

    fn measure_loudness(&self, in_path: &Path) -> Result<serde_json::Value, CodecError> {
        let output = run_ffmpeg(&[
            "-i",
            path_str(in_path)?,
            "-af",
            "loudnorm=print_format=json",
            "-f",
            "null",
            "-",
        ])?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let start = stderr
            .find('{')
            .ok_or_else(|| CodecError::FfmpegFailed("no loudnorm JSON in ffmpeg output".to_string()))?;
        let end = stderr
            .rfind('}')
            .ok_or_else(|| CodecError::FfmpegFailed("no loudnorm JSON in ffmpeg output".to_string()))?;

        serde_json::from_str(&stderr[start..=end])
            .map_err(|e| CodecError::FfmpegFailed(format!("malformed loudnorm JSON: {e}")))
    }
}

fn path_str(p: &Path) -> Result<&str, CodecError> {
    p.to_str()
        .ok_or_else(|| CodecError::FfmpegFailed(format!("non-utf8 path: {}", p.display())))
}

impl AudioCodec for FfmpegAudioCodec {
    fn decode_to_mono_f32_22050(&self, bytes: &[u8], ext: &str) -> Result<Vec<f32>, CodecError> {
        crate::signal::decode_audio(bytes, ext)
            .map(|clip| clip.samples)
            .map_err(|e| CodecError::DecodeError(e.to_string()))
    }

    fn extract(&self, in_path: &Path, start_s: f64, end_s: Option<f64>, out_path: &Path) -> Result<(), CodecError> {
        let mut args = vec!["-ss".to_string(), start_s.to_string()];
        if let Some(end) = end_s {
            args.push("-to".to_string());
            args.push(end.to_string());
        }
        args.push("-i".to_string());
        args.push(path_str(in_path)?.to_string());
        args.push("-y".to_string());
        args.push(path_str(out_path)?.to_string());

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        run_ffmpeg(&arg_refs).map(|_| ())
    }

    fn apply_filter(&self, in_path: &Path, out_path: &Path, filter_spec: &str) -> Result<(), CodecError> {
        run_ffmpeg(&[
            "-i",
            path_str(in_path)?,
            "-af",
            filter_spec,
            "-y",
            path_str(out_path)?,
        ])
        .map(|_| ())
    }

    fn loudnorm(&self, in_path: &Path, out_path: &Path, target: LoudnormTarget) -> Result<(), CodecError> {
        let measured = self.measure_loudness(in_path)?;
        let get = |key: &str| -> Result<String, CodecError> {
            measured
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| CodecError::FfmpegFailed(format!("loudnorm JSON missing {key}")))
        };

        let filter = format!(
            "loudnorm=I={}:TP={}:LRA={}:measured_I={}:measured_LRA={}:measured_TP={}:measured_thresh={}:offset={}",
            target.integrated_lufs,
            target.true_peak_dbtp,
            target.lra,
            get("input_i")?,
            get("input_lra")?,
            get("input_tp")?,
            get("input_thresh")?,
            get("target_offset")?,
        );

        run_ffmpeg(&["-i", path_str(in_path)?, "-af", &filter, "-y", path_str(out_path)?])
            .map(|_| ())
            .inspect_err(|e| error!(error = %e, "loudnorm pass failed"))
    }
}
