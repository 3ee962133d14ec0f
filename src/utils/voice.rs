// Push-to-talk capture for dictating a question. Audio and transcription
// are delegated to external binaries: `rec` (sox) records a bounded WAV
// clip and `whisper-cli` turns it into text. Nothing audio-specific links
// into this process.

use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

pub const DEFAULT_RECORD_SECONDS: u64 = 5;

/// Upper bound on one capture; longer requests are clamped, not rejected.
pub const MAX_RECORD_SECONDS: u64 = 30;

// Grace period on top of the clip length before the recorder is killed.
const RECORDER_GRACE_SECONDS: u64 = 5;

/// Clamps a requested clip length into the supported range.
pub fn clamp_record_seconds(seconds: u64) -> u64 {
    seconds.clamp(1, MAX_RECORD_SECONDS)
}

/// Records a mono 16 kHz WAV clip of `seconds` length from the default
/// input device. The recorder runs under a timeout and is killed if it
/// overstays, so a wedged audio stack cannot hang the server.
pub async fn record_clip(seconds: u64) -> Result<PathBuf> {
    let seconds = clamp_record_seconds(seconds);
    let clip = std::env::temp_dir().join(format!("pdflinks-voice-{}.wav", std::process::id()));

    info!("Recording {} second clip to {}", seconds, clip.display());

    let mut command = Command::new("rec");
    command
        .arg("-q")
        .args(["-c", "1"])
        .args(["-r", "16000"])
        .arg(&clip)
        .args(["trim", "0"])
        .arg(seconds.to_string())
        .kill_on_drop(true);

    let deadline = Duration::from_secs(seconds + RECORDER_GRACE_SECONDS);
    let status = tokio::time::timeout(deadline, command.status())
        .await
        .map_err(|_| anyhow!("recording did not finish within {} seconds", deadline.as_secs()))?
        .map_err(|e| spawn_error("rec", "sox", e))?;

    if !status.success() {
        bail!("rec exited with {}", status);
    }

    Ok(clip)
}

/// Transcribes a WAV clip with `whisper-cli`. `model` is the path to a
/// ggml model file; without one the binary's own default is used.
pub async fn transcribe_clip(clip: &Path, model: Option<&Path>) -> Result<String> {
    info!("Transcribing {}", clip.display());

    let mut command = Command::new("whisper-cli");
    command.arg("--no-timestamps").arg("-f").arg(clip);
    if let Some(model) = model {
        command.arg("-m").arg(model);
    }

    let output = command
        .output()
        .await
        .map_err(|e| spawn_error("whisper-cli", "whisper-cpp", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "whisper-cli exited with {}: {}",
            output.status,
            stderr.trim()
        );
    }

    let transcript = String::from_utf8(output.stdout)
        .context("whisper-cli produced non-UTF-8 output")?
        .trim()
        .to_string();

    debug!("Transcript: {:?}", transcript);
    Ok(transcript)
}

/// Records one utterance and returns its transcript. The temporary clip is
/// removed regardless of transcription outcome.
pub async fn capture_question(seconds: u64, model: Option<&Path>) -> Result<String> {
    let clip = record_clip(seconds).await?;
    let transcript = transcribe_clip(&clip, model).await;

    if let Err(e) = std::fs::remove_file(&clip) {
        warn!("Could not remove clip {}: {}", clip.display(), e);
    }

    let transcript = transcript?;
    if transcript.is_empty() {
        bail!("no speech recognized in the recording");
    }
    Ok(transcript)
}

fn spawn_error(binary: &str, package: &str, e: std::io::Error) -> anyhow::Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        anyhow!("`{}` not found on PATH; install {} to use voice input", binary, package)
    } else {
        anyhow!("failed to run `{}`: {}", binary, e)
    }
}
