use std::path::Path;

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use tokio::task;
use tracing::{debug, info, warn};

use crate::error::ConversionError;
use crate::types::{Container, ConversionOptions, ConversionPreset};

/// Codec arguments placed between the input and the output file.
pub fn conversion_args(container: Container, preset: ConversionPreset) -> Vec<String> {
    match container {
        Container::Mp4 => vec![
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            preset.to_string(),
            "-c:a".into(),
            "aac".into(),
            "-movflags".into(),
            "+faststart".into(),
        ],
        Container::Mp3 => ["-vn", "-c:a", "libmp3lame", "-b:a", "192k"]
            .into_iter()
            .map(str::to_owned)
            .collect(),
    }
}

/// Convert `input` into `output` using the FFmpeg binary named in `options`.
///
/// FFmpeg's event stream is consumed on a blocking worker so the request
/// task only awaits the join handle.
pub async fn convert(
    input: &Path,
    output: &Path,
    options: &ConversionOptions,
) -> Result<(), ConversionError> {
    let input = input.to_path_buf();
    let output = output.to_path_buf();
    let ffmpeg = options.ffmpeg_path.clone();
    let args = conversion_args(options.container, options.preset);

    task::spawn_blocking(move || run(&ffmpeg, &input, &output, &args)).await?
}

fn run(ffmpeg: &Path, input: &Path, output: &Path, args: &[String]) -> Result<(), ConversionError> {
    let mut command = FfmpegCommand::new_with_path(ffmpeg);
    command
        .hide_banner()
        .overwrite()
        .input(
            input
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("non UTF-8 input path"))?,
        )
        .args(args)
        .output(
            output
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("non UTF-8 output path"))?,
        );

    let mut child = command.spawn()?;
    let mut errors = Vec::new();
    for event in child.iter()? {
        match event {
            FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, msg) => {
                warn!("[FFmpeg] {}", msg);
                errors.push(msg);
            }
            FfmpegEvent::Log(level, msg) => debug!("[FFmpeg {:?}] {}", level, msg),
            FfmpegEvent::Error(e) => errors.push(e),
            FfmpegEvent::Done => debug!("FFmpeg finished processing: {}", output.display()),
            _ => {}
        }
    }

    let status = child.wait()?;
    if !status.success() {
        return Err(ConversionError::Failed {
            status: status.to_string(),
            detail: errors.join("; "),
        });
    }

    info!(output = %output.display(), "conversion finished");
    Ok(())
}
