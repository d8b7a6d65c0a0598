//! `MediaToolkit` backed by the `ffprobe` and `ffmpeg` executables.

use crate::config::ToolConfig;
use crate::domain::av::remux::processing_path;
use crate::domain::av::stream::{from_probe_json, StreamProperties};
use crate::error::MediaError;
use crate::ports::media::MediaToolkit;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

#[derive(Clone, Debug)]
pub struct FfmpegCli {
    config: ToolConfig,
}

impl FfmpegCli {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }
}

impl Default for FfmpegCli {
    fn default() -> Self {
        Self::new(ToolConfig::default())
    }
}

/// Run `command` to completion, killing it once `limit` elapses.
async fn run(mut command: Command, limit: Duration) -> Result<Output, RunError> {
    command.kill_on_drop(true);
    match tokio::time::timeout(limit, command.output()).await {
        Ok(output) => output.map_err(RunError::Spawn),
        Err(_) => Err(RunError::TimedOut(limit)),
    }
}

enum RunError {
    Spawn(io::Error),
    TimedOut(Duration),
}

impl RunError {
    fn describe(self, tool: &Path) -> String {
        match self {
            RunError::Spawn(e) => format!("failed to run {}: {e}", tool.display()),
            RunError::TimedOut(limit) => format!("{} timed out after {limit:?}", tool.display()),
        }
    }
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

#[async_trait]
impl MediaToolkit for FfmpegCli {
    async fn probe(&self, path: &Path) -> Result<StreamProperties, MediaError> {
        let tool = &self.config.ffprobe_path;
        let mut command = Command::new(tool);
        command
            .arg("-v")
            .arg("error")
            .arg("-print_format")
            .arg("json")
            .arg("-show_streams")
            .arg(path);

        let output = run(command, self.config.probe_timeout)
            .await
            .map_err(|e| MediaError::Probe(e.describe(tool)))?;
        if !output.status.success() {
            return Err(MediaError::Probe(format!(
                "ffprobe exited with {}: {}",
                output.status,
                stderr_of(&output)
            )));
        }

        from_probe_json(&output.stdout)
    }

    async fn remux(&self, path: &Path) -> Result<PathBuf, MediaError> {
        let tool = &self.config.ffmpeg_path;
        let output_path = processing_path(path);

        let mut command = Command::new(tool);
        command
            .arg("-y")
            .arg("-i")
            .arg(path)
            .arg("-movflags")
            .arg("faststart")
            .arg("-codec")
            .arg("copy")
            .arg("-f")
            .arg("mp4")
            .arg(&output_path);

        let output = run(command, self.config.remux_timeout)
            .await
            .map_err(|e| MediaError::Remux(e.describe(tool)))?;
        if !output.status.success() {
            return Err(MediaError::Remux(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr_of(&output)
            )));
        }

        tracing::debug!(input = %path.display(), output = %output_path.display(), "remuxed with faststart");
        Ok(output_path)
    }
}
