// app.rs

use crate::config::CHANNEL_COUNT;
use crate::error::{PlayerError, Result};
use crate::midi::MidiFile;
use crate::player::{PlaybackDriver, PlaybackOutcome, PlaybackReport};
use crate::transport::Transport;
use crate::ui::format_duration;
use log::info;
use std::path::Path;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_INTERRUPTED: i32 = 130;

/// Resolves the file argument and reads the file. Runs before any
/// transport exists.
pub fn load(path: Option<&Path>) -> Result<MidiFile> {
    let path = path.ok_or(PlayerError::MissingArgument)?;
    info!("Loading MIDI file {}", path.display());
    MidiFile::open(path)
}

/// Decodes `file` and plays it through `driver`. A decode failure is
/// reported before `open` is ever called.
pub fn play<T, F>(file: &MidiFile, driver: &mut PlaybackDriver, open: F) -> PlaybackReport
where
    T: Transport,
    F: FnOnce() -> Result<T>,
{
    match file.events() {
        Ok(stream) => {
            let name = file
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<memory>".to_string());
            info!(
                "Playing {}: {} events, {}",
                name,
                stream.len(),
                format_duration(stream.total_duration())
            );
            driver.expect_events(stream.len());
            driver.start(stream.map(Ok), open)
        }
        Err(e) => driver.abort(e),
    }
}

/// One line of user-facing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    /// Goes to stdout
    Info(String),
    /// Goes to stderr
    Error(String),
}

/// `[FATAL]` for startup errors, `[ERROR]` for everything else.
pub fn error_line(error: &PlayerError) -> String {
    let marker = if error.is_fatal_startup() {
        "[FATAL]"
    } else {
        "[ERROR]"
    };
    format!("{} {}", marker, error)
}

/// Lines printed once a playback run has ended.
pub fn status_lines(report: &PlaybackReport) -> Vec<StatusLine> {
    let mut lines = match &report.outcome {
        PlaybackOutcome::Completed => {
            vec![StatusLine::Info("Done playing file. Goodbye".to_string())]
        }
        PlaybackOutcome::Cancelled => vec![
            StatusLine::Info("Interrupted by user.".to_string()),
            StatusLine::Info("Closing up.".to_string()),
        ],
        PlaybackOutcome::Failed(e) => vec![
            StatusLine::Error(error_line(e)),
            StatusLine::Error("Closing up.".to_string()),
        ],
    };

    if report.cleanup.failed > 0 {
        lines.push(StatusLine::Error(format!(
            "[WARN] {} of {} All Notes Off messages could not be sent",
            report.cleanup.failed, CHANNEL_COUNT
        )));
    }
    lines
}

pub fn exit_code_for_error(error: &PlayerError) -> i32 {
    match error {
        PlayerError::MissingArgument => EXIT_USAGE,
        _ => EXIT_FAILURE,
    }
}

pub fn exit_code(outcome: &PlaybackOutcome) -> i32 {
    match outcome {
        PlaybackOutcome::Completed => EXIT_OK,
        PlaybackOutcome::Cancelled => EXIT_INTERRUPTED,
        PlaybackOutcome::Failed(e) => exit_code_for_error(e),
    }
}
