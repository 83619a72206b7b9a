use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a playback run.
#[derive(Error, Debug)]
pub enum PlayerError {
    /// No MIDI file was given on the command line
    #[error("Please specify the midi file.")]
    MissingArgument,

    /// The MIDI file path does not resolve to a readable file
    #[error("File not found.")]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file could not be decoded as a playable Standard MIDI File
    #[error("Malformed MIDI file: {0}")]
    MalformedFile(String),

    /// The serial device could not be opened
    #[error("Could not open serial device {device}: {source}")]
    TransportOpen {
        device: String,
        #[source]
        source: io::Error,
    },

    /// A write to the transport failed or was short
    #[error("Serial write failed: {0}")]
    TransportWrite(String),

    /// A configuration source or value was invalid
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PlayerError {
    /// Errors raised before the transport could have been opened.
    pub fn is_fatal_startup(&self) -> bool {
        matches!(
            self,
            PlayerError::MissingArgument
                | PlayerError::FileNotFound { .. }
                | PlayerError::MalformedFile(_)
                | PlayerError::Config(_)
        )
    }
}

impl From<midly::Error> for PlayerError {
    fn from(err: midly::Error) -> Self {
        PlayerError::MalformedFile(err.to_string())
    }
}

impl From<::config::ConfigError> for PlayerError {
    fn from(err: ::config::ConfigError) -> Self {
        PlayerError::Config(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlayerError>;
