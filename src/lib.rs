pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod midi;
pub mod player;
pub mod transport;
pub mod ui;

pub use crate::cli::Args;
pub use crate::config::PlayerConfig;
pub use crate::error::{PlayerError, Result};
pub use crate::midi::{Event, EventStream, MidiFile};
pub use crate::player::{CancelToken, PlaybackDriver, PlaybackOutcome, PlaybackReport};
pub use crate::transport::{MockTransport, SerialTransport, Transport};
