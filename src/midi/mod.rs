//! MIDI functionality for FloppIO
//!
//! This module turns Standard MIDI Files into wire-ready events:
//! - [`MidiFile`] loads and decodes a file
//! - [`EventStream`] merges its tracks and resolves the tempo map
//! - [`Event`] is one raw MIDI message with its pre-delay
//!
mod event;
mod source;

pub use event::{all_notes_off, encode_channel_message, encode_sysex, Event};
pub use source::{EventStream, MidiFile};
