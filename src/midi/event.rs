use midly::MidiMessage;
use std::time::Duration;

/// One MIDI wire message and the real time to wait before sending it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    delay: Duration,
    bytes: Vec<u8>,
}

impl Event {
    pub fn new(delay: Duration, bytes: Vec<u8>) -> Self {
        Self { delay, bytes }
    }

    /// Builds an event from a delay in seconds. Negative or non-finite
    /// delays are treated as zero.
    pub fn from_secs_f64(delay_secs: f64, bytes: Vec<u8>) -> Self {
        let delay = if delay_secs.is_finite() && delay_secs > 0.0 {
            Duration::try_from_secs_f64(delay_secs).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        Self::new(delay, bytes)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Channel of a channel-voice message, `None` for system messages.
    pub fn channel(&self) -> Option<u8> {
        match self.bytes.first() {
            Some(&status) if (0x80..0xF0).contains(&status) => Some(status & 0x0F),
            _ => None,
        }
    }
}

/// Encodes a channel-voice message as status byte plus data bytes.
pub fn encode_channel_message(channel: u8, message: &MidiMessage) -> Vec<u8> {
    let ch = channel & 0x0F;
    match *message {
        MidiMessage::NoteOff { key, vel } => vec![0x80 | ch, key.as_int(), vel.as_int()],
        MidiMessage::NoteOn { key, vel } => vec![0x90 | ch, key.as_int(), vel.as_int()],
        MidiMessage::Aftertouch { key, vel } => vec![0xA0 | ch, key.as_int(), vel.as_int()],
        MidiMessage::Controller { controller, value } => {
            vec![0xB0 | ch, controller.as_int(), value.as_int()]
        }
        MidiMessage::ProgramChange { program } => vec![0xC0 | ch, program.as_int()],
        MidiMessage::ChannelAftertouch { vel } => vec![0xD0 | ch, vel.as_int()],
        MidiMessage::PitchBend { bend } => {
            let value = bend.0.as_int();
            vec![0xE0 | ch, (value & 0x7F) as u8, ((value >> 7) & 0x7F) as u8]
        }
    }
}

/// Frames a file SysEx payload (which omits the leading `F0`) for the wire.
pub fn encode_sysex(payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(payload.len() + 2);
    bytes.push(0xF0);
    bytes.extend_from_slice(payload);
    if bytes.last() != Some(&0xF7) {
        bytes.push(0xF7);
    }
    bytes
}

/// The all-notes-off control change for one channel.
pub fn all_notes_off(channel: u8) -> [u8; 3] {
    [0xB0 | (channel & 0x0F), crate::config::ALL_NOTES_OFF, 0x00]
}
