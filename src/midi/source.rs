//! Standard MIDI File loading and tempo-resolved event streaming
//!
//! A [`MidiFile`] holds the raw file contents. [`MidiFile::events`] decodes
//! the whole container up front and returns an [`EventStream`] that merges
//! every track by absolute tick and converts tick deltas into real delays as
//! it goes, following the tempo map.

use crate::config::DEFAULT_TEMPO_US;
use crate::error::{PlayerError, Result};
use crate::midi::event::{encode_channel_message, encode_sysex, Event};
use log::{debug, info};
use midly::{Format, MetaMessage, Smf, Timing, TrackEventKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Raw contents of a MIDI file.
#[derive(Debug, Clone)]
pub struct MidiFile {
    path: Option<PathBuf>,
    data: Vec<u8>,
}

impl MidiFile {
    /// Reads the file at `path`. Any I/O failure maps to `FileNotFound`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| PlayerError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Read {} bytes from {}", data.len(), path.display());
        Ok(Self {
            path: Some(path.to_path_buf()),
            data,
        })
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { path: None, data }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Decodes the file and returns its merged event stream.
    pub fn events(&self) -> Result<EventStream<'_>> {
        check_chunks(&self.data)?;
        let smf = Smf::parse(&self.data)?;

        if let Format::Sequential = smf.header.format {
            return Err(PlayerError::MalformedFile(
                "format 2 (sequential tracks) is not supported".to_string(),
            ));
        }

        let clock = TickClock::from_timing(smf.header.timing)?;
        debug!(
            "Decoded {:?} file with {} track(s), timing {:?}",
            smf.header.format,
            smf.tracks.len(),
            smf.header.timing
        );

        Ok(EventStream::new(smf, clock))
    }
}

/// Walks the chunk layout of a plain SMF container. Every chunk must be
/// complete and the number of `MTrk` chunks must match the header.
fn check_chunks(data: &[u8]) -> Result<()> {
    if !data.starts_with(b"MThd") || data.len() < 14 {
        return Ok(());
    }
    let header_len = read_u32(data, 4) as usize;
    let declared = u16::from_be_bytes([data[10], data[11]]) as usize;

    let mut pos = 8usize.saturating_add(header_len);
    let mut found = 0usize;
    while pos < data.len() {
        if data.len() - pos < 8 {
            return Err(malformed("truncated chunk header"));
        }
        let len = read_u32(data, pos + 4) as usize;
        let body = pos + 8;
        if data.len() - body < len {
            return Err(malformed(format!(
                "chunk at byte {} declares {} bytes but only {} remain",
                pos,
                len,
                data.len() - body
            )));
        }
        if &data[pos..pos + 4] == b"MTrk" {
            found += 1;
        }
        pos = body + len;
    }

    if found != declared {
        return Err(malformed(format!(
            "header declares {} track(s) but {} present",
            declared, found
        )));
    }
    Ok(())
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn malformed(msg: impl Into<String>) -> PlayerError {
    PlayerError::MalformedFile(msg.into())
}

/// How ticks map onto seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TickClock {
    /// Tempo-dependent: ticks per quarter note
    Metrical { ticks_per_beat: u16 },
    /// Fixed: SMPTE frames per second times ticks per frame
    Timecode { secs_per_tick: f64 },
}

impl TickClock {
    fn from_timing(timing: Timing) -> Result<Self> {
        match timing {
            Timing::Metrical(tpb) => {
                let ticks_per_beat = tpb.as_int();
                if ticks_per_beat == 0 {
                    return Err(PlayerError::MalformedFile(
                        "header declares zero ticks per beat".to_string(),
                    ));
                }
                Ok(TickClock::Metrical { ticks_per_beat })
            }
            Timing::Timecode(fps, ticks_per_frame) => {
                let ticks_per_second = f64::from(fps.as_f32()) * f64::from(ticks_per_frame);
                if ticks_per_second <= 0.0 {
                    return Err(PlayerError::MalformedFile(
                        "header declares zero ticks per frame".to_string(),
                    ));
                }
                Ok(TickClock::Timecode {
                    secs_per_tick: 1.0 / ticks_per_second,
                })
            }
        }
    }

    fn secs_per_tick(&self, tempo_us: u32) -> f64 {
        match *self {
            TickClock::Metrical { ticks_per_beat } => {
                f64::from(tempo_us) / 1_000_000.0 / f64::from(ticks_per_beat)
            }
            TickClock::Timecode { secs_per_tick } => secs_per_tick,
        }
    }
}

#[derive(Debug, Clone)]
struct TrackCursor {
    pos: usize,
    next_tick: u64,
}

/// Merged, tempo-resolved events of one file. Consumed once, in order.
#[derive(Debug, Clone)]
pub struct EventStream<'a> {
    smf: Smf<'a>,
    clock: TickClock,
    cursors: Vec<TrackCursor>,
    tempo_us: u32,
    last_tick: u64,
    pending_secs: f64,
    remaining: usize,
}

impl<'a> EventStream<'a> {
    fn new(smf: Smf<'a>, clock: TickClock) -> Self {
        let cursors = smf
            .tracks
            .iter()
            .map(|track| TrackCursor {
                pos: 0,
                next_tick: track
                    .first()
                    .map_or(0, |event| u64::from(event.delta.as_int())),
            })
            .collect();

        let remaining = smf
            .tracks
            .iter()
            .flatten()
            .filter(|event| !matches!(event.kind, TrackEventKind::Meta(_)))
            .count();

        Self {
            smf,
            clock,
            cursors,
            tempo_us: DEFAULT_TEMPO_US,
            last_tick: 0,
            pending_secs: 0.0,
            remaining,
        }
    }

    /// Sum of all remaining delays.
    pub fn total_duration(&self) -> Duration {
        self.clone().map(|event| event.delay()).sum()
    }

    /// Track holding the earliest unread event; ties go to the lower index.
    fn next_track(&self) -> Option<usize> {
        self.cursors
            .iter()
            .enumerate()
            .filter(|(idx, cursor)| cursor.pos < self.smf.tracks[*idx].len())
            .min_by_key(|(idx, cursor)| (cursor.next_tick, *idx))
            .map(|(idx, _)| idx)
    }
}

impl<'a> Iterator for EventStream<'a> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            let idx = self.next_track()?;
            let track = &self.smf.tracks[idx];
            let cursor = &mut self.cursors[idx];
            let tick = cursor.next_tick;
            let event = track[cursor.pos];

            cursor.pos += 1;
            if let Some(following) = track.get(cursor.pos) {
                cursor.next_tick += u64::from(following.delta.as_int());
            }

            let delta_ticks = tick.saturating_sub(self.last_tick);
            self.pending_secs += delta_ticks as f64 * self.clock.secs_per_tick(self.tempo_us);
            self.last_tick = tick;

            let bytes = match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                    self.tempo_us = tempo.as_int();
                    debug!("Tempo change at tick {}: {} us/beat", tick, self.tempo_us);
                    continue;
                }
                TrackEventKind::Meta(_) => continue,
                TrackEventKind::Midi { channel, message } => {
                    encode_channel_message(channel.as_int(), &message)
                }
                TrackEventKind::SysEx(payload) => encode_sysex(payload),
                TrackEventKind::Escape(raw) => raw.to_vec(),
            };

            self.remaining = self.remaining.saturating_sub(1);
            let delay = std::mem::take(&mut self.pending_secs);
            return Some(Event::from_secs_f64(delay, bytes));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> ExactSizeIterator for EventStream<'a> {}
