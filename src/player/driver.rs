use super::cancel::{CancelToken, Wait};
use super::panic::{panic_off, CleanupReport};
use crate::error::{PlayerError, Result};
use crate::midi::Event;
use crate::transport::Transport;
use indicatif::ProgressBar;
use log::{debug, error, info, trace};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    OpeningTransport,
    Playing,
    Cleanup,
    Stopped,
}

/// How a playback run ended.
#[derive(Debug)]
pub enum PlaybackOutcome {
    Completed,
    Cancelled,
    Failed(PlayerError),
}

impl PlaybackOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PlaybackOutcome::Completed)
    }
}

#[derive(Debug)]
pub struct PlaybackReport {
    pub outcome: PlaybackOutcome,
    pub events_sent: usize,
    pub transport_opened: bool,
    pub cleanup: CleanupReport,
}

/// Plays an event stream onto a transport in real time and silences every
/// channel afterwards, however playback ended.
pub struct PlaybackDriver {
    cancel: CancelToken,
    settle: Duration,
    progress: ProgressBar,
    state: DriverState,
}

impl PlaybackDriver {
    pub fn new(cancel: CancelToken, settle: Duration) -> Self {
        Self {
            cancel,
            settle,
            progress: ProgressBar::hidden(),
            state: DriverState::Idle,
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Sizes the progress bar to the number of events about to be played.
    pub fn expect_events(&self, count: usize) {
        self.progress.set_length(count as u64);
    }

    /// Opens the transport with `open`, then waits and writes each event in
    /// order. Returns after panic-off has run.
    pub fn start<I, T, F>(&mut self, events: I, open: F) -> PlaybackReport
    where
        I: IntoIterator<Item = Result<Event>>,
        T: Transport,
        F: FnOnce() -> Result<T>,
    {
        let mut transport: Option<T> = None;
        let mut events_sent = 0;

        let outcome = self.play(events, open, &mut transport, &mut events_sent);
        match &outcome {
            PlaybackOutcome::Completed => {
                info!("Playback completed after {} events", events_sent)
            }
            PlaybackOutcome::Cancelled => {
                info!("Playback cancelled after {} events", events_sent)
            }
            PlaybackOutcome::Failed(e) => {
                error!("Playback failed after {} events: {}", events_sent, e)
            }
        }

        self.finish(outcome, transport.as_mut(), events_sent)
    }

    /// Ends a run that failed before the transport was opened.
    pub fn abort(&mut self, error: PlayerError) -> PlaybackReport {
        error!("Playback aborted before start: {}", error);
        self.finish::<dyn Transport>(PlaybackOutcome::Failed(error), None, 0)
    }

    fn play<I, T, F>(
        &mut self,
        events: I,
        open: F,
        transport: &mut Option<T>,
        events_sent: &mut usize,
    ) -> PlaybackOutcome
    where
        I: IntoIterator<Item = Result<Event>>,
        T: Transport,
        F: FnOnce() -> Result<T>,
    {
        self.transition(DriverState::OpeningTransport);
        if self.cancel.is_cancelled() {
            return PlaybackOutcome::Cancelled;
        }

        let port = match open() {
            Ok(opened) => transport.insert(opened),
            Err(e) => return PlaybackOutcome::Failed(e),
        };
        if self.cancel.is_cancelled() {
            return PlaybackOutcome::Cancelled;
        }

        self.transition(DriverState::Playing);
        for item in events {
            let event = match item {
                Ok(event) => event,
                Err(e) => return PlaybackOutcome::Failed(e),
            };

            if self.cancel.wait(event.delay()) == Wait::Cancelled {
                return PlaybackOutcome::Cancelled;
            }

            trace!(
                "Event {} (channel {:?}) after {:?}",
                *events_sent,
                event.channel(),
                event.delay()
            );
            if let Err(e) = port.write_message(event.bytes()) {
                return PlaybackOutcome::Failed(e);
            }
            *events_sent += 1;
            self.progress.inc(1);
        }

        PlaybackOutcome::Completed
    }

    fn finish<T: Transport + ?Sized>(
        &mut self,
        outcome: PlaybackOutcome,
        transport: Option<&mut T>,
        events_sent: usize,
    ) -> PlaybackReport {
        self.transition(DriverState::Cleanup);
        let transport_opened = transport.is_some();
        let cleanup = panic_off(transport, self.settle);
        self.progress.finish_and_clear();
        self.transition(DriverState::Stopped);

        PlaybackReport {
            outcome,
            events_sent,
            transport_opened,
            cleanup,
        }
    }

    fn transition(&mut self, next: DriverState) {
        debug!("Driver state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
