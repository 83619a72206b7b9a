use super::Transport;
use crate::error::{PlayerError, Result};
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWrite {
    pub at: Instant,
    pub bytes: Vec<u8>,
}

/// Records every successful write. Clones share the same log, so a test can
/// keep one handle while the player owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    writes: Arc<Mutex<Vec<RecordedWrite>>>,
    attempts: Arc<Mutex<usize>>,
    failing: Vec<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the write attempt with this zero-based index fail.
    pub fn fail_on(mut self, attempt: usize) -> Self {
        self.failing.push(attempt);
        self
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn written_bytes(&self) -> Vec<Vec<u8>> {
        self.writes().into_iter().map(|w| w.bytes).collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.lock().map(|a| *a).unwrap_or_default()
    }
}

impl Transport for MockTransport {
    fn write_message(&mut self, bytes: &[u8]) -> Result<()> {
        let attempt = {
            let mut attempts = self
                .attempts
                .lock()
                .map_err(|_| PlayerError::TransportWrite("mock lock poisoned".into()))?;
            let current = *attempts;
            *attempts += 1;
            current
        };

        if self.failing.contains(&attempt) {
            return Err(PlayerError::TransportWrite(format!(
                "mock failure on write {}",
                attempt
            )));
        }

        self.writes
            .lock()
            .map_err(|_| PlayerError::TransportWrite("mock lock poisoned".into()))?
            .push(RecordedWrite {
                at: Instant::now(),
                bytes: bytes.to_vec(),
            });
        Ok(())
    }
}
