use crate::config::CHANNEL_COUNT;
use crate::midi::all_notes_off;
use crate::transport::Transport;
use log::{info, warn};
use std::thread;
use std::time::Duration;

/// What the panic-off pass managed to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanupReport {
    pub sent: usize,
    pub failed: usize,
}

impl CleanupReport {
    /// No transport was open, so nothing was attempted.
    pub fn is_noop(&self) -> bool {
        self.sent == 0 && self.failed == 0
    }
}

/// Sends All Notes Off to channels 0 through 15, pausing `settle` after
/// each message. Never fails: write errors are logged and the remaining
/// channels are still attempted.
pub fn panic_off<T: Transport + ?Sized>(
    transport: Option<&mut T>,
    settle: Duration,
) -> CleanupReport {
    let mut report = CleanupReport::default();
    let Some(transport) = transport else {
        info!("Panic-off skipped, transport was never opened");
        return report;
    };

    for channel in 0..CHANNEL_COUNT {
        match transport.write_message(&all_notes_off(channel)) {
            Ok(()) => report.sent += 1,
            Err(e) => {
                warn!("All Notes Off failed on channel {}: {}", channel, e);
                report.failed += 1;
            }
        }
        thread::sleep(settle);
    }

    info!(
        "Panic-off finished: {} sent, {} failed",
        report.sent, report.failed
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_unopened_transport_is_noop() {
        let report = panic_off::<MockTransport>(None, Duration::from_millis(10));
        assert!(report.is_noop());
    }

    #[test]
    fn test_all_channels_in_ascending_order() {
        let mut transport = MockTransport::new();
        let report = panic_off(Some(&mut transport), Duration::ZERO);

        assert_eq!(report, CleanupReport { sent: 16, failed: 0 });
        let expected: Vec<Vec<u8>> = (0..16u8).map(|c| vec![0xB0 | c, 0x7B, 0x00]).collect();
        assert_eq!(transport.written_bytes(), expected);
    }

    #[test]
    fn test_failures_do_not_stop_remaining_channels() {
        let mut transport = MockTransport::new().fail_on(0).fail_on(7);
        let report = panic_off(Some(&mut transport), Duration::ZERO);

        assert_eq!(report, CleanupReport { sent: 14, failed: 2 });
        assert_eq!(transport.attempts(), 16);
        let channels: Vec<u8> = transport
            .written_bytes()
            .iter()
            .map(|b| b[0] & 0x0F)
            .collect();
        assert!(!channels.contains(&0));
        assert!(!channels.contains(&7));
        assert_eq!(channels.last(), Some(&15));
    }

    #[test]
    fn test_settle_pause_between_messages() {
        let mut transport = MockTransport::new();
        panic_off(Some(&mut transport), Duration::from_millis(10));

        let writes = transport.writes();
        for pair in writes.windows(2) {
            assert!(pair[1].at.duration_since(pair[0].at) >= Duration::from_millis(10));
        }
    }

    #[test]
    fn test_repeated_invocation_is_safe() {
        let mut transport = MockTransport::new();
        panic_off(Some(&mut transport), Duration::ZERO);
        panic_off(Some(&mut transport), Duration::ZERO);
        assert_eq!(transport.written_bytes().len(), 32);
    }
}
