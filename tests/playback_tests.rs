use floppio::player::{CancelToken, DriverState, PlaybackDriver, PlaybackOutcome};
use floppio::{Event, MockTransport, PlayerError, Result};
use std::io;
use std::thread;
use std::time::{Duration, Instant};

fn event(delay_ms: u64, bytes: &[u8]) -> Result<Event> {
    Ok(Event::new(Duration::from_millis(delay_ms), bytes.to_vec()))
}

fn all_off() -> Vec<Vec<u8>> {
    (0..16u8).map(|c| vec![0xB0 | c, 0x7B, 0x00]).collect()
}

fn driver(cancel: CancelToken) -> PlaybackDriver {
    PlaybackDriver::new(cancel, Duration::ZERO)
}

#[test]
fn test_two_note_stream_timing_and_cleanup() {
    let mock = MockTransport::new();
    let handle = mock.clone();
    let start = Instant::now();

    let report = driver(CancelToken::new()).start(
        vec![
            event(0, &[0x90, 0x3C, 0x64]),
            event(500, &[0x80, 0x3C, 0x00]),
        ],
        move || Ok(mock),
    );

    assert!(report.outcome.is_completed());
    assert_eq!(report.events_sent, 2);

    let writes = handle.writes();
    assert_eq!(writes.len(), 18);
    assert_eq!(writes[0].bytes, vec![0x90, 0x3C, 0x64]);
    assert_eq!(writes[1].bytes, vec![0x80, 0x3C, 0x00]);
    let tail: Vec<Vec<u8>> = writes[2..].iter().map(|w| w.bytes.clone()).collect();
    assert_eq!(tail, all_off());

    assert!(writes[0].at.duration_since(start) < Duration::from_millis(100));
    let gap = writes[1].at.duration_since(writes[0].at);
    assert!(
        gap >= Duration::from_millis(495) && gap < Duration::from_millis(800),
        "gap was {:?}",
        gap
    );
}

#[test]
fn test_order_is_preserved() {
    let events: Vec<Result<Event>> = (0..40u8)
        .map(|i| event(0, &[0x90 | (i % 16), i, 0x40]))
        .collect();
    let expected: Vec<Vec<u8>> = events
        .iter()
        .map(|e| e.as_ref().unwrap().bytes().to_vec())
        .collect();

    let mock = MockTransport::new();
    let handle = mock.clone();
    let report = driver(CancelToken::new()).start(events, move || Ok(mock));

    assert!(report.outcome.is_completed());
    let written = handle.written_bytes();
    assert_eq!(&written[..40], &expected[..]);
    assert_eq!(&written[40..], &all_off()[..]);
}

#[test]
fn test_each_delay_is_honoured() {
    let delays = [20u64, 60, 0, 40];
    let events: Vec<Result<Event>> = delays
        .iter()
        .enumerate()
        .map(|(i, d)| event(*d, &[0xC0, i as u8]))
        .collect();

    let mock = MockTransport::new();
    let handle = mock.clone();
    driver(CancelToken::new()).start(events, move || Ok(mock));

    let writes = handle.writes();
    for (i, delay) in delays.iter().enumerate().skip(1) {
        let gap = writes[i].at.duration_since(writes[i - 1].at);
        let expected = Duration::from_millis(*delay);
        assert!(gap >= expected, "event {} came early: {:?}", i, gap);
        assert!(
            gap < expected + Duration::from_millis(150),
            "event {} came late: {:?}",
            i,
            gap
        );
    }
}

#[test]
fn test_cancel_during_wait_stops_before_next_event() {
    let cancel = CancelToken::new();
    let remote = cancel.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        remote.cancel();
    });

    let mock = MockTransport::new();
    let handle = mock.clone();
    let start = Instant::now();
    let report = driver(cancel).start(
        vec![
            event(0, &[0x90, 0x3C, 0x64]),
            event(5_000, &[0x90, 0x3E, 0x64]),
            event(0, &[0x90, 0x40, 0x64]),
        ],
        move || Ok(mock),
    );
    canceller.join().unwrap();

    assert!(matches!(report.outcome, PlaybackOutcome::Cancelled));
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(report.events_sent, 1);

    let written = handle.written_bytes();
    assert_eq!(written[0], vec![0x90, 0x3C, 0x64]);
    assert_eq!(&written[1..], &all_off()[..]);
}

#[test]
fn test_write_failure_mid_stream_still_cleans_up() {
    // Second write fails, panic-off continues on the same transport
    let mock = MockTransport::new().fail_on(1);
    let handle = mock.clone();

    let report = driver(CancelToken::new()).start(
        vec![
            event(0, &[0x90, 0x3C, 0x64]),
            event(0, &[0x90, 0x3E, 0x64]),
            event(0, &[0x90, 0x40, 0x64]),
        ],
        move || Ok(mock),
    );

    assert!(matches!(
        report.outcome,
        PlaybackOutcome::Failed(PlayerError::TransportWrite(_))
    ));
    assert_eq!(report.events_sent, 1);
    assert_eq!(report.cleanup.sent, 16);

    let written = handle.written_bytes();
    assert_eq!(written.len(), 17);
    assert_eq!(written[0], vec![0x90, 0x3C, 0x64]);
    assert_eq!(&written[1..], &all_off()[..]);
}

#[test]
fn test_open_failure_reports_and_noops_cleanup() {
    let mut driver = driver(CancelToken::new());
    let report = driver.start(vec![event(0, &[0x90, 0x3C, 0x64])], || {
        Err::<MockTransport, _>(PlayerError::TransportOpen {
            device: "/dev/serial0".into(),
            source: io::Error::new(io::ErrorKind::Other, "device busy"),
        })
    });

    assert!(matches!(
        report.outcome,
        PlaybackOutcome::Failed(PlayerError::TransportOpen { .. })
    ));
    assert!(!report.transport_opened);
    assert!(report.cleanup.is_noop());
    assert_eq!(report.events_sent, 0);
    assert_eq!(driver.state(), DriverState::Stopped);
}

#[test]
fn test_cancel_during_open_skips_events() {
    let cancel = CancelToken::new();
    let remote = cancel.clone();

    let mock = MockTransport::new();
    let handle = mock.clone();
    let report = driver(cancel).start(vec![event(0, &[0x90, 0x3C, 0x64])], move || {
        remote.cancel();
        Ok(mock)
    });

    assert!(matches!(report.outcome, PlaybackOutcome::Cancelled));
    assert!(report.transport_opened);
    assert_eq!(handle.written_bytes(), all_off());
}

#[test]
fn test_driver_can_replay() {
    let mut driver = driver(CancelToken::new());
    let mock = MockTransport::new();
    let handle = mock.clone();

    let first = mock.clone();
    driver.start(vec![event(0, &[0xF8])], move || Ok(first));
    driver.start(vec![event(0, &[0xF8])], move || Ok(mock));

    assert_eq!(handle.written_bytes().len(), 34);
}
