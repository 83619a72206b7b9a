//! Real-time playback
//!
//! - [`PlaybackDriver`] waits out each event's delay and writes it to the
//!   transport, then always runs [`panic_off`]
//! - [`CancelToken`] is the interruptible wait the driver sleeps on
//! - [`panic_off`] silences all 16 channels

mod cancel;
mod driver;
mod panic;

pub use cancel::{CancelToken, Wait};
pub use driver::{DriverState, PlaybackDriver, PlaybackOutcome, PlaybackReport};
pub use panic::{panic_off, CleanupReport};
