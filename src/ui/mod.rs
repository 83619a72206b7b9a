//! Terminal output
//!
//! The banner and the playback progress bar, built with indicatif.

mod progress;

pub use progress::create_playback_progress;

const BANNER: &str = r#"
  ______ _                  _____ ____
 |  ____| |                |_   _/ __ \
 | |__  | | ___  _ __  _ __  | || |  | |
 |  __| | |/ _ \| '_ \| '_ \ | || |  | |
 | |    | | (_) | |_) | |_) || || |__| |
 |_|    |_|\___/| .__/| .__/_____\____/
                | |   | |
                |_|   |_|
"#;

pub fn print_banner() {
    println!("{}", BANNER);
}

/// Formats a duration as `m:ss`.
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
