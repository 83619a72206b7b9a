use indicatif::{ProgressBar, ProgressStyle};

/// Event counter shown while a file plays. Its length is set once the file
/// has been decoded.
pub fn create_playback_progress() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{prefix:.bold} [{bar:40.cyan}] {pos}/{len} {elapsed_precise}")
        .map(|style| style.progress_chars("⣀⣤⣦⣶⣷⣿ "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_prefix("Playing");
    pb
}
