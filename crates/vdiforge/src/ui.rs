//! Terminal progress reporting for the artifact download.

use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

use vdiforge_fetch::{FetchPhase, Progress};

const PB_STYLE: &str =
    "{spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<ProgressStyle> = Lazy::new(|| {
    ProgressStyle::with_template(PB_STYLE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_chars(TICK)
        .progress_chars(PB_CHARS)
});

/// Byte-progress bar fed from [`Progress`] callbacks.
pub struct DownloadBar {
    pb: ProgressBar,
}

impl DownloadBar {
    pub fn new() -> Self {
        let pb = ProgressBar::no_length();
        pb.set_style(PB_TEMPLATE.clone());
        Self { pb }
    }

    pub fn observe(&self, progress: &Progress) {
        if let Some(total) = progress.total_bytes {
            self.pb.set_length(total);
        }
        match progress.phase {
            FetchPhase::Connecting => {}
            FetchPhase::Downloading => self.pb.set_position(progress.bytes_downloaded),
            FetchPhase::Committing | FetchPhase::Completed => {
                self.pb.set_position(progress.bytes_downloaded);
            }
        }
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl Default for DownloadBar {
    fn default() -> Self {
        Self::new()
    }
}
