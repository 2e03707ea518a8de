//! Progress reporting for CLI

use crate::application::ProgressCallback;
use crate::domain::entities::ScanProgress;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

/// Progress reporter using indicatif
pub struct ProgressReporter {
    bar: Arc<ProgressBar>,
}

impl ProgressReporter {
    /// Byte progress bar; a spinner when the image size is unknown
    pub fn for_scan(total: Option<u64>) -> Self {
        let bar = match total {
            Some(total) => {
                let bar = ProgressBar::new(total);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                bar
            }
            None => ProgressBar::new_spinner(),
        };
        bar.set_message("Scanning image...".to_string());

        Self { bar: Arc::new(bar) }
    }

    /// A reporter that draws nothing
    pub fn hidden() -> Self {
        Self {
            bar: Arc::new(ProgressBar::hidden()),
        }
    }

    /// Finishes with a message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Clears the bar from the terminal
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }

    /// Gets a callback for scan progress
    pub fn scan_callback(&self) -> ProgressCallback {
        let bar = Arc::clone(&self.bar);
        Box::new(move |progress: &ScanProgress| {
            bar.set_position(progress.scanned_bytes);
            bar.set_message(format!("Found {} files", progress.jobs_found));
        })
    }
}
