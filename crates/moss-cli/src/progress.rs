use indicatif::{ProgressBar, ProgressStyle};
use moss_core::ProgressReporter;
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Upload phase: byte bar (sizes known when files are added)
/// - Waiting for the server: spinner
/// - Report download: page bar
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            f(pb);
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_connected(&self, address: &str) {
        eprintln!("  \x1b[32m✓\x1b[0m Connected to {}", address);
    }

    fn on_upload_start(&self, total_files: usize, total_bytes: u64) {
        let pb = ProgressBar::new(total_bytes);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Uploading [{bar:30.cyan/dim}] {bytes}/{total_bytes} {msg}",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars(TICK_CHARS),
        );
        pb.set_message(format!("({} files)", total_files));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_file_uploaded(&self, file_name: &str, bytes: u64) {
        self.with_bar(|pb| {
            pb.inc(bytes);
            pb.set_message(file_name.to_string());
        });
    }

    fn on_query_sent(&self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars(TICK_CHARS),
        );
        pb.set_message("Waiting for the server to compare submissions...");
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_report_start(&self, total_pages: usize) {
        let pb = ProgressBar::new(total_pages as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Fetching [{bar:30.cyan/dim}] {pos}/{len} pages {msg}",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars(TICK_CHARS),
        );
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_page_fetched(&self, page_name: &str) {
        self.with_bar(|pb| {
            pb.inc(1);
            pb.set_message(page_name.to_string());
        });
    }

    fn on_report_complete(&self, pages_written: usize) {
        self.finish_bar();
        eprintln!("  \x1b[32m✓\x1b[0m Report saved: {} pages", pages_written);
    }
}

impl Drop for CliReporter {
    fn drop(&mut self) {
        self.finish_bar();
    }
}
