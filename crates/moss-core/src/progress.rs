/// Trait for reporting submission and report-download progress.
///
/// The CLI implements it with indicatif bars. All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_connected(&self, _address: &str) {}
    fn on_upload_start(&self, _total_files: usize, _total_bytes: u64) {}
    fn on_file_uploaded(&self, _file_name: &str, _bytes: u64) {}
    fn on_query_sent(&self) {}
    fn on_report_start(&self, _total_pages: usize) {}
    fn on_page_fetched(&self, _page_name: &str) {}
    fn on_report_complete(&self, _pages_written: usize) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
