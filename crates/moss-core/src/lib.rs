pub mod config;
pub mod error;
pub mod language;
pub mod progress;
pub mod report;
pub mod session;

pub use config::{AppConfig, SessionConfig};
pub use error::Error;
pub use language::Language;
pub use progress::{ProgressReporter, SilentReporter};
pub use report::{ReportFetcher, ReportSummary};
pub use session::{ResultId, SessionClient, SourceFile};
