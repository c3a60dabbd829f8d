pub mod files;
pub mod protocol;

pub use files::SourceFile;
pub use protocol::{parse_result_line, ResultId};

use crate::config::{SessionConfig, DEFAULT_PORT, DEFAULT_SERVER};
use crate::error::Error;
use crate::language::Language;
use crate::progress::{ProgressReporter, SilentReporter};
use protocol::LineChannel;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::Path;
use tracing::{debug, info, warn};

/// Base files are all uploaded under this id; submissions count up from 1.
const BASE_FILE_ID: usize = 0;

/// Builds one MOSS submission and runs the upload protocol against the server.
pub struct SessionClient {
    userid: u64,
    server: String,
    port: u16,
    config: SessionConfig,
    base_files: Vec<SourceFile>,
    files: Vec<SourceFile>,
}

impl SessionClient {
    pub fn new(userid: u64) -> Self {
        Self::with_server(userid, DEFAULT_SERVER, DEFAULT_PORT)
    }

    pub fn with_server(userid: u64, server: &str, port: u16) -> Self {
        Self {
            userid,
            server: server.to_string(),
            port,
            config: SessionConfig::default(),
            base_files: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn allowed_languages(&self) -> &'static [Language] {
        &Language::ALL
    }

    pub fn set_language(&mut self, lang: &str) -> Result<(), Error> {
        self.config.set_language(lang)
    }

    pub fn set_directory_mode(&mut self, enabled: bool) {
        self.config.set_directory_mode(enabled);
    }

    pub fn set_ignore_limit(&mut self, limit: i64) -> Result<(), Error> {
        self.config.set_ignore_limit(limit)
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.config.set_comment(comment);
    }

    pub fn set_result_limit(&mut self, limit: i64) -> Result<(), Error> {
        self.config.set_result_limit(limit)
    }

    pub fn set_experimental(&mut self, enabled: bool) {
        self.config.set_experimental(enabled);
    }

    pub fn add_base_file(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        self.base_files.push(SourceFile::open(path)?);
        Ok(())
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        self.files.push(SourceFile::open(path)?);
        Ok(())
    }

    /// Add every file matching `pattern` in glob order. Returns how many were added.
    ///
    /// Matching directories are skipped. The first match that cannot be added stops the
    /// expansion; matches before it stay added.
    pub fn add_by_wildcard(&mut self, pattern: &str) -> Result<usize, Error> {
        let matched = files::expand_pattern(pattern)?;
        for path in &matched {
            self.add_file(path)?;
        }
        Ok(matched.len())
    }

    /// Base-file counterpart of [`SessionClient::add_by_wildcard`].
    pub fn add_base_by_wildcard(&mut self, pattern: &str) -> Result<usize, Error> {
        let matched = files::expand_pattern(pattern)?;
        for path in &matched {
            self.add_base_file(path)?;
        }
        Ok(matched.len())
    }

    pub fn base_files(&self) -> &[SourceFile] {
        &self.base_files
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Submit everything to the server and wait for the result id.
    pub fn send(&self) -> Result<ResultId, Error> {
        self.send_with(&SilentReporter)
    }

    pub fn send_with(&self, reporter: &dyn ProgressReporter) -> Result<ResultId, Error> {
        let address = format!("{}:{}", self.server, self.port);
        info!("Connecting to {}", address);
        let stream = TcpStream::connect(&address).map_err(|source| Error::Connection {
            address: address.clone(),
            source,
        })?;
        reporter.on_connected(&address);
        self.send_over(stream, reporter)
    }

    /// Run the protocol over an already-open transport. The transport is dropped on return.
    pub fn send_over<S: Read + Write>(
        &self,
        stream: S,
        reporter: &dyn ProgressReporter,
    ) -> Result<ResultId, Error> {
        let mut channel = LineChannel::new(stream);
        let config = &self.config;

        channel.send_line(&format!("moss {}", self.userid))?;
        channel.send_line(&format!("directory {}", config.directory_mode() as u8))?;
        channel.send_line(&format!("X {}", config.experimental() as u8))?;
        channel.send_line(&format!("maxmatches {}", config.ignore_limit()))?;
        channel.send_line(&format!("show {}", config.result_limit()))?;
        channel.send_line(&format!("language {}", config.language()))?;

        let reply = channel.read_line().unwrap_or_else(|e| {
            warn!("Failed to read the language reply: {}", e);
            None
        });
        if reply.unwrap_or_default().trim() == "no" {
            warn!("Server rejected language {}", config.language());
            if let Err(e) = channel.send_line("end") {
                debug!("Failed to send end after rejection: {}", e);
            }
            return Err(Error::UnsupportedLanguage(config.language().to_string()));
        }

        let total_bytes = self
            .base_files
            .iter()
            .chain(&self.files)
            .map(SourceFile::size)
            .sum();
        reporter.on_upload_start(self.base_files.len() + self.files.len(), total_bytes);

        for file in &self.base_files {
            self.upload_file(&mut channel, file, BASE_FILE_ID, reporter)?;
        }
        for (index, file) in self.files.iter().enumerate() {
            self.upload_file(&mut channel, file, index + 1, reporter)?;
        }
        info!(
            "Uploaded {} base files and {} submissions",
            self.base_files.len(),
            self.files.len()
        );

        channel.send_line(&format!("query 0 {}", config.comment()))?;
        reporter.on_query_sent();
        let response = channel.read_line();
        if let Err(e) = channel.send_line("end") {
            debug!("Failed to send end: {}", e);
        }

        let response = match response {
            Ok(Some(line)) => line,
            Ok(None) => return Err(Error::UnexpectedResponse(String::new())),
            Err(e) => {
                warn!("Failed to read the result line: {}", e);
                return Err(Error::UnexpectedResponse(e.to_string()));
            }
        };
        let id = parse_result_line(&response)?;
        info!("Server returned result {}", id);
        Ok(id)
    }

    fn upload_file<S: Read + Write>(
        &self,
        channel: &mut LineChannel<S>,
        file: &SourceFile,
        id: usize,
        reporter: &dyn ProgressReporter,
    ) -> Result<(), Error> {
        let content = file.read()?;
        let name = file.wire_name();
        if content.len() as u64 != file.size() {
            warn!(
                "{} changed size since it was added ({} -> {} bytes)",
                file.path().display(),
                file.size(),
                content.len()
            );
        }
        channel.send_line(&format!(
            "file {} {} {} {}",
            id,
            self.config.language(),
            content.len(),
            name
        ))?;
        channel.send_bytes(&content)?;
        reporter.on_file_uploaded(&name, content.len() as u64);
        Ok(())
    }
}
