use crate::error::Error;
use regex::Regex;
use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::debug;

/// Identifier of one completed comparison run, as assigned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultId(pub u64);

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResultId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ResultId)
    }
}

/// Line-oriented view over one protocol connection.
pub(crate) struct LineChannel<S: Read + Write> {
    inner: BufReader<S>,
}

impl<S: Read + Write> LineChannel<S> {
    pub(crate) fn new(stream: S) -> Self {
        Self {
            inner: BufReader::new(stream),
        }
    }

    pub(crate) fn send_line(&mut self, line: &str) -> io::Result<()> {
        debug!("> {}", line);
        let stream = self.inner.get_mut();
        stream.write_all(line.as_bytes())?;
        stream.write_all(b"\n")
    }

    pub(crate) fn send_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.get_mut().write_all(bytes)
    }

    /// Read one line. `None` on end of stream. Bytes that are not UTF-8 are replaced.
    pub(crate) fn read_line(&mut self) -> io::Result<Option<String>> {
        self.inner.get_mut().flush()?;
        let mut line = Vec::new();
        if self.inner.read_until(b'\n', &mut line)? == 0 {
            debug!("< <end of stream>");
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&line).into_owned();
        debug!("< {}", line.trim_end());
        Ok(Some(line))
    }
}

fn result_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\S*results/(\d+)(?:/\S*)?$").expect("result line pattern is valid")
    })
}

/// Extract the result id from the server's reply to `query`.
///
/// The reply must be a single token containing `results/<digits>`, optionally followed by
/// further path segments.
pub fn parse_result_line(line: &str) -> Result<ResultId, Error> {
    let trimmed = line.trim();
    let captures = result_line_pattern()
        .captures(trimmed)
        .ok_or_else(|| Error::UnexpectedResponse(trimmed.to_string()))?;
    captures[1]
        .parse()
        .map(ResultId)
        .map_err(|_| Error::UnexpectedResponse(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_result_line() {
        assert_eq!(
            parse_result_line("http://moss.stanford.edu/results/482\n").unwrap(),
            ResultId(482)
        );
        assert_eq!(parse_result_line("results/7").unwrap(), ResultId(7));
        assert_eq!(
            parse_result_line("  http://localhost/results/12/ \r\n").unwrap(),
            ResultId(12)
        );
        assert_eq!(
            parse_result_line("http://moss.stanford.edu/results/5/123456789").unwrap(),
            ResultId(5)
        );
    }

    #[test]
    fn test_parse_result_line_rejects_deviations() {
        for bad in [
            "",
            "\n",
            "no",
            "http://moss.stanford.edu/results/",
            "http://moss.stanford.edu/results/abc",
            "http://moss.stanford.edu/results/48x2",
            "Error: results/12 is broken",
            "http://moss.stanford.edu/results/99999999999999999999999",
        ] {
            assert!(
                matches!(parse_result_line(bad), Err(Error::UnexpectedResponse(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_result_id_from_str() {
        assert_eq!(" 482 ".parse::<ResultId>().unwrap(), ResultId(482));
        assert!("abc".parse::<ResultId>().is_err());
        assert_eq!(ResultId(482).to_string(), "482");
    }

    #[test]
    fn test_line_channel_reads_and_writes() {
        let mut channel = LineChannel::new(io::Cursor::new(b"yes\nlast".to_vec()));
        assert_eq!(channel.read_line().unwrap().as_deref(), Some("yes\n"));
        assert_eq!(channel.read_line().unwrap().as_deref(), Some("last"));
        assert_eq!(channel.read_line().unwrap(), None);
    }

    #[test]
    fn test_line_channel_replaces_invalid_utf8() {
        let mut channel = LineChannel::new(io::Cursor::new(b"\xff\xfe results\n".to_vec()));
        assert_eq!(
            channel.read_line().unwrap().as_deref(),
            Some("\u{fffd}\u{fffd} results\n")
        );
    }
}
