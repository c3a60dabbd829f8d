use crate::error::Error;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Where report pages come from.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String, Error>;
}

impl<T: PageSource + ?Sized> PageSource for &T {
    fn fetch(&self, url: &str) -> Result<String, Error> {
        (**self).fetch(url)
    }
}

/// Blocking HTTP GET.
///
/// Transport failures and error statuses are logged and reported as
/// [`Error::ReportNotFound`] for the requested URL.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(timeout: Option<Duration>) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String, Error> {
        debug!("GET {}", url);
        let not_found = || Error::ReportNotFound {
            url: url.to_string(),
        };

        let response = self.client.get(url).send().map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            not_found()
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} returned {}", url, status);
            return Err(not_found());
        }

        response.text().map_err(|e| {
            warn!("Failed to read body of {}: {}", url, e);
            not_found()
        })
    }
}
