pub mod bitmap;
pub mod document;
pub mod html;
pub mod source;

pub use bitmap::{SimilarityBar, PALETTE};
pub use document::{DocumentParser, Element, Node};
pub use html::HtmlParser;
pub use source::{HttpSource, PageSource};

use crate::error::Error;
use crate::progress::{ProgressReporter, SilentReporter};
use crate::session::ResultId;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// One file of the local report mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPage {
    pub name: String,
    pub html: String,
}

#[derive(Debug)]
pub struct ReportSummary {
    pub directory: PathBuf,
    pub cases: usize,
    pub pages_written: usize,
}

/// Downloads a MOSS report and rewrites it into a self-contained local directory.
pub struct ReportFetcher<S = HttpSource, P = HtmlParser> {
    base_url: String,
    source: S,
    parser: P,
}

impl ReportFetcher {
    pub fn new(server: &str, timeout: Option<Duration>) -> Result<Self, Error> {
        Ok(Self::with_parts(server, HttpSource::new(timeout)?, HtmlParser))
    }
}

impl<S: PageSource, P: DocumentParser> ReportFetcher<S, P> {
    /// `server` is a host name (`moss.stanford.edu`) or a full base URL.
    pub fn with_parts(server: &str, source: S, parser: P) -> Self {
        let server = server.trim_end_matches('/');
        let base_url = if server.starts_with("http://") || server.starts_with("https://") {
            server.to_string()
        } else {
            format!("http://{}", server)
        };
        Self {
            base_url,
            source,
            parser,
        }
    }

    pub fn index_url(&self, id: ResultId) -> String {
        format!("{}/results/{}", self.base_url, id)
    }

    pub fn match_url(&self, id: ResultId, case: usize, side: usize) -> String {
        format!("{}/results/{}/{}", self.base_url, id, match_page_name(case, side))
    }

    pub fn save_report(&self, dir: &Path, id: ResultId) -> Result<ReportSummary, Error> {
        self.save_report_with(dir, id, &SilentReporter)
    }

    /// Fetch and transform every page, then write them under `dir`.
    ///
    /// Nothing is written unless every page was fetched and transformed.
    pub fn save_report_with(
        &self,
        dir: &Path,
        id: ResultId,
        reporter: &dyn ProgressReporter,
    ) -> Result<ReportSummary, Error> {
        info!("Fetching report {} into {}", id, dir.display());
        let (cases, pages) = self.render_report(id, reporter)?;

        if !dir.is_dir() {
            fs::create_dir_all(dir)?;
        }
        for page in &pages {
            fs::write(dir.join(&page.name), &page.html)?;
        }
        reporter.on_report_complete(pages.len());
        info!("Wrote {} pages for {} cases", pages.len(), cases);

        Ok(ReportSummary {
            directory: dir.to_path_buf(),
            cases,
            pages_written: pages.len(),
        })
    }

    /// Build the whole mirror in memory. Returns the case count and the pages.
    pub fn render_report(
        &self,
        id: ResultId,
        reporter: &dyn ProgressReporter,
    ) -> Result<(usize, Vec<ReportPage>), Error> {
        let url = self.index_url(id);
        let markup = self.source.fetch(&url)?;
        let mut table = self
            .parser
            .locate(&markup, "table")
            .ok_or(Error::ReportNotFound { url })?;

        let prefix = format!("/results/{}/", id);
        table.try_for_each_mut("a", &mut |a: &mut Element| {
            if let Some(href) = a.attribute("href") {
                match relative_link(href, &prefix) {
                    Some(rest) => {
                        let rest = rest.to_string();
                        a.set_attribute("href", rest);
                    }
                    None => debug!("Leaving link {} unchanged", href),
                }
            }
            Ok::<_, Error>(())
        })?;

        let anchors = table.count("a");
        if anchors % 2 != 0 {
            warn!("Index table has an odd number of links ({}); ignoring the last one", anchors);
        }
        let cases = anchors / 2;
        reporter.on_report_start(1 + cases * 3);

        let mut pages = Vec::with_capacity(1 + cases * 3);
        pages.push(ReportPage {
            name: "index.html".to_string(),
            html: table.outer_html(),
        });
        reporter.on_page_fetched("index.html");

        pages.extend(self.fetch_details(id, cases, reporter)?);
        Ok((cases, pages))
    }

    /// Fetch both sides of each case, replacing similarity bitmaps with bars, and
    /// add a frameset per case.
    pub fn fetch_details(
        &self,
        id: ResultId,
        case_count: usize,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<ReportPage>, Error> {
        let mut pages = Vec::with_capacity(case_count * 3);
        for case in 0..case_count {
            for side in 0..=1 {
                let url = self.match_url(id, case, side);
                let markup = self.source.fetch(&url)?;
                let mut code = self
                    .parser
                    .locate(&markup, "pre")
                    .ok_or(Error::ReportNotFound { url })?;

                let mut bars = 0;
                code.try_for_each_mut("img", &mut |img: &mut Element| {
                    let src = img.attribute("src").unwrap_or_default();
                    let bar = SimilarityBar::from_bitmap_src(src)?;
                    bar.apply(img);
                    bars += 1;
                    Ok::<_, Error>(())
                })?;

                let name = match_page_name(case, side);
                debug!("{}: replaced {} bitmaps", name, bars);
                reporter.on_page_fetched(&name);
                pages.push(ReportPage {
                    html: code.outer_html(),
                    name,
                });
            }

            let name = format!("match{}.html", case);
            reporter.on_page_fetched(&name);
            pages.push(ReportPage {
                html: frameset(case),
                name,
            });
        }
        Ok(pages)
    }
}

fn match_page_name(case: usize, side: usize) -> String {
    format!("match{}-{}.html", case, side)
}

/// `.../results/<id>/<rest>` becomes `<rest>`.
fn relative_link<'a>(href: &'a str, prefix: &str) -> Option<&'a str> {
    href.split_once(prefix).map(|(_, rest)| rest)
}

fn frameset(case: usize) -> String {
    format!(
        "<frameset cols=\"50%,50%\" rows=\"100%\">\
         <frame src=\"{}\" name=\"0\"><frame src=\"{}\" name=\"1\"></frameset>",
        match_page_name(case, 0),
        match_page_name(case, 1)
    )
}
