//! Source loading for ingestion: web pages over HTTP or local files.

use regex::Regex;
use tracing::{debug, info};

use crate::errors::{RagError, make_snippet};

/// Removes markup from fetched pages.
pub struct TagStripper {
    re: Regex,
}

impl TagStripper {
    pub fn new() -> Result<Self, RagError> {
        let re = Regex::new(r"<[^>]*>?")
            .map_err(|e| RagError::Config(format!("tag pattern: {e}")))?;
        Ok(Self { re })
    }

    /// Deletes every `<...>` run; an unterminated `<` removes the rest of the input.
    pub fn strip(&self, html: &str) -> String {
        self.re.replace_all(html, "").into_owned()
    }
}

/// Where a document comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(std::path::PathBuf),
}

impl Source {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Source::Url(raw.to_string())
        } else {
            Source::File(raw.into())
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Url(u) => f.write_str(u),
            Source::File(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Loads the raw text of a source and strips markup.
///
/// # Errors
/// `RagError::Http` / `RagError::HttpStatus` for URLs, `RagError::Io` for files.
pub async fn load_text(
    client: &reqwest::Client,
    stripper: &TagStripper,
    source: &Source,
) -> Result<String, RagError> {
    let raw = match source {
        Source::Url(url) => {
            debug!(%url, "fetching source");
            let resp = client.get(url).send().await?;
            let status = resp.status();
            let body = resp.text().await?;
            if !status.is_success() {
                return Err(RagError::HttpStatus {
                    status,
                    url: url.clone(),
                    snippet: make_snippet(&body),
                });
            }
            body
        }
        Source::File(path) => {
            debug!(path = %path.display(), "reading source");
            tokio::fs::read_to_string(path).await?
        }
    };

    let text = stripper.strip(&raw);
    info!(%source, raw_len = raw.len(), text_len = text.len(), "source loaded");
    Ok(text)
}
