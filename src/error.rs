// src/error.rs

use thiserror::Error;

use crate::process::LayoutError;

/// Run-level failures. Anything returned as a `ScrapeError` ends the run
/// unless the failure policy says to skip the page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("directory page {url} could not be fetched")]
    DirectoryFetch {
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("document page {url} could not be fetched")]
    PageFetch {
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("document page {url} contains no tables")]
    PageParse { url: String },
    #[error("invalid locator `{locator}`: {reason}")]
    Locator { locator: String, reason: String },
}

impl ScrapeError {
    /// URL of the page that caused the failure, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            ScrapeError::DirectoryFetch { url, .. }
            | ScrapeError::PageFetch { url, .. }
            | ScrapeError::PageParse { url } => Some(url),
            ScrapeError::Locator { .. } => None,
        }
    }

    /// Page-level failures are the ones the failure policy may skip.
    pub fn is_page_level(&self) -> bool {
        matches!(
            self,
            ScrapeError::PageFetch { .. } | ScrapeError::PageParse { .. }
        )
    }
}

/// Why a single table contributed nothing. Never returned as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableSkip {
    #[error("header `{0}` is not a date")]
    UnparsableDate(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}
