// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

pub mod links;
pub mod tables;

pub use links::{extract_links, ClemencyLink};
pub use tables::fetch_tables;

/// Anything that can turn a URL into page markup.
pub trait PageSource {
    fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP page source. One request at a time, no retries.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .gzip(true)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl PageSource for HttpSource {
    fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("Fetching text from {}", url);
        self.client
            .get(url)
            .send()
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .text()
            .with_context(|| format!("Reading text from {}", url))
    }
}

impl<S: PageSource + ?Sized> PageSource for &S {
    fn fetch_text(&self, url: &str) -> Result<String> {
        (**self).fetch_text(url)
    }
}

/// Replace non-breaking spaces with regular ones and trim the ends.
pub fn normalize_ws(s: &str) -> String {
    s.replace('\u{a0}', " ").trim().to_string()
}

/// Collapse every whitespace run (including U+00A0) into one space and trim.
pub fn collapse_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = true;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_ws_replaces_nbsp_and_trims() {
        assert_eq!(normalize_ws("\u{a0} George\u{a0}W. Bush \n"), "George W. Bush");
        assert_eq!(normalize_ws("   "), "");
    }

    #[test]
    fn collapse_ws_squeezes_runs() {
        assert_eq!(collapse_ws("  John\n\t  Q.\u{a0}\u{a0}Public "), "John Q. Public");
        assert_eq!(collapse_ws("\n"), "");
    }
}
