// src/fetch/links.rs

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};
use url::Url;

use super::{normalize_ws, PageSource};
use crate::error::ScrapeError;

/// One document page discovered on a directory page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClemencyLink {
    pub link_text: String,
    /// Always absolute.
    pub target_url: String,
    pub year_label: Option<String>,
}

/// Fetch `page_url` and pull (text, href, year) triples out of every block
/// matched by `locator`. Zero matches is an empty result, not an error.
#[instrument(level = "info", skip(source, site_root))]
pub fn extract_links<S: PageSource + ?Sized>(
    source: &S,
    page_url: &str,
    locator: &str,
    site_root: &str,
) -> Result<Vec<ClemencyLink>, ScrapeError> {
    let selector = parse_locator(locator)?;
    let base = Url::parse(page_url).map_err(|e| ScrapeError::DirectoryFetch {
        url: page_url.to_string(),
        source: e.into(),
    })?;
    let html = source
        .fetch_text(page_url)
        .map_err(|e| ScrapeError::DirectoryFetch {
            url: page_url.to_string(),
            source: e,
        })?;

    let links = links_from_html(&html, &selector, site_root, &base);
    debug!(links = links.len(), "extracted directory links");
    Ok(links)
}

pub(crate) fn parse_locator(locator: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(locator).map_err(|e| ScrapeError::Locator {
        locator: locator.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Extraction over already-fetched markup. `base` is the directory page's
/// own URL, used for hrefs that are relative to it.
pub fn links_from_html(
    html: &str,
    selector: &Selector,
    site_root: &str,
    base: &Url,
) -> Vec<ClemencyLink> {
    let doc = Html::parse_document(html);
    let mut out = Vec::new();

    for block in doc.select(selector) {
        let mut anchors: Vec<(String, String)> = Vec::new();
        let mut free_texts: Vec<String> = Vec::new();

        for child in block.children() {
            if let Some(el) = ElementRef::wrap(child) {
                if el.value().name() != "a" {
                    continue;
                }
                match el.value().attr("href") {
                    Some(href) => {
                        let text = normalize_ws(&el.text().collect::<String>());
                        anchors.push((text, href.trim().to_string()));
                    }
                    None => trace!("anchor without href skipped"),
                }
            } else if let Some(text) = child.value().as_text() {
                let s: &str = text;
                free_texts.push(normalize_ws(s));
            }
        }

        for (i, (link_text, href)) in anchors.into_iter().enumerate() {
            let year_label = free_texts.get(i).filter(|t| !t.is_empty()).cloned();
            let Some(target_url) = absolutize(&href, site_root, base) else {
                trace!(%link_text, %href, "href does not resolve to an http(s) URL");
                continue;
            };
            trace!(%link_text, %target_url, ?year_label, "found link");
            out.push(ClemencyLink {
                link_text,
                target_url,
                year_label,
            });
        }
    }

    out
}

/// Make `href` absolute. Root-relative paths go under `site_root` verbatim;
/// everything else is resolved against the directory page. `None` unless
/// the result is http(s).
pub fn absolutize(href: &str, site_root: &str, base: &Url) -> Option<String> {
    let root = site_root.trim_end_matches('/');
    if href.starts_with('/') && !href.starts_with("//") {
        return Some(format!("{}{}", root, href));
    }
    let url = if href.starts_with("//") {
        Url::parse(root).and_then(|r| r.join(href)).ok()?
    } else {
        base.join(href).ok()?
    };
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}
