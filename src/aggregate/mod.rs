// src/aggregate/mod.rs

use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info, instrument, warn};

use crate::config::FailurePolicy;
use crate::error::{ScrapeError, TableSkip};
use crate::fetch::{extract_links, fetch_tables, ClemencyLink, PageSource};
use crate::process::{normalize, reshape, NormalizedRecord, Status};

/// Title stripped from link text to get the presiding official.
pub const TITLE_PREFIX: &str = "President ";

/// Every record folded in so far, sorted by (date, name).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AggregateTable {
    records: Vec<NormalizedRecord>,
}

impl AggregateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// New snapshot holding `self` plus `records`, fully re-sorted.
    /// Duplicates are kept.
    pub fn fold(self, records: Vec<NormalizedRecord>) -> Self {
        if records.is_empty() {
            return self;
        }
        let mut all = self.records;
        all.extend(records);
        all.sort_by(record_order);
        Self { records: all }
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with their dense 0-based position.
    pub fn enumerate(&self) -> impl Iterator<Item = (usize, &NormalizedRecord)> + '_ {
        self.records.iter().enumerate()
    }

    pub fn is_sorted(&self) -> bool {
        self.records
            .windows(2)
            .all(|w| record_order(&w[0], &w[1]) != Ordering::Greater)
    }
}

fn record_order(a: &NormalizedRecord, b: &NormalizedRecord) -> Ordering {
    a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name))
}

/// Something the run passed over without failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub page_url: String,
    /// `None` when the whole page was skipped.
    pub table_index: Option<usize>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub pages_seen: usize,
    pub tables_seen: usize,
    pub skipped_tables: Vec<Skipped>,
    pub skipped_pages: Vec<Skipped>,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub table: AggregateTable,
    pub report: RunReport,
}

/// Drives one status category from directory page to sorted table.
pub struct Aggregator<S> {
    source: S,
    site_root: String,
    policy: FailurePolicy,
}

impl<S: PageSource> Aggregator<S> {
    pub fn new(source: S, site_root: impl Into<String>) -> Self {
        Self {
            source,
            site_root: site_root.into(),
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn run(
        &self,
        directory_url: &str,
        locator: &str,
        status: Status,
    ) -> Result<AggregateTable, ScrapeError> {
        self.run_with_report(directory_url, locator, status)
            .map(|out| out.table)
    }

    #[instrument(level = "info", skip(self), fields(policy = ?self.policy))]
    pub fn run_with_report(
        &self,
        directory_url: &str,
        locator: &str,
        status: Status,
    ) -> Result<RunOutput, ScrapeError> {
        let links = extract_links(&self.source, directory_url, locator, &self.site_root)?;
        info!(pages = links.len(), "discovered document pages");

        let mut table = AggregateTable::new();
        let mut report = RunReport::default();

        for link in &links {
            report.pages_seen += 1;
            match self.page_records(link, status, &mut report) {
                Ok(records) => {
                    debug!(url = %link.target_url, records = records.len(), "folding page");
                    table = table.fold(records);
                }
                Err(e) if e.is_page_level() && self.policy == FailurePolicy::SkipAndReport => {
                    warn!(url = %link.target_url, error = %e, "skipping page");
                    report.skipped_pages.push(Skipped {
                        page_url: link.target_url.clone(),
                        table_index: None,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            records = table.len(),
            skipped_tables = report.skipped_tables.len(),
            skipped_pages = report.skipped_pages.len(),
            "run complete"
        );
        Ok(RunOutput { table, report })
    }

    /// Records from one document page. Table-level problems are logged and
    /// noted in `report`; page-level problems are returned.
    pub fn page_records(
        &self,
        link: &ClemencyLink,
        status: Status,
        report: &mut RunReport,
    ) -> Result<Vec<NormalizedRecord>, ScrapeError> {
        let official = official_from_link_text(&link.link_text);
        let tables = fetch_tables(&self.source, &link.target_url)?;
        report.tables_seen += tables.len();

        let mut records = Vec::new();
        for (idx, raw) in tables.iter().enumerate() {
            let outcome = reshape(raw).map_err(TableSkip::from).and_then(|t| {
                normalize(&t.date_label, &t.names, official, status)
                    .ok_or(TableSkip::UnparsableDate(t.date_label))
            });
            match outcome {
                Ok(mut recs) => records.append(&mut recs),
                Err(skip) => {
                    warn!(url = %link.target_url, table = idx, reason = %skip, "skipping table");
                    report.skipped_tables.push(Skipped {
                        page_url: link.target_url.clone(),
                        table_index: Some(idx),
                        reason: skip.to_string(),
                    });
                }
            }
        }
        Ok(records)
    }
}

/// "President George W. Bush" → "George W. Bush".
pub fn official_from_link_text(text: &str) -> &str {
    text.strip_prefix(TITLE_PREFIX).unwrap_or(text).trim()
}
