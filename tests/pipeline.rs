use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clemency_scraper::{
    aggregate::AggregateTable, Aggregator, FailurePolicy, NormalizedRecord, PageSource,
    ScrapeError, Status,
};
use std::cell::RefCell;
use std::collections::HashMap;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,clemency_scraper=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Serves canned pages and remembers the order they were requested in.
#[derive(Default)]
struct FakeSite {
    pages: HashMap<String, String>,
    requested: RefCell<Vec<String>>,
}

impl FakeSite {
    fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

impl PageSource for FakeSite {
    fn fetch_text(&self, url: &str) -> Result<String> {
        self.requested.borrow_mut().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("connection refused: {}", url))
    }
}

const DIRECTORY: &str = r#"<html><body><section><article>
<p>2001&nbsp;-&nbsp;2009 <a href="/pardon/x">President Bush</a></p>
</article></section></body></html>"#;

const BUSH_PAGE: &str = r#"<html><body>
<table>
  <tr><th>January 20, 2009</th></tr>
  <tr><td>Bob</td></tr>
  <tr><td>Alice</td></tr>
</table>
</body></html>"#;

#[test]
fn end_to_end_single_page() -> Result<()> {
    init_test_logging();
    let site = FakeSite::default()
        .page("https://site/pardon/denials", DIRECTORY)
        .page("https://site/pardon/x", BUSH_PAGE);

    let table = Aggregator::new(&site, "https://site").run(
        "https://site/pardon/denials",
        "article p",
        Status::Denied,
    )?;

    let date = NaiveDate::from_ymd_opt(2009, 1, 20).unwrap();
    let expected: Vec<NormalizedRecord> = ["Alice", "Bob"]
        .iter()
        .map(|n| NormalizedRecord {
            date,
            name: n.to_string(),
            official: "Bush".to_string(),
            status: Status::Denied,
        })
        .collect();
    assert_eq!(table.records(), expected.as_slice());
    assert_eq!(
        *site.requested.borrow(),
        vec!["https://site/pardon/denials", "https://site/pardon/x"]
    );
    Ok(())
}

#[test]
fn multi_page_run_is_sorted_and_keeps_duplicates() -> Result<()> {
    init_test_logging();
    let directory = r#"<html><body><div class="list">
<p><a href="/pardon/clinton">President William J. Clinton</a></p>
<p><a href="/pardon/bush">President George W. Bush</a>
   <a href="https://mirror.example.org/obama">President Barack Obama</a></p>
</div></body></html>"#;
    let clinton = r#"<table>
<tr><td colspan="3">December 24, 1999</td></tr>
<tr><td>Zane</td><td>Mia</td><td>Abe</td></tr>
<tr><td>Kim</td><td></td><td>Lou</td></tr>
</table>"#;
    let bush = r#"<table><tr><th>Mar. 1st, 2001</th></tr><tr><td>Kim</td></tr></table>
<table><tr><th>Not yet dated</th></tr><tr><td>Nobody</td></tr></table>
<table><tr><th>December 24, 1999</th></tr><tr><td>Kim</td></tr></table>"#;
    let obama = r#"<table><tr><th>1/19/2017</th></tr><tr><td>Ann</td><td>Ben</td></tr></table>"#;

    let site = FakeSite::default()
        .page("https://site/dir", directory)
        .page("https://site/pardon/clinton", clinton)
        .page("https://site/pardon/bush", bush)
        .page("https://mirror.example.org/obama", obama);

    let out = Aggregator::new(&site, "https://site").run_with_report(
        "https://site/dir",
        "div.list > p",
        Status::Granted,
    )?;
    let table: AggregateTable = out.table;

    assert!(table.is_sorted());
    let rows: Vec<(String, &str, &str)> = table
        .records()
        .iter()
        .map(|r| (r.date.to_string(), r.name.as_str(), r.official.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("1999-12-24".to_string(), "Abe", "William J. Clinton"),
            ("1999-12-24".to_string(), "Kim", "William J. Clinton"),
            ("1999-12-24".to_string(), "Kim", "George W. Bush"),
            ("1999-12-24".to_string(), "Lou", "William J. Clinton"),
            ("1999-12-24".to_string(), "Mia", "William J. Clinton"),
            ("1999-12-24".to_string(), "Zane", "William J. Clinton"),
            ("2001-03-01".to_string(), "Kim", "George W. Bush"),
            ("2017-01-19".to_string(), "Ann", "Barack Obama"),
            ("2017-01-19".to_string(), "Ben", "Barack Obama"),
        ]
    );
    assert_eq!(out.report.pages_seen, 3);
    assert_eq!(out.report.tables_seen, 5);
    assert_eq!(out.report.skipped_tables.len(), 1);
    assert!(out.report.skipped_tables[0].reason.contains("Not yet dated"));
    assert!(table.records().iter().all(|r| r.status == Status::Granted));
    Ok(())
}

#[test]
fn failing_page_aborts_by_default_and_can_be_skipped() -> Result<()> {
    init_test_logging();
    let directory = r#"<p><a href="/a">President A</a></p><p><a href="/b">President B</a></p>"#;
    let site = FakeSite::default()
        .page("https://site/dir", directory)
        .page("https://site/b", "<table><tr><th>June 2, 1995</th></tr><tr><td>Bea</td></tr></table>");

    let err = Aggregator::new(&site, "https://site")
        .run("https://site/dir", "p", Status::Denied)
        .unwrap_err();
    assert!(matches!(err, ScrapeError::PageFetch { ref url, .. } if url == "https://site/a"));
    // the run stopped before touching the second page
    assert!(!site.requested.borrow().contains(&"https://site/b".to_string()));

    let out = Aggregator::new(&site, "https://site")
        .with_policy(FailurePolicy::SkipAndReport)
        .run_with_report("https://site/dir", "p", Status::Denied)?;
    assert_eq!(out.table.len(), 1);
    assert_eq!(out.table.records()[0].official, "B");
    assert_eq!(out.report.skipped_pages.len(), 1);
    assert_eq!(out.report.skipped_pages[0].page_url, "https://site/a");
    Ok(())
}
