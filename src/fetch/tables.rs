// src/fetch/tables.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, trace};

use super::{collapse_ws, PageSource};
use crate::error::ScrapeError;
use crate::process::RawTable;

static TABLE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("CSS selector for tables should be valid"));
static ROW_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("CSS selector for rows should be valid"));
static CELL_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th, td").expect("CSS selector for cells should be valid"));

/// Widest colspan honoured; anything larger is treated as a typo.
const MAX_COLSPAN: usize = 64;

/// Fetch a document page and return every table on it, in document order.
/// A page without any table is a page-level failure.
#[instrument(level = "info", skip(source))]
pub fn fetch_tables<S: PageSource + ?Sized>(
    source: &S,
    page_url: &str,
) -> Result<Vec<RawTable>, ScrapeError> {
    let html = source
        .fetch_text(page_url)
        .map_err(|e| ScrapeError::PageFetch {
            url: page_url.to_string(),
            source: e,
        })?;

    let tables = tables_from_html(&html);
    if tables.is_empty() {
        return Err(ScrapeError::PageParse {
            url: page_url.to_string(),
        });
    }
    debug!(tables = tables.len(), "extracted tables");
    Ok(tables)
}

/// Every `<table>` in `html`. Rows are attributed to their nearest enclosing
/// table, so nested tables come out as separate entries.
pub fn tables_from_html(html: &str) -> Vec<RawTable> {
    let doc = Html::parse_document(html);
    doc.select(&TABLE_SEL).map(read_table).collect()
}

fn read_table(table: ElementRef<'_>) -> RawTable {
    let rows = table
        .select(&ROW_SEL)
        .filter(|row| owning_table(row) == Some(table))
        .map(read_row)
        .collect::<Vec<_>>();
    trace!(rows = rows.len(), "read table");
    RawTable::new(rows)
}

fn read_row(row: ElementRef<'_>) -> Vec<String> {
    let mut cells = Vec::new();
    for cell in row
        .select(&CELL_SEL)
        .filter(|c| c.parent().map(|p| p.id()) == Some(row.id()))
    {
        cells.push(collapse_ws(&cell.text().collect::<String>()));
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_COLSPAN);
        cells.extend(std::iter::repeat(String::new()).take(span - 1));
    }
    cells
}

fn owning_table<'a>(row: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::MapSource;

    const PAGE: &str = r#"<html><body>
<h2>Pardons denied</h2>
<table>
  <thead><tr><th colspan="2">January&nbsp;20,   2009</th></tr></thead>
  <tbody>
    <tr><td>Alice  Adams</td><td>Dan</td></tr>
    <tr><td>Bob</td><td></td></tr>
  </tbody>
</table>
<p>between</p>
<table>
  <tr><td>Outer header</td></tr>
  <tr><td>
      <table><tr><td>Inner header</td></tr><tr><td>Inner</td></tr></table>
  </td><td>Outer</td></tr>
</table>
</body></html>"#;

    #[test]
    fn reads_tables_in_document_order() {
        let tables = tables_from_html(PAGE);
        assert_eq!(tables.len(), 3);

        let first = &tables[0];
        assert_eq!(first.rows()[0], vec!["January 20, 2009", ""]);
        assert_eq!(first.rows()[1], vec!["Alice Adams", "Dan"]);
        assert_eq!(first.rows()[2], vec!["Bob", ""]);

        // the nested table's rows do not leak into its parent
        assert_eq!(tables[1].rows().len(), 2);
        assert_eq!(tables[1].rows()[0], vec!["Outer header"]);
        assert_eq!(tables[2].rows()[0], vec!["Inner header"]);
        assert_eq!(tables[2].rows()[1], vec!["Inner"]);
    }

    #[test]
    fn page_without_tables_is_a_parse_failure() {
        let source = MapSource::default().with_page("https://site/empty", "<p>nothing here</p>");
        let err = fetch_tables(&source, "https://site/empty").unwrap_err();
        assert!(matches!(err, ScrapeError::PageParse { ref url } if url == "https://site/empty"));
    }

    #[test]
    fn unreachable_page_is_a_fetch_failure() {
        let source = MapSource::default();
        let err = fetch_tables(&source, "https://site/gone").unwrap_err();
        assert!(matches!(err, ScrapeError::PageFetch { .. }));
        assert!(err.is_page_level());
    }
}
