//! Bulletin table extraction.
//!
//! The bulletin is a single table: two full-width header cells (subtitle,
//! then date) followed by data rows whose first five `td` cells are
//! name, unit, min, max, avg.

use crate::constants::MIN_ROW_CELLS;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::{debug, info, warn};

/// One data row as text, before classification and numeral normalization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRow {
    pub name: String,
    pub unit: String,
    pub min: String,
    pub max: String,
    pub avg: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractedTable {
    pub subtitle: String,
    pub date: String,
    pub rows: Vec<PriceRow>,
    /// Data rows dropped for carrying fewer than five cells
    pub skipped: usize,
}

pub struct TableExtractor {
    header_selector: Selector,
    row_selector: Selector,
}

impl TableExtractor {
    pub fn new() -> Self {
        Self {
            header_selector: selector("th[colspan], td[colspan]"),
            row_selector: selector("tr"),
        }
    }

    /// Extracts the header pair and every qualifying row, in document order.
    ///
    /// Malformed rows are counted and dropped; this never fails.
    pub fn extract(&self, markup: &str) -> ExtractedTable {
        debug!("TableExtractor: start markup_len={}", markup.len());
        let document = Html::parse_document(markup);

        let mut headers = document
            .select(&self.header_selector)
            .map(|cell| cell_text(&cell));
        let subtitle = headers.next().unwrap_or_default();
        let date = headers.next().unwrap_or_default();
        if subtitle.is_empty() && date.is_empty() {
            warn!("TableExtractor: no full-width header cells found");
        }

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for row in document.select(&self.row_selector) {
            let cells: Vec<String> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name() == "td")
                .map(|cell| cell_text(&cell))
                .collect();

            if cells.is_empty() {
                // header and column-title rows carry only th cells
                continue;
            }
            if cells.len() < MIN_ROW_CELLS {
                debug!("TableExtractor: skipping row with {} cells", cells.len());
                skipped += 1;
                continue;
            }

            let mut cells = cells.into_iter();
            let mut next = || cells.next().unwrap_or_default();
            rows.push(PriceRow {
                name: next(),
                unit: next(),
                min: next(),
                max: next(),
                avg: next(),
            });
        }

        ::metrics::counter!("market_extractor_rows_parsed_total").increment(rows.len() as u64);
        ::metrics::counter!("market_extractor_rows_skipped_total").increment(skipped as u64);
        info!(
            "TableExtractor: extracted rows={} skipped={}",
            rows.len(),
            skipped
        );

        ExtractedTable {
            subtitle,
            date,
            rows,
            skipped,
        }
    }
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// Cell text with runs of whitespace collapsed to single spaces
fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
