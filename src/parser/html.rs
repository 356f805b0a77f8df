//! HTML schedule extraction.
//!
//! The upstream serves a server-rendered page rather than an API, so the
//! extraction walks a real parse tree keyed on stable attributes instead of
//! scraping with regular expressions. All fragility lives in this module;
//! callers only see `Vec<ShutdownEvent>`.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::event::{EMPTY_QUEUE, ShutdownEvent, UNKNOWN_WORK_TYPE};

/// Alert text the upstream renders when no outages are registered.
const NO_OUTAGES_MARKER: &str = "Відключення не зареєстровані";

/// Class marker accompanying the all-clear alert.
const INFO_ALERT_MARKER: &str = "alert-info";

/// Minimum cell count for a schedule row to qualify.
const MIN_ROW_CELLS: usize = 6;

/// Heuristic payload classification.
///
/// The upstream does not reliably set Content-Type, so the body itself
/// decides which branch parses it.
#[must_use]
pub fn looks_like_html(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('<')
        || trimmed.starts_with("<!DOCTYPE")
        || text.contains("<div")
        || text.contains("<html")
        || text.contains("<table")
}

/// Returns true when the page carries the "no registered outages" alert.
#[must_use]
pub fn is_all_clear(text: &str) -> bool {
    text.contains(NO_OUTAGES_MARKER) && text.contains(INFO_ALERT_MARKER)
}

/// Extracts outage events from an HTML page or fragment.
///
/// Looks for the table marked `table-shutdowns` (class or id) and walks its
/// `tbody` rows. Rows with fewer than six cells are dropped; this is the
/// tolerance policy for the upstream's decorative and spacer rows, not a
/// parse failure. Returns an empty list when the table is absent.
#[must_use]
pub fn parse_html(text: &str) -> Vec<ShutdownEvent> {
    let document = Html::parse_document(text);

    let Ok(table_selector) = Selector::parse("table.table-shutdowns, table#table-shutdowns")
    else {
        return Vec::new();
    };
    let Ok(row_selector) = Selector::parse("tbody tr") else {
        return Vec::new();
    };
    let Ok(cell_selector) = Selector::parse("td") else {
        return Vec::new();
    };

    let Some(table) = document.select(&table_selector).next() else {
        debug!("No shutdown table found in HTML payload");
        return Vec::new();
    };

    let mut events = Vec::new();
    for row in table.select(&row_selector) {
        let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();

        if cells.len() < MIN_ROW_CELLS {
            debug!(
                cells = cells.len(),
                "Dropping schedule row with too few cells"
            );
            continue;
        }

        // Fixed upstream column order:
        // work type, shutdown type, GPV queue, GAV queue, start, end.
        events.push(ShutdownEvent {
            id: (events.len() + 1).to_string(),
            work_type: non_empty_or(&cells[0], UNKNOWN_WORK_TYPE),
            shutdown_type: cells[1].clone(),
            queue_gpv: non_empty_or(&cells[2], EMPTY_QUEUE),
            queue_gav: non_empty_or(&cells[3], EMPTY_QUEUE),
            date_start: cells[4].clone(),
            date_end: cells[5].clone(),
            comment: None,
            address: None,
        });
    }

    if events.is_empty() {
        warn!("Shutdown table present but produced no qualifying rows");
    }

    events
}

/// Concatenated text of a cell with tags stripped and whitespace collapsed.
fn cell_text(cell: ElementRef<'_>) -> String {
    let raw: String = cell.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_owned()
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule_page(rows: &str) -> String {
        format!(
            "<html><body><div class=\"container\">\
             <table class=\"table table-shutdowns\">\
             <thead><tr><th>Type</th></tr></thead>\
             <tbody>{rows}</tbody>\
             </table></div></body></html>"
        )
    }

    fn full_row(n: usize) -> String {
        format!(
            "<tr><td>Ремонтні роботи {n}</td><td>ГПВ</td><td>1.{n}</td>\
             <td>-</td><td>2026-08-0{n} 08:00</td><td>2026-08-0{n} 20:00</td></tr>"
        )
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("<!DOCTYPE html><html></html>"));
        assert!(looks_like_html("  <div>x</div>"));
        assert!(looks_like_html("text with <table> inside"));
        assert!(!looks_like_html("{\"success\":true}"));
        assert!(!looks_like_html("plain text"));
    }

    #[test]
    fn test_seven_rows_sequential_ids() {
        let rows: String = (1..=7).map(full_row).collect();
        let events = parse_html(&schedule_page(&rows));

        assert_eq!(events.len(), 7);
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.id, (i + 1).to_string());
        }
        assert_eq!(events[0].work_type, "Ремонтні роботи 1");
        assert_eq!(events[0].queue_gpv, "1.1");
        assert_eq!(events[0].date_start, "2026-08-01 08:00");
        assert_eq!(events[0].date_end, "2026-08-01 20:00");
    }

    #[test]
    fn test_short_row_dropped_siblings_kept() {
        let rows = format!(
            "{}<tr><td>а</td><td>б</td><td>в</td><td>г</td></tr>{}",
            full_row(1),
            full_row(2)
        );
        let events = parse_html(&schedule_page(&rows));

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "1");
        assert_eq!(events[1].id, "2");
        assert_eq!(events[1].work_type, "Ремонтні роботи 2");
    }

    #[test]
    fn test_all_clear_banner() {
        let page = "<html><body><div class=\"alert alert-info\">\
                    Відключення не зареєстровані</div></body></html>";
        assert!(is_all_clear(page));
        // The marker text alone is not enough without the info class.
        assert!(!is_all_clear("Відключення не зареєстровані"));
    }

    #[test]
    fn test_missing_table_yields_empty() {
        let page = "<html><body><div>nothing here</div></body></html>";
        assert!(parse_html(page).is_empty());
    }

    #[test]
    fn test_nested_tags_stripped_from_cells() {
        let rows = "<tr><td><b>Планові</b> роботи</td><td><span>ГАВ</span></td>\
                    <td>2.1</td><td>3.2</td><td> 01.08.2026 09:00 </td>\
                    <td>01.08.2026 17:00</td></tr>";
        let events = parse_html(&schedule_page(rows));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].work_type, "Планові роботи");
        assert_eq!(events[0].shutdown_type, "ГАВ");
        assert_eq!(events[0].date_start, "01.08.2026 09:00");
        assert_eq!(events[0].status(), "Emergency");
    }

    #[test]
    fn test_id_table_marker_accepted() {
        let page = "<table id=\"table-shutdowns\"><tbody>".to_owned()
            + &full_row(1)
            + "</tbody></table>";
        assert_eq!(parse_html(&page).len(), 1);
    }
}
