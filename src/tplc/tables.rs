use super::{DEVICE_PROBLEMS_HEADER, PATIENT_PROBLEMS_HEADER, PROBLEM_LINK_BASE};
use crate::helpers::{element_text, normalize_ws, parse_count, rewrite_parent_link};
use crate::models::ProblemRecord;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid selector"));

/// Extract the problem rows of the table headed by `header_label`.
///
/// The header row is the first `tr` with a `th` cell whose text equals the
/// label, ignoring case and surrounding whitespace. Its data rows are the
/// sibling rows that follow it. Header-only rows before the first data row
/// (column captions) are skipped; after that, a header-only row ends the
/// table, as does a header row naming a problem table at any point. A
/// missing table yields an empty list.
pub fn extract_problems(document: &Html, header_label: &str) -> Vec<ProblemRecord> {
    let wanted = normalize_ws(header_label).to_lowercase();

    let Some(header_row) = document
        .select(&ROW)
        .find(|row| is_header_row_for(row, &wanted))
    else {
        return Vec::new();
    };

    let mut seen_data = false;
    header_row
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
        .take_while(|row| {
            if is_header_only(row) {
                !seen_data && !names_problem_table(row)
            } else {
                seen_data = true;
                true
            }
        })
        .filter_map(|row| parse_problem_row(&row))
        .collect()
}

fn cells<'a>(row: &ElementRef<'a>, tag: &'static str) -> impl Iterator<Item = ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == tag)
}

fn is_header_row_for(row: &ElementRef<'_>, wanted: &str) -> bool {
    cells(row, "th").any(|th| element_text(&th).to_lowercase() == wanted)
}

fn names_problem_table(row: &ElementRef<'_>) -> bool {
    [DEVICE_PROBLEMS_HEADER, PATIENT_PROBLEMS_HEADER]
        .iter()
        .any(|label| is_header_row_for(row, &label.to_lowercase()))
}

fn is_header_only(row: &ElementRef<'_>) -> bool {
    cells(row, "th").next().is_some() && cells(row, "td").next().is_none()
}

/// One problem entry: name(+link), MDR count, event count.
/// Rows with fewer than three data cells are layout rows and yield `None`.
fn parse_problem_row(row: &ElementRef<'_>) -> Option<ProblemRecord> {
    let tds: Vec<ElementRef<'_>> = cells(row, "td").collect();
    if tds.len() < 3 {
        return None;
    }

    let (name, href) = match tds[0].select(&LINK).next() {
        Some(link) => (element_text(&link), link.value().attr("href")),
        None => (element_text(&tds[0]), None),
    };

    let external_link = href
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(|h| rewrite_parent_link(h, PROBLEM_LINK_BASE));

    Some(ProblemRecord {
        name,
        mdr_count: parse_count(&element_text(&tds[1])),
        event_count: parse_count(&element_text(&tds[2])),
        external_link,
    })
}
