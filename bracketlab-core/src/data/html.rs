//! HTML table extraction.
//!
//! Parses the document with `scraper` and splits its first `<table>` into
//! header and body rows of plain-text cells. Comments, quoted attribute
//! values and entities are handled by the HTML parser.

use scraper::{ElementRef, Html, Node, Selector};
use std::sync::OnceLock;
use thiserror::Error;

/// Upper bound on `colspan`, as in the HTML table model.
pub const MAX_COLSPAN: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("no <table> element in document")]
    NoTable,

    #[error("expected a two-level header, found {0} header row(s)")]
    HeaderLevels(usize),

    #[error("nested <table> inside the standings table")]
    NestedTable,
}

/// A parsed table: effective column names plus body rows.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl HtmlTable {
    /// Column names from the lowest header level.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

fn table_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("table").expect("valid table selector"))
}

/// Extract the first table in `html`.
///
/// Header rows are the rows inside `<thead>`; without a `<thead>`, the
/// leading rows made only of `<th>` cells. The table must have at least two
/// header levels and the top level is discarded. A table nested inside the
/// first one is rejected.
pub fn extract_first_table(html: &str) -> Result<HtmlTable, TableError> {
    let document = Html::parse_document(html);
    let table = document
        .select(table_selector())
        .next()
        .ok_or(TableError::NoTable)?;

    let nested = table
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|el| el.value().name() == "table");
    if nested {
        return Err(TableError::NestedTable);
    }

    let sections: Vec<ElementRef> = table.children().filter_map(ElementRef::wrap).collect();
    let has_thead = sections.iter().any(|s| s.value().name() == "thead");

    let mut header_rows: Vec<Vec<String>> = Vec::new();
    let mut body_rows: Vec<Vec<String>> = Vec::new();

    for section in sections {
        let (in_thead, rows) = match section.value().name() {
            "thead" => (true, child_rows(section)),
            "tbody" | "tfoot" => (false, child_rows(section)),
            "tr" => (false, vec![section]),
            _ => continue,
        };

        for row in rows {
            let cells = row_cells(row);
            if cells.is_empty() {
                continue;
            }
            let leading_th =
                !has_thead && body_rows.is_empty() && cells.iter().all(|c| c.is_header);

            if in_thead || leading_th {
                header_rows.push(expand(cells));
            } else {
                body_rows.push(expand(cells));
            }
        }
    }

    if header_rows.len() < 2 {
        return Err(TableError::HeaderLevels(header_rows.len()));
    }

    let columns = header_rows.pop().unwrap_or_default();
    Ok(HtmlTable {
        columns,
        rows: body_rows,
    })
}

struct Cell {
    text: String,
    span: usize,
    is_header: bool,
}

fn child_rows(section: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
        .collect()
}

fn row_cells(row: ElementRef<'_>) -> Vec<Cell> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter_map(|cell| {
            let is_header = match cell.value().name() {
                "th" => true,
                "td" => false,
                _ => return None,
            };
            Some(Cell {
                text: cell_text(cell),
                span: colspan(cell),
                is_header,
            })
        })
        .collect()
}

fn expand(cells: Vec<Cell>) -> Vec<String> {
    let mut out = Vec::with_capacity(cells.len());
    for cell in cells {
        for _ in 1..cell.span {
            out.push(cell.text.clone());
        }
        out.push(cell.text);
    }
    out
}

/// `colspan` of a cell, clamped to `1..=MAX_COLSPAN`; 1 when absent or
/// unparsable.
fn colspan(cell: ElementRef<'_>) -> usize {
    cell.value()
        .attr("colspan")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .map_or(1, |n| n.min(MAX_COLSPAN))
}

/// Visible text of a cell: text nodes joined, `<br>` read as a space,
/// whitespace collapsed and trimmed.
fn cell_text(cell: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in cell.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push(' '),
            _ => {}
        }
    }
    normalize_ws(&out)
}

/// Collapse runs of whitespace into a single space and trim.
fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
