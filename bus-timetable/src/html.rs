//! Table view of an HTML page.
//!
//! The extractors never touch the HTML parser directly. They work on this
//! small tree: a document is a list of tables, a table is a list of rows,
//! and a row is a list of header (`th`) and data (`td`) cells with trimmed
//! text and their attributes. Rows and cells belong to their nearest
//! enclosing table, so a table nested inside a cell shows up as its own
//! table rather than leaking rows into its parent.

use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

/// Kind of table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Header,
    Data,
}

/// One `th` or `td` cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub kind: CellKind,
    text: String,
    attrs: Vec<(String, String)>,
}

impl Cell {
    pub fn new(kind: CellKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// The cell's text: every text node trimmed, then concatenated.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// One `tr`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Header cells in order; indices count header cells only.
    pub fn header_cells(&self) -> Vec<&Cell> {
        self.cells_of(CellKind::Header)
    }

    /// Data cells in order; indices count data cells only.
    pub fn data_cells(&self) -> Vec<&Cell> {
        self.cells_of(CellKind::Data)
    }

    fn cells_of(&self, kind: CellKind) -> Vec<&Cell> {
        self.cells.iter().filter(|c| c.kind == kind).collect()
    }
}

/// One `table`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows containing at least one header cell.
    pub fn header_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows
            .iter()
            .filter(|r| r.cells.iter().any(|c| c.kind == CellKind::Header))
    }

    /// Rows containing at least one data cell.
    pub fn data_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows
            .iter()
            .filter(|r| r.cells.iter().any(|c| c.kind == CellKind::Data))
    }

    /// Text of every header cell in the table.
    pub fn header_texts(&self) -> impl Iterator<Item = &str> {
        self.header_rows()
            .flat_map(|r| r.cells.iter())
            .filter(|c| c.kind == CellKind::Header)
            .map(Cell::text)
    }
}

/// A parsed page, reduced to its tables in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    tables: Vec<Table>,
}

fn selector(cell: &'static OnceLock<Selector>, css: &str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).expect("static selector is valid"))
}

fn table_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    selector(&SELECTOR, "table")
}

fn row_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    selector(&SELECTOR, "tr")
}

impl Document {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// Parse an HTML page. Never fails; markup with no tables yields an
    /// empty document.
    pub fn parse(html: &str) -> Self {
        let page = Html::parse_document(html);
        let tables = page.select(table_selector()).map(read_table).collect();
        Self { tables }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }
}

fn read_table(table: ElementRef<'_>) -> Table {
    let rows = table
        .select(row_selector())
        .filter(|tr| owning_table(tr).is_some_and(|t| t.id() == table.id()))
        .map(read_row)
        .collect();
    Table { rows }
}

fn owning_table<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table")
}

fn read_row(tr: ElementRef<'_>) -> Row {
    let cells = tr
        .children()
        .filter_map(ElementRef::wrap)
        .filter_map(|el| {
            let kind = match el.value().name() {
                "th" => CellKind::Header,
                "td" => CellKind::Data,
                _ => return None,
            };
            Some(read_cell(el, kind))
        })
        .collect();
    Row { cells }
}

fn read_cell(el: ElementRef<'_>, kind: CellKind) -> Cell {
    let text = el
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<String>();
    let attrs = el
        .value()
        .attrs()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect();
    Cell { kind, text, attrs }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_tables_rows_and_cells() {
        let doc = Document::parse(
            r#"<html><body>
            <table>
              <thead><tr><th>순번</th><th> A발 </th></tr></thead>
              <tbody><tr><td>1</td><td>7:05</td></tr></tbody>
            </table>
            <table><tr><td>x</td></tr></table>
            </body></html>"#,
        );

        assert_eq!(doc.tables().len(), 2);
        let table = &doc.tables()[0];
        assert_eq!(table.header_texts().collect::<Vec<_>>(), vec!["순번", "A발"]);

        let data: Vec<_> = table.data_rows().collect();
        assert_eq!(data.len(), 1);
        let texts: Vec<_> = data[0].data_cells().iter().map(|c| c.text()).collect();
        assert_eq!(texts, vec!["1", "7:05"]);
    }

    #[test]
    fn cell_text_joins_trimmed_fragments() {
        let doc = Document::parse(
            "<table><tr><td>\n  <span>7:05</span>\n  <b>발</b>\n</td></tr></table>",
        );
        let row = &doc.tables()[0].rows()[0];
        assert_eq!(row.data_cells()[0].text(), "7:05발");
    }

    #[test]
    fn reads_attributes() {
        let doc = Document::parse(
            r#"<table><tr><td onclick="goDetail('30')" class="route">30</td></tr></table>"#,
        );
        let cell = &doc.tables()[0].rows()[0].cells()[0];
        assert_eq!(cell.attr("onclick"), Some("goDetail('30')"));
        assert_eq!(cell.attr("missing"), None);
    }

    #[test]
    fn nested_table_rows_stay_with_their_table() {
        let doc = Document::parse(
            "<table>
               <tr><th>outer</th></tr>
               <tr><td><table><tr><td>inner</td></tr></table></td></tr>
             </table>",
        );

        assert_eq!(doc.tables().len(), 2);
        assert_eq!(doc.tables()[0].rows().len(), 2);
        assert_eq!(doc.tables()[1].rows().len(), 1);
        assert_eq!(doc.tables()[1].rows()[0].cells()[0].text(), "inner");
    }

    #[test]
    fn header_and_data_indices_are_separate() {
        let doc = Document::parse("<table><tr><th>7시</th><td>05</td><td>35</td></tr></table>");
        let row = &doc.tables()[0].rows()[0];
        assert_eq!(row.header_cells().len(), 1);
        assert_eq!(row.data_cells().len(), 2);
        assert_eq!(doc.tables()[0].header_rows().count(), 1);
        assert_eq!(doc.tables()[0].data_rows().count(), 1);
    }

    #[test]
    fn page_without_tables_is_empty() {
        assert!(Document::parse("<p>점검 중입니다</p>").tables().is_empty());
        assert!(Document::parse("").tables().is_empty());
    }
}
