//! Table rendering utilities for CLI outputs.

use super::colors::strip_ansi;
use unicode_width::UnicodeWidthStr;

pub struct Column {
    pub header: String,
    pub width: usize,
}

impl Column {
    pub fn new(header: &str, width: usize) -> Self {
        Self {
            header: header.to_string(),
            width,
        }
    }
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

/// Pads on display width, so ANSI escapes and wide glyphs do not skew columns.
fn pad(cell: &str, width: usize) -> String {
    let visible = strip_ansi(cell);
    let w = UnicodeWidthStr::width(visible.as_str());
    format!("{}{}", cell, " ".repeat(width.saturating_sub(w)))
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        // Header
        for col in &self.columns {
            out.push_str(&pad(&col.header, col.width));
            out.push(' ');
        }
        out.push('\n');

        // Rows
        for row in &self.rows {
            for (i, col) in self.columns.iter().enumerate() {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                out.push_str(&pad(cell, col.width));
                out.push(' ');
            }
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_on_visible_width() {
        let mut t = Table::new(vec![Column::new("A", 4), Column::new("B", 2)]);
        t.add_row(vec!["\x1b[32mok\x1b[0m".into(), "x".into()]);
        let rendered = t.render();
        let second = rendered.lines().nth(1).unwrap();
        assert_eq!(strip_ansi(second), "ok   x  ");
    }
}
