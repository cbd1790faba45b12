//! Plain-text tables with optionally colored cells.
//!
//! Column widths are measured on the unstyled text, so ANSI codes never
//! break the alignment.

use owo_colors::{OwoColorize, Style};
use unicode_width::UnicodeWidthStr;

const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone)]
struct Span {
    text: String,
    style: Option<Style>,
}

/// Table cell made of styled spans, possibly spread over several lines.
#[derive(Debug, Clone)]
pub struct Cell {
    lines: Vec<Vec<Span>>,
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

impl Cell {
    pub fn new() -> Self {
        Self {
            lines: vec![Vec::new()],
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new().push(text, None)
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self::new().push(text, Some(style))
    }

    /// Append a span to the current line.
    pub fn push(mut self, text: impl Into<String>, style: Option<Style>) -> Self {
        let span = Span {
            text: text.into(),
            style,
        };
        if let Some(line) = self.lines.last_mut() {
            line.push(span);
        }
        self
    }

    /// Start a new line within the cell.
    pub fn line(mut self) -> Self {
        self.lines.push(Vec::new());
        self
    }

    /// Unstyled content, lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.iter().map(|s| s.text.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn width(&self) -> usize {
        self.lines.iter().map(|l| line_width(l)).max().unwrap_or(0)
    }

    fn height(&self) -> usize {
        self.lines.len()
    }

    fn render_line(&self, index: usize, width: usize, align: Align, color: bool) -> String {
        let Some(line) = self.lines.get(index) else {
            return " ".repeat(width);
        };

        let content: String = line
            .iter()
            .map(|span| match span.style {
                Some(style) if color => span.text.style(style).to_string(),
                _ => span.text.clone(),
            })
            .collect();
        let padding = " ".repeat(width.saturating_sub(line_width(line)));

        match align {
            Align::Left => content + &padding,
            Align::Right => padding + &content,
        }
    }
}

fn line_width(line: &[Span]) -> usize {
    line.iter().map(|s| s.text.width()).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone)]
enum Row {
    Cells(Vec<Cell>),
    Separator,
}

#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            aligns: vec![Align::Left; headers.len()],
            rows: Vec::new(),
        }
    }

    pub fn align(mut self, column: usize, align: Align) -> Self {
        if let Some(slot) = self.aligns.get_mut(column) {
            *slot = align;
        }
        self
    }

    /// Add a row; missing trailing cells render empty, extra cells are dropped.
    pub fn row(&mut self, cells: Vec<Cell>) {
        self.rows.push(Row::Cells(cells));
    }

    pub fn separator(&mut self) {
        self.rows.push(Row::Separator);
    }

    pub fn is_empty(&self) -> bool {
        !self.rows.iter().any(|r| matches!(r, Row::Cells(_)))
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            if let Row::Cells(cells) = row {
                for (width, cell) in widths.iter_mut().zip(cells) {
                    *width = (*width).max(cell.width());
                }
            }
        }
        widths
    }

    pub fn render(&self, color: bool) -> String {
        let widths = self.widths();
        let rule = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);

        let header = self
            .headers
            .iter()
            .zip(&widths)
            .zip(&self.aligns)
            .map(|((h, w), align)| {
                let cell = if color {
                    Cell::styled(h.as_str(), Style::new().bold())
                } else {
                    Cell::plain(h.as_str())
                };
                cell.render_line(0, *w, *align, color)
            })
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);

        let mut out = vec![header.trim_end().to_string(), rule.clone()];
        let empty = Cell::new();

        for row in &self.rows {
            match row {
                Row::Separator => out.push(rule.clone()),
                Row::Cells(cells) => {
                    let height = cells.iter().map(Cell::height).max().unwrap_or(1);
                    for index in 0..height {
                        let line = widths
                            .iter()
                            .zip(&self.aligns)
                            .enumerate()
                            .map(|(col, (w, align))| {
                                cells
                                    .get(col)
                                    .unwrap_or(&empty)
                                    .render_line(index, *w, *align, color)
                            })
                            .collect::<Vec<_>>()
                            .join(COLUMN_GAP);
                        out.push(line.trim_end().to_string());
                    }
                }
            }
        }

        out.join("\n") + "\n"
    }
}
