//! Plain-text tables for pretty output.

use std::io::{self, Write};

const COLUMN_GAP: &str = "  ";

enum Line {
    Row(Vec<String>),
    Separator,
}

/// A table with an optional header and multi-line cells.
#[derive(Default)]
pub struct Table {
    header: Vec<String>,
    lines: Vec<Line>,
}

impl Table {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the column titles.
    pub fn set_header(&mut self, titles: &[&str]) {
        self.header = titles.iter().map(|t| (*t).to_string()).collect();
    }

    /// Append a row. Cells may contain newlines.
    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines
            .push(Line::Row(cells.into_iter().map(Into::into).collect()));
    }

    /// Append a horizontal rule.
    pub fn add_separator(&mut self) {
        self.lines.push(Line::Separator);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for line in &self.lines {
            let Line::Row(cells) = line else { continue };
            if widths.len() < cells.len() {
                widths.resize(cells.len(), 0);
            }
            for (width, cell) in widths.iter_mut().zip(cells) {
                let longest = cell.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                *width = (*width).max(longest);
            }
        }
        widths
    }

    /// Write the table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn render(&self, writer: &mut dyn Write) -> io::Result<()> {
        let widths = self.widths();
        let total = widths.iter().sum::<usize>() + COLUMN_GAP.len() * widths.len().saturating_sub(1);
        let rule = "─".repeat(total);

        if !self.header.is_empty() {
            write_cells(writer, &widths, &self.header)?;
            writeln!(writer, "{rule}")?;
        }
        for line in &self.lines {
            match line {
                Line::Row(cells) => write_cells(writer, &widths, cells)?,
                Line::Separator => writeln!(writer, "{rule}")?,
            }
        }
        Ok(())
    }
}

fn write_cells(writer: &mut dyn Write, widths: &[usize], cells: &[String]) -> io::Result<()> {
    let split: Vec<Vec<&str>> = cells.iter().map(|c| c.lines().collect()).collect();
    let height = split.iter().map(Vec::len).max().unwrap_or(0).max(1);

    for row in 0..height {
        let mut line = String::new();
        for (column, width) in widths.iter().enumerate() {
            if column > 0 {
                line.push_str(COLUMN_GAP);
            }
            let text = split
                .get(column)
                .and_then(|parts| parts.get(row))
                .copied()
                .unwrap_or("");
            line.push_str(&format!("{text:<width$}"));
        }
        writeln!(writer, "{}", line.trim_end())?;
    }
    Ok(())
}
