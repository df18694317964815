//! Terminal output helpers.
//!
//! A box-drawn table that fits the terminal width, used by `gopin list` and
//! the rewrite report.
//!
//! ```text
//!   ┌──────┬────────────────────────────┬──────────────┐
//!   │ Kind │ Location                   │ Revision     │
//!   ├──────┼────────────────────────────┼──────────────┤
//!   │ git  │ github.com/coreos/go-etcd  │ 6aa2da5a7a90 │
//!   └──────┴────────────────────────────┴──────────────┘
//! ```

use crate::package::PackageSpec;
use colored::*;

const MIN_COLUMN: usize = 8;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are dropped.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    pub fn print(&self) {
        let (_, term_width) = console::Term::stdout().size();
        for line in self.render(term_width as usize) {
            println!("{}", line);
        }
    }

    fn column_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| console::measure_text_width(h))
            .collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(console::measure_text_width(&flatten(cell)));
            }
        }

        // Indent plus borders and padding around every cell.
        let overhead = 3 + 3 * widths.len();
        let budget = max_width.saturating_sub(overhead);
        while widths.iter().sum::<usize>() > budget {
            let Some(widest) = widths
                .iter_mut()
                .filter(|w| **w > MIN_COLUMN)
                .max_by_key(|w| **w)
            else {
                break;
            };
            *widest -= 1;
        }
        widths
    }

    fn render(&self, max_width: usize) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }
        let widths = self.column_widths(max_width);

        let border = |left: &str, mid: &str, right: &str| {
            let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, cells.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| {
            let mut out = String::from("  │");
            for (cell, &width) in cells.iter().zip(&widths) {
                let text = console::truncate_str(&flatten(cell), width, "...").to_string();
                let pad = width.saturating_sub(console::measure_text_width(&text));
                let text = if bold { text.bold().to_string() } else { text };
                out.push_str(&format!(" {}{} │", text, " ".repeat(pad)));
            }
            out
        };

        let mut lines = vec![border("┌", "┬", "┐"), line(self.headers.as_slice(), true)];
        lines.push(border("├", "┼", "┤"));
        lines.extend(self.rows.iter().map(|row| line(row.as_slice(), false)));
        lines.push(border("└", "┴", "┘"));
        lines
    }
}

fn flatten(s: &str) -> String {
    s.replace(['\n', '\r', '\t'], " ")
}

/// Print the package table in declared order.
pub fn print_packages(packages: &[PackageSpec]) {
    if packages.is_empty() {
        println!("{} No packages declared.", "!".yellow());
        return;
    }
    let mut table = Table::new(&["Kind", "Location", "Revision"]);
    for pkg in packages {
        table.add_row(vec![
            pkg.kind.to_string().cyan().to_string(),
            pkg.location.clone(),
            pkg.short_revision().dimmed().to_string(),
        ]);
    }
    table.print();
}
