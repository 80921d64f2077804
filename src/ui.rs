//! Terminal output.
//!
//! - [`Console`] routes log lines around the progress bar so echoed
//!   commands and compiler diagnostics never tear the bar.
//! - [`Table`] renders the end-of-build summary with box-drawing characters,
//!   shrinking the widest column until it fits the terminal.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::cmp;
use std::fmt::Display;

pub struct Console {
    bar: ProgressBar,
    verbose: bool,
}

impl Console {
    /// Progress bar over `total_steps` build steps. Drawn on stderr and
    /// hidden automatically when stderr is not a terminal.
    pub fn new(total_steps: u64, verbose: bool) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());

        let bar = ProgressBar::new(total_steps);
        bar.set_style(style);
        Self { bar, verbose }
    }

    pub fn hidden(verbose: bool) -> Self {
        Self {
            bar: ProgressBar::hidden(),
            verbose,
        }
    }

    pub fn println(&self, msg: impl Display) {
        self.bar.suspend(|| println!("{}", msg));
    }

    /// Printed only with `--verbose`.
    pub fn detail(&self, msg: impl Display) {
        if self.verbose {
            self.println(format!("   {} {}", "·".dimmed(), msg));
        }
    }

    pub fn echo(&self, command_line: &str) {
        self.println(format!(">> {}", command_line));
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.bar.set_message(msg.into());
    }

    pub fn step_done(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

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

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn print(&self) {
        let (_, term_width) = console::Term::stdout().size();
        print!("{}", self.render(term_width as usize));
    }

    pub fn render(&self, max_width: usize) -> String {
        if self.headers.is_empty() {
            return String::new();
        }

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = cmp::max(widths[i], console::measure_text_width(&flatten(cell)));
            }
        }
        fit_widths(&mut widths, max_width);

        let sep = |left: &str, mid: &str, right: &str| -> String {
            let inner: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}\n", left, inner.join(mid), right)
        };

        let line = |cells: Vec<String>, bold: bool| -> String {
            let mut s = String::from("  │");
            for (cell, width) in cells.iter().zip(&widths) {
                let shown = console::truncate_str(cell, *width, "...").to_string();
                let pad = width.saturating_sub(console::measure_text_width(&shown));
                let shown = if bold {
                    shown.bold().to_string()
                } else {
                    shown
                };
                s.push_str(&format!(" {}{} │", shown, " ".repeat(pad)));
            }
            s.push('\n');
            s
        };

        let mut out = sep("┌", "┬", "┐");
        out.push_str(&line(self.headers.clone(), true));
        out.push_str(&sep("├", "┼", "┤"));
        for row in &self.rows {
            out.push_str(&line(row.iter().map(|c| flatten(c)).collect(), false));
        }
        out.push_str(&sep("└", "┴", "┘"));
        out
    }
}

// Narrow the widest column one char at a time, never below 8.
fn fit_widths(widths: &mut [usize], max_width: usize) {
    let overhead = 3 + 3 * widths.len();
    let available = max_width.saturating_sub(overhead);
    let mut total: usize = widths.iter().sum();

    while total > available {
        let Some((idx, &widest)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
            break;
        };
        if widest <= 8 {
            break;
        }
        widths[idx] -= 1;
        total -= 1;
    }
}

fn flatten(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_renders_rows() {
        colored::control::set_override(false);
        let mut table = Table::new(&["Project", "Step"]);
        table.add_row(vec!["libneac".into(), "compile".into()]);
        table.add_row(vec!["too".into(), "many".into(), "cells".into()]);
        let out = table.render(120);
        assert!(out.contains("libneac"));
        assert!(out.contains("compile"));
        assert!(!out.contains("cells"));
        assert_eq!(out.lines().count(), 5);
    }

    #[test]
    fn test_table_empty_until_a_valid_row() {
        let mut table = Table::new(&["Project", "Step"]);
        assert!(table.is_empty());
        table.add_row(vec!["only one cell".into()]);
        assert!(table.is_empty());
        table.add_row(vec!["neac".into(), "link".into()]);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_table_shrinks_to_width() {
        colored::control::set_override(false);
        let mut table = Table::new(&["Path"]);
        table.add_row(vec!["x".repeat(200)]);
        let out = table.render(40);
        for line in out.lines() {
            assert!(console::measure_text_width(line) <= 40, "{}", line);
        }
        assert!(out.contains("..."));
    }

    #[test]
    fn test_fit_widths_keeps_minimum() {
        let mut widths = vec![30, 30];
        fit_widths(&mut widths, 10);
        assert_eq!(widths, vec![8, 8]);
    }
}
