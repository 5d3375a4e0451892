//! Console rendering: aligned tables built from the admin descriptions, or JSON.
#![allow(clippy::print_stdout)]

use abook_addresses::ListField;
use abook_addresses::admin::ModelAdmin;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::{self, Display};

const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    /// Prints one record as `id  display`, or its JSON form.
    pub fn record<I, T>(&self, id: &I, record: &T) -> Result<()>
    where
        I: Display,
        T: Display + Serialize,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(record).context("Serializing record")?);
        } else {
            println!("{id}{COLUMN_GAP}{record}");
        }
        Ok(())
    }

    /// Prints `rows` under the admin's `list_display` headers.
    pub fn table<F, I>(&self, title: &str, admin: &ModelAdmin<F, I>, rows: &[F::Row]) -> Result<()>
    where
        F: ListField,
        F::Row: Serialize,
        I: 'static,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(rows).context("Serializing rows")?);
            return Ok(());
        }

        let headers = admin.headers();
        let cells: Vec<Vec<String>> = rows.iter().map(|row| admin.row(row)).collect();
        println!("{title} ({})", rows.len());
        if rows.is_empty() {
            return Ok(());
        }
        print!("{}", render(&headers, &cells));
        Ok(())
    }

    /// Informational line; suppressed in JSON mode so stdout stays parseable.
    pub fn note(&self, message: fmt::Arguments<'_>) {
        if !self.json {
            println!("{message}");
        }
    }
}

fn render(headers: &[&str], cells: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> =
        cells.zip(widths).map(|(cell, &width)| format!("{cell:<width$}")).collect();
    out.push_str(line.join(COLUMN_GAP).trim_end());
    out.push('\n');
}
