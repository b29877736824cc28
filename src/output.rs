// Terminal output: status lines, JSON, tables and spinners
//
// Normal results go to stdout. Errors, spinners and diagnostics go to stderr.

use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::IsTerminal;
use std::time::Duration;

/// Output settings derived from the global flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Output {
    json: bool,
    color: bool,
}

impl Output {
    pub fn new(json: bool, color: bool) -> Self {
        Self { json, color }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn success(&self, message: &str) {
        let line = format!("✓ {message}");
        if self.color {
            println!("{}", line.green());
        } else {
            println!("{line}");
        }
    }

    pub fn error(&self, message: &str) {
        let line = format!("✗ {message}");
        if self.color {
            eprintln!("{}", line.red());
        } else {
            eprintln!("{line}");
        }
    }

    pub fn line(&self, text: &str) {
        println!("{text}");
    }

    /// Pretty-print any serializable value
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{text}"),
            Err(e) => tracing::error!("Failed to serialize output: {}", e),
        }
    }

    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        print!("{}", render_table(headers, rows, self.color));
    }

    /// Spinner on stderr; hidden in JSON mode or when stderr is not a terminal
    pub fn spinner(&self, message: &str) -> Spinner {
        if self.json || !std::io::stderr().is_terminal() {
            return Spinner(ProgressBar::hidden());
        }

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Spinner(bar)
    }
}

/// Running spinner; cleared on drop
pub struct Spinner(ProgressBar);

impl Spinner {
    pub fn stop(&self) {
        self.0.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.0.is_finished() {
            self.0.finish_and_clear();
        }
    }
}

/// Render a box-drawing table
pub fn render_table(headers: &[&str], rows: &[Vec<String>], color: bool) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let border = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}\n", segments.join(mid))
    };

    let mut out = String::new();
    out.push_str(&border("┌", "┬", "┐"));

    out.push('│');
    for (header, width) in headers.iter().zip(&widths) {
        let cell = pad(header, *width);
        if color {
            out.push_str(&format!(" {} │", cell.cyan()));
        } else {
            out.push_str(&format!(" {cell} │"));
        }
    }
    out.push('\n');

    out.push_str(&border("├", "┼", "┤"));
    for row in rows {
        out.push('│');
        for (i, width) in widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            out.push_str(&format!(" {} │", pad(cell, *width)));
        }
        out.push('\n');
    }
    out.push_str(&border("└", "┴", "┘"));
    out
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}

/// Symbol prefix for a currency code
pub fn currency_symbol(code: &str) -> String {
    match code {
        "EUR" => "€".to_string(),
        "USD" => "$".to_string(),
        "GBP" => "£".to_string(),
        other => format!("{other} "),
    }
}

/// Format an amount with its currency symbol and two decimals
pub fn format_currency(amount: f64, currency: &str) -> String {
    format!("{}{:.2}", currency_symbol(currency), amount)
}
