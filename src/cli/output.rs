//! Console output helpers: message lines, tables, amounts, progress bars.

use std::fmt;

use colored::Colorize;

pub fn info(message: impl fmt::Display) {
    println!("{} {}", "[i]".cyan(), message);
}

pub fn success(message: impl fmt::Display) {
    println!("{} {}", "[✓]".green(), message);
}

pub fn warning(message: impl fmt::Display) {
    println!("{} {}", "[!]".yellow(), message);
}

pub fn error(message: impl fmt::Display) {
    eprintln!("{} {}", "[x]".red(), message);
}

pub fn section(title: impl fmt::Display) {
    println!("{}", format!("=== {} ===", title).bright_blue().bold());
}

/// Renders rows as padded columns under a header line.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if idx < widths.len() {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }
    }

    let header_line = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| pad(header, widths[idx]))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header_line.bright_blue().bold());
    println!("{}", "─".repeat(header_line.chars().count()));

    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(idx, cell)| pad(cell, widths.get(idx).copied().unwrap_or(0)))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let mut padded = text.to_string();
    padded.extend(std::iter::repeat(' ').take(width.saturating_sub(len)));
    padded
}

/// Formats an amount in the display currency, grouping the integer part
/// with dots (vi-VN style): `1500000` → `1.500.000 ₫`.
pub fn format_vnd(amount: f64) -> String {
    let negative = amount < 0.0;
    let whole = amount.abs().round() as i64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{} ₫", grouped)
    } else {
        format!("{} ₫", grouped)
    }
}

/// Renders a spending progress bar. The fill is clamped at 100% and the
/// bar turns red once spending exceeds the allocation.
pub fn progress_bar(spent: f64, allocated: f64, width: usize) -> String {
    let ratio = if allocated > 0.0 {
        spent / allocated
    } else if spent > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };
    let filled = ((ratio.min(1.0) * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(width.saturating_sub(filled))
    );
    let percent = if ratio.is_infinite() {
        "∞".to_string()
    } else {
        format!("{:.0}%", ratio * 100.0)
    };
    if ratio > 1.0 {
        format!("{} {}", bar.red(), percent.red().bold())
    } else {
        format!("{} {}", bar.green(), percent)
    }
}

/// Width available for progress bars, derived from the terminal when one
/// is attached.
pub fn bar_width() -> usize {
    match crossterm::terminal::size() {
        Ok((columns, _)) if columns >= 72 => 32,
        Ok((columns, _)) => (columns as usize / 2).clamp(10, 32),
        Err(_) => 24,
    }
}
