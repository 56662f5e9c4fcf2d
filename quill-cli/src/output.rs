//! Terminal output helpers shared by the commands.

use std::io::{self, Write};

use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use dialoguer::console::style;
use serde::Serialize;

/// Prints a success message with a green checkmark.
pub fn print_success(message: &str) -> io::Result<()> {
    print_success_to(&mut io::stdout(), message)
}

/// Prints a success message to a writer (for testing).
pub fn print_success_to<W: Write>(w: &mut W, message: &str) -> io::Result<()> {
    writeln!(w, "{} {}", style("✓").green().bold(), style(message).green())
}

/// Prints an error message with a red X.
pub fn print_error(message: &str) -> io::Result<()> {
    print_error_to(&mut io::stdout(), message)
}

/// Prints an error message to a writer (for testing).
pub fn print_error_to<W: Write>(w: &mut W, message: &str) -> io::Result<()> {
    writeln!(w, "{} {}", style("✗").red().bold(), style(message).red())
}

/// Pretty-prints a value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Table with the house style and cyan headers.
pub fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

/// First eight characters of an id, enough to address it from the CLI.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
