//! Markdown export functionality

use crate::sheet::Sheet;
use ledgergrid_engine::engine::Address;
use std::fmt::Write as _;
use std::path::Path;

/// Write the sheet's display strings to a markdown file
pub fn write_markdown(path: &Path, sheet: &Sheet) -> std::io::Result<()> {
    std::fs::write(path, markdown_content(sheet))
}

/// Render the populated rectangle of the sheet as a markdown table
pub fn markdown_content(sheet: &Sheet) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_table(&mut out, sheet);
    out
}

fn write_table(out: &mut String, sheet: &Sheet) -> std::fmt::Result {
    writeln!(out, "# {}", escape_markdown(sheet.name()))?;
    writeln!(out)?;

    let Some((min_row, min_col, max_row, max_col)) = find_grid_bounds(sheet) else {
        writeln!(out, "*Empty spreadsheet*")?;
        return Ok(());
    };

    // Header with column letters
    write!(out, "|   |")?;
    for col in min_col..=max_col {
        write!(out, " {} |", Address::col_to_letters(col))?;
    }
    writeln!(out)?;

    write!(out, "|---|")?;
    for _ in min_col..=max_col {
        write!(out, "---|")?;
    }
    writeln!(out)?;

    for row in min_row..=max_row {
        write!(out, "| {} |", row)?;
        for col in min_col..=max_col {
            let display = sheet.display(&Address::new(row, col));
            write!(out, " {} |", escape_markdown(&display))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Smallest rectangle holding every cell with content.
fn find_grid_bounds(sheet: &Sheet) -> Option<(usize, usize, usize, usize)> {
    let mut populated = sheet
        .addresses()
        .into_iter()
        .filter(|addr| sheet.cell(addr).is_some_and(|cell| !cell.raw.trim().is_empty()))
        .peekable();
    populated.peek()?;

    let mut min_row = usize::MAX;
    let mut min_col = usize::MAX;
    let mut max_row = 0usize;
    let mut max_col = 0usize;
    for addr in populated {
        min_row = min_row.min(addr.row);
        min_col = min_col.min(addr.col);
        max_row = max_row.max(addr.row);
        max_col = max_col.max(addr.col);
    }
    Some((min_row, min_col, max_row, max_col))
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}
