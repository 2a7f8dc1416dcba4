//! Storage: JSON sheet files and Markdown export

mod json;
mod md;

pub use json::{SheetFile, parse_sheet, parse_sheet_content, write_sheet, write_sheet_content};
pub use md::{markdown_content, write_markdown};
