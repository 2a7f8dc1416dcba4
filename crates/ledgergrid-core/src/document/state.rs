use crate::error::Result;
use crate::selection::Selection;
use crate::sheet::Sheet;
use ledgergrid_engine::engine::{FormatOptions, GridBounds};
use std::path::PathBuf;

/// UI-agnostic document state: one sheet, the active cell and where the
/// sheet lives on disk.
#[derive(Clone, Debug)]
pub struct Document {
    pub sheet: Sheet,
    pub selection: Selection,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the sheet has been modified since the last save or load
    pub modified: bool,
}

impl Document {
    /// Create an empty document with the default grid size.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Self::with_sheet(Sheet::default())
    }

    pub fn with_sheet(sheet: Sheet) -> Self {
        let selection = Selection::new(sheet.bounds());
        Document {
            sheet,
            selection,
            file_path: None,
            modified: false,
        }
    }

    /// Empty document with a given name, size and display settings.
    pub fn blank(name: &str, bounds: GridBounds, format: FormatOptions) -> Self {
        let mut sheet = Sheet::new(name, bounds);
        sheet.set_format_options(format);
        Self::with_sheet(sheet)
    }

    /// Open `path` if it exists; otherwise remember it as the save target.
    pub fn with_file(mut self, path: Option<PathBuf>) -> Result<Self> {
        if let Some(p) = path {
            if p.exists() {
                self.load_file(&p)?;
            } else {
                self.file_path = Some(p);
                self.modified = false;
            }
        }
        Ok(self)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
