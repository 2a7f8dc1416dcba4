use super::Document;
use crate::error::{LedgerError, Result};
use crate::storage::{parse_sheet, write_markdown, write_sheet};
use std::path::{Path, PathBuf};

impl Document {
    /// Save to current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = &self.file_path else {
            return Err(LedgerError::NoFilePath);
        };

        write_sheet(path, &self.sheet)?;
        self.modified = false;
        log::info!("saved {}", path.display());
        Ok(path.clone())
    }

    /// Save to `path` and make it the current file path.
    pub fn save_as(&mut self, path: &Path) -> Result<PathBuf> {
        write_sheet(path, &self.sheet)?;
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        log::info!("saved {}", path.display());
        Ok(path.to_path_buf())
    }

    /// Load from file. A file that fails to read or parse leaves the
    /// document untouched.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let sheet = match parse_sheet(path) {
            Ok(sheet) => sheet,
            Err(e) => {
                log::warn!("rejected {}: {}", path.display(), e);
                return Err(e);
            }
        };

        let format = self.sheet.format_options().clone();
        self.sheet = sheet;
        self.sheet.set_format_options(format);
        self.selection.set_bounds(self.sheet.bounds());
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        log::info!("loaded {} ({} cells)", path.display(), self.sheet.len());
        Ok(())
    }

    /// Export the displayed sheet as a markdown table.
    pub fn export_markdown(&self, path: &Path) -> Result<()> {
        write_markdown(path, &self.sheet)?;
        Ok(())
    }
}
