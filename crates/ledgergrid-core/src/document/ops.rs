use super::Document;
use crate::error::Result;
use crate::selection::Direction;
use crate::template::Template;
use ledgergrid_engine::engine::{Address, DeclaredType, Style};

impl Document {
    pub fn active_cell(&self) -> Address {
        self.selection.current()
    }

    /// Make `addr` the active cell (clamped into the grid).
    pub fn select(&mut self, addr: Address) -> Address {
        self.selection.move_to(addr)
    }

    pub fn move_selection(&mut self, direction: Direction) -> Address {
        self.selection.move_direction(direction)
    }

    /// Store `text` in the active cell and move down a row.
    /// Returns the cells whose display changed. On a parse error nothing
    /// changes and the selection stays put.
    pub fn commit_edit(&mut self, text: &str) -> Result<Vec<Address>> {
        let invalidated = self.set_cell(self.active_cell(), text)?;
        self.selection.advance_after_commit();
        Ok(invalidated)
    }

    /// Like [`Document::commit_edit`], but moves right a column.
    pub fn commit_edit_tab(&mut self, text: &str) -> Result<Vec<Address>> {
        let invalidated = self.set_cell(self.active_cell(), text)?;
        self.selection.advance_after_tab();
        Ok(invalidated)
    }

    pub fn set_cell(&mut self, addr: Address, text: &str) -> Result<Vec<Address>> {
        let invalidated = self.sheet.set_raw_content(addr, text)?;
        self.modified = true;
        Ok(invalidated)
    }

    pub fn clear_cell(&mut self, addr: Address) -> Result<Vec<Address>> {
        self.set_cell(addr, "")
    }

    pub fn set_cell_type(&mut self, addr: Address, declared_type: DeclaredType) -> Result<()> {
        self.sheet.set_declared_type(addr, declared_type)?;
        self.modified = true;
        Ok(())
    }

    /// Set the declared type of the active cell.
    pub fn apply_format(&mut self, declared_type: DeclaredType) -> Result<()> {
        self.set_cell_type(self.active_cell(), declared_type)
    }

    /// Set the style of the active cell.
    pub fn apply_style(&mut self, style: Style) -> Result<()> {
        self.sheet.set_style(self.active_cell(), style)?;
        self.modified = true;
        Ok(())
    }

    /// What the formula bar shows: the active cell's raw content.
    pub fn formula_bar_text(&self) -> String {
        self.sheet.get(&self.active_cell()).raw
    }

    pub fn display(&self, addr: &Address) -> String {
        self.sheet.display(addr)
    }

    /// Replace every cell with the template's. Name, size and selection are
    /// kept.
    pub fn load_template(&mut self, template: &Template) -> Result<()> {
        self.sheet.replace_cells(template.cells.iter().cloned())?;
        self.modified = true;
        log::info!(
            "loaded template {} ({} cells)",
            template.id,
            template.cells.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::find_builtin;
    use ledgergrid_engine::engine::{TextAlign, Value};

    fn a(text: &str) -> Address {
        Address::decode(text).unwrap()
    }

    #[test]
    fn test_commit_edit_advances() {
        let mut doc = Document::new();
        doc.select(a("B2"));
        doc.commit_edit("5").unwrap();
        assert_eq!(doc.active_cell(), a("B3"));
        doc.commit_edit_tab("=B2*2").unwrap();
        assert_eq!(doc.active_cell(), a("C3"));
        assert_eq!(doc.sheet.value(&a("B3")), Value::Number(10.0));
        assert!(doc.modified);
    }

    #[test]
    fn test_failed_commit_stays_put() {
        let mut doc = Document::new();
        doc.select(a("A4"));
        assert!(doc.commit_edit("=1+").is_err());
        assert_eq!(doc.active_cell(), a("A4"));
        assert!(doc.sheet.is_empty());
        assert!(!doc.modified);
    }

    #[test]
    fn test_formula_bar_shows_raw_content() {
        let mut doc = Document::new();
        doc.commit_edit("=SUM(A2:A3)").unwrap();
        doc.select(a("A1"));
        assert_eq!(doc.formula_bar_text(), "=SUM(A2:A3)");
        assert_eq!(doc.display(&a("A1")), "0");
        doc.select(a("Z50"));
        assert_eq!(doc.formula_bar_text(), "");
    }

    #[test]
    fn test_apply_format_and_style_to_active_cell() {
        let mut doc = Document::new();
        doc.select(a("C1"));
        doc.apply_format(DeclaredType::Percentage).unwrap();
        doc.apply_style(Style {
            text_align: Some(TextAlign::Right),
            ..Style::default()
        })
        .unwrap();
        doc.commit_edit("0.075").unwrap();
        assert_eq!(doc.display(&a("C1")), "7.50%");
        assert_eq!(doc.sheet.get(&a("C1")).style.text_align, Some(TextAlign::Right));
    }

    #[test]
    fn test_template_then_edit() {
        let mut doc = Document::new();
        doc.load_template(&find_builtin("balance-sheet").unwrap()).unwrap();
        let before = doc.sheet.len();

        doc.set_cell(a("D20"), "note").unwrap();
        assert_eq!(doc.sheet.len(), before + 1);
        assert_eq!(doc.display(&a("A5")), "Cash");
        assert_eq!(doc.display(&a("B8")), "$30,000.00");

        doc.set_cell(a("B5"), "20000").unwrap();
        assert_eq!(doc.display(&a("B8")), "$40,000.00");
        assert_eq!(doc.display(&a("B16")), "$32,000.00");
    }

    #[test]
    fn test_second_template_replaces_first() {
        let mut doc = Document::new();
        doc.load_template(&find_builtin("balance-sheet").unwrap()).unwrap();
        doc.set_cell(a("D20"), "note").unwrap();
        doc.load_template(&find_builtin("income-statement").unwrap()).unwrap();

        assert_eq!(doc.display(&a("A1")), "INCOME STATEMENT");
        assert_eq!(doc.display(&a("D20")), "");
        assert_eq!(doc.display(&a("B16")), "");
        assert_eq!(doc.display(&a("B13")), "$35,000.00");
        assert_eq!(doc.sheet.name(), "Sheet1");
    }
}
