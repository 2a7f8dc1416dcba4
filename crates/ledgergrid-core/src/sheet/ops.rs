use super::{CellRecord, Sheet};
use crate::error::{LedgerError, Result};
use ledgergrid_engine::engine::{
    Address, Cell, DeclaredType, Style, Value, detect_cycle, display, evaluate, parse_formula,
};
use std::collections::HashMap;

impl Sheet {
    /// The cell at `addr`; an implicit empty text cell when nothing was ever
    /// written there.
    pub fn get(&self, addr: &Address) -> Cell {
        self.cells.get(addr).cloned().unwrap_or_default()
    }

    pub fn cell(&self, addr: &Address) -> Option<&Cell> {
        self.cells.get(addr)
    }

    /// Store what the user typed and recompute everything it affects.
    ///
    /// Returns the invalidated addresses (the cell itself plus its transitive
    /// dependents, row-major) so a view can redraw just those. A bad address
    /// or a formula that does not parse leaves the sheet unchanged.
    pub fn set_raw_content(&mut self, addr: Address, text: &str) -> Result<Vec<Address>> {
        let addr = self.bounds.check(addr)?;
        let mut cell = self.get(&addr);
        let old_deps = cell.depends_on.clone();
        cell.set_raw(text, &self.bounds)?;

        self.unlink(addr, &old_deps);
        self.link(addr, &cell.depends_on);
        self.cells.insert(addr, cell);

        let invalidated = self.invalidate(addr);
        self.recalculate(&invalidated);
        Ok(invalidated)
    }

    /// Equivalent to writing "". The cell keeps its type and style.
    pub fn clear(&mut self, addr: Address) -> Result<Vec<Address>> {
        self.set_raw_content(addr, "")
    }

    /// Display metadata only; computed values are untouched.
    pub fn set_style(&mut self, addr: Address, style: Style) -> Result<()> {
        let addr = self.bounds.check(addr)?;
        self.cells.entry(addr).or_default().style = style;
        Ok(())
    }

    pub fn set_declared_type(&mut self, addr: Address, declared_type: DeclaredType) -> Result<()> {
        let addr = self.bounds.check(addr)?;
        self.cells.entry(addr).or_default().declared_type = declared_type;
        Ok(())
    }

    pub fn value(&self, addr: &Address) -> Value {
        self.cells
            .get(addr)
            .map(|cell| cell.computed.clone())
            .unwrap_or_default()
    }

    /// Formatted text for the grid.
    pub fn display(&self, addr: &Address) -> String {
        self.cells
            .get(addr)
            .map(|cell| display(cell, &self.format))
            .unwrap_or_default()
    }

    pub fn is_stale(&self, addr: &Address) -> bool {
        self.cells.get(addr).is_some_and(|cell| cell.stale)
    }

    /// Addresses with an entry, row-major.
    pub fn addresses(&self) -> Vec<Address> {
        let mut addrs: Vec<Address> = self.cells.keys().copied().collect();
        addrs.sort();
        addrs
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells whose formulas read `addr` directly, row-major.
    pub fn dependents_of(&self, addr: &Address) -> Vec<Address> {
        let mut deps: Vec<Address> = self
            .dependents
            .get(addr)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        deps.sort();
        deps
    }

    /// The chain of references that leads from `addr` back to itself, if any.
    pub fn cycle_through(&self, addr: &Address) -> Option<Vec<Address>> {
        detect_cycle(addr, |a| {
            self.cells
                .get(a)
                .map(|cell| cell.depends_on.clone())
                .unwrap_or_default()
        })
    }

    /// Evaluate a formula against the current values without storing it.
    /// The leading `=` is optional.
    pub fn evaluate_formula(&self, text: &str) -> Result<Value> {
        let expr = parse_formula(text.trim(), &self.bounds)?;
        Ok(evaluate(&expr, &|a: &Address| self.value(a)))
    }

    /// Persisted view of every populated cell, row-major.
    pub fn records(&self) -> Vec<(Address, CellRecord)> {
        self.addresses()
            .into_iter()
            .filter_map(|addr| self.cells.get(&addr).map(|cell| (addr, CellRecord::from(cell))))
            .collect()
    }

    /// Replace every cell with the given records and recompute the sheet.
    ///
    /// References are resolved against this sheet's bounds. The replacement
    /// is all-or-nothing: on the first bad reference or formula the sheet is
    /// left as it was and the error names the offending cell.
    pub fn replace_cells<I, K>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, CellRecord)>,
        K: AsRef<str>,
    {
        let mut cells = HashMap::new();
        for (reference, record) in records {
            let reference = reference.as_ref();
            let load_err = |source| LedgerError::Load {
                address: reference.to_string(),
                source,
            };
            let addr = self.bounds.resolve(reference).map_err(load_err)?;
            let mut cell = Cell::from_input(&record.raw_content, &self.bounds).map_err(load_err)?;
            cell.declared_type = record.declared_type;
            cell.style = record.style;
            cells.insert(addr, cell);
        }

        self.cells = cells;
        self.rebuild_dependents();
        self.recalculate_all();
        Ok(())
    }
}
