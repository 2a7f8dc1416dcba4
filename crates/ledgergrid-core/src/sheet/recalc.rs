use super::Sheet;
use ledgergrid_engine::engine::{
    Address, CellType, ErrorValue, Value, evaluate, evaluation_order,
};
use std::collections::{HashSet, VecDeque};

impl Sheet {
    /// Mark the changed cell and everything that depends on it (transitively)
    /// as stale. Returns the affected addresses in row-major order.
    pub(crate) fn invalidate(&mut self, changed: Address) -> Vec<Address> {
        let mut queue = VecDeque::from([changed]);
        let mut visited = HashSet::from([changed]);
        while let Some(addr) = queue.pop_front() {
            if let Some(deps) = self.dependents.get(&addr) {
                for dep in deps {
                    if visited.insert(*dep) {
                        queue.push_back(*dep);
                    }
                }
            }
        }

        let mut affected: Vec<Address> = visited.into_iter().collect();
        affected.sort();
        for addr in &affected {
            if let Some(cell) = self.cells.get_mut(addr) {
                cell.stale = true;
                cell.computed = Value::Empty;
            }
        }
        affected
    }

    /// Recompute the given stale cells, dependencies first. Cells on a
    /// dependency cycle get `#CIRCULAR` without being evaluated.
    pub(crate) fn recalculate(&mut self, stale: &[Address]) {
        let order = evaluation_order(stale, |addr| {
            self.cells
                .get(addr)
                .map(|cell| cell.depends_on.clone())
                .unwrap_or_default()
        });

        let mut circular = 0usize;
        for component in order {
            if component.circular {
                circular += component.cells.len();
                log::debug!(
                    "circular reference between {}",
                    component
                        .cells
                        .iter()
                        .map(|a| a.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                for addr in &component.cells {
                    self.store(addr, Value::Error(ErrorValue::Circular));
                }
                continue;
            }
            for addr in &component.cells {
                let value = self.compute(addr);
                self.store(addr, value);
            }
        }
        log::debug!(
            "recalculated {} cell(s), {} circular",
            stale.len(),
            circular
        );
    }

    /// Mark every cell stale and recompute the whole sheet.
    pub(crate) fn recalculate_all(&mut self) {
        let mut all: Vec<Address> = self.cells.keys().copied().collect();
        all.sort();
        for cell in self.cells.values_mut() {
            cell.stale = true;
            cell.computed = Value::Empty;
        }
        self.recalculate(&all);
    }

    fn compute(&self, addr: &Address) -> Value {
        let Some(cell) = self.cells.get(addr) else {
            return Value::Empty;
        };
        match &cell.contents {
            CellType::Formula(expr) => evaluate(expr, &|a: &Address| self.read(a)),
            _ => cell.literal_value().unwrap_or_default(),
        }
    }

    fn read(&self, addr: &Address) -> Value {
        self.cells
            .get(addr)
            .map(|cell| cell.computed.clone())
            .unwrap_or_default()
    }

    fn store(&mut self, addr: &Address, value: Value) {
        if let Some(cell) = self.cells.get_mut(addr) {
            cell.computed = value;
            cell.stale = false;
        }
    }
}
