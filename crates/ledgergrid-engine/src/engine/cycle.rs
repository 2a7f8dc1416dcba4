//! Circular dependency detection and evaluation ordering.
//!
//! A formula cell that can reach itself through its dependencies can never be
//! computed, so it gets `#CIRCULAR` instead of being evaluated. Both routines
//! here walk the graph with explicit stacks, so long reference chains cannot
//! exhaust the call stack.

use std::collections::{HashMap, HashSet};

use super::cell_ref::Address;

/// Detect a cycle that leads from `start` back to `start`.
/// Returns the path (starting and ending with `start`) if one exists.
pub fn detect_cycle<F>(start: &Address, deps_of: F) -> Option<Vec<Address>>
where
    F: Fn(&Address) -> Vec<Address>,
{
    let mut visited = HashSet::new();
    let mut stack: Vec<(Address, Vec<Address>, usize)> = vec![(*start, deps_of(start), 0)];

    while let Some((_, deps, next)) = stack.last_mut() {
        let Some(dep) = deps.get(*next).copied() else {
            stack.pop();
            continue;
        };
        *next += 1;

        if dep == *start {
            let mut path: Vec<Address> = stack.iter().map(|(addr, _, _)| *addr).collect();
            path.push(*start);
            return Some(path);
        }
        if visited.insert(dep) {
            let deps = deps_of(&dep);
            stack.push((dep, deps, 0));
        }
    }
    None
}

/// A strongly connected group of cells, evaluated as a unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    pub cells: Vec<Address>,
    /// True when the cells depend on each other (or a cell on itself).
    pub circular: bool,
}

/// Order `cells` for evaluation, dependencies first.
///
/// Only edges between members of `cells` are followed; anything outside the
/// set is assumed to be computed already. Cells that sit on a cycle come back
/// grouped in a component flagged `circular`.
pub fn evaluation_order<F>(cells: &[Address], deps_of: F) -> Vec<Component>
where
    F: Fn(&Address) -> Vec<Address>,
{
    let members: HashSet<Address> = cells.iter().copied().collect();
    let edges = |addr: &Address| -> Vec<Address> {
        deps_of(addr)
            .into_iter()
            .filter(|dep| members.contains(dep))
            .collect()
    };

    let mut index: HashMap<Address, usize> = HashMap::with_capacity(cells.len());
    let mut lowlink: HashMap<Address, usize> = HashMap::with_capacity(cells.len());
    let mut on_stack: HashSet<Address> = HashSet::new();
    let mut stack: Vec<Address> = Vec::new();
    let mut components = Vec::new();
    let mut counter = 0usize;

    for root in cells {
        if index.contains_key(root) {
            continue;
        }

        let mut frames: Vec<(Address, Vec<Address>, usize)> = Vec::new();
        index.insert(*root, counter);
        lowlink.insert(*root, counter);
        counter += 1;
        stack.push(*root);
        on_stack.insert(*root);
        frames.push((*root, edges(root), 0));

        while let Some((node, deps, next)) = frames.last_mut() {
            let node = *node;
            if let Some(dep) = deps.get(*next).copied() {
                *next += 1;
                if !index.contains_key(&dep) {
                    index.insert(dep, counter);
                    lowlink.insert(dep, counter);
                    counter += 1;
                    stack.push(dep);
                    on_stack.insert(dep);
                    frames.push((dep, edges(&dep), 0));
                } else if on_stack.contains(&dep) {
                    let low = lowlink[&node].min(index[&dep]);
                    lowlink.insert(node, low);
                }
                continue;
            }

            let (_, deps, _) = frames.pop().unwrap_or((node, Vec::new(), 0));
            if let Some((parent, _, _)) = frames.last() {
                let low = lowlink[parent].min(lowlink[&node]);
                lowlink.insert(*parent, low);
            }

            if lowlink[&node] == index[&node] {
                let mut group = Vec::new();
                while let Some(member) = stack.pop() {
                    on_stack.remove(&member);
                    group.push(member);
                    if member == node {
                        break;
                    }
                }
                let circular = group.len() > 1 || deps.contains(&node);
                group.sort();
                components.push(Component {
                    cells: group,
                    circular,
                });
            }
        }
    }

    components
}
