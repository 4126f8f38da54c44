use std::collections::{BTreeMap, BTreeSet};

use petgraph::visit::EdgeRef;

use super::{MoleculeRefinable, Refinable, RefinableOptions};
use crate::{Invariant, MoleculeGraph, Partition};

/// Atoms as vertices, bond orders as connectivity, colored by element symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomRefinable {
    symbols: Vec<&'static str>,
    /// `(neighbour, bond order)` for every atom.
    neighbours: Vec<Vec<(usize, usize)>>,
    max_bond_order: usize,
    options: RefinableOptions,
}

impl AtomRefinable {
    pub fn new(graph: &MoleculeGraph, options: RefinableOptions) -> Self {
        let symbols = graph.node_weights().map(|element| element.symbol()).collect();
        let mut neighbours = vec![Vec::new(); graph.node_count()];
        let mut max_bond_order = 0;
        for edge in graph.edge_references() {
            let (a, b) = (edge.source().index(), edge.target().index());
            let order = if options.ignore_bond_orders {
                1
            } else {
                edge.weight().order()
            };
            max_bond_order = max_bond_order.max(order);
            neighbours[a].push((b, order));
            neighbours[b].push((a, order));
        }
        Self {
            symbols,
            neighbours,
            max_bond_order,
            options,
        }
    }

    pub fn max_bond_order(&self) -> usize {
        self.max_bond_order
    }
}

impl Refinable for AtomRefinable {
    fn vertex_count(&self) -> usize {
        self.symbols.len()
    }

    fn connectivity(&self, i: usize, j: usize) -> usize {
        self.neighbours[i]
            .iter()
            .find(|(neighbour, _)| *neighbour == j)
            .map_or(0, |&(_, order)| order)
    }

    fn neighbours_in_block(&self, block: &BTreeSet<usize>, vertex: usize) -> Invariant {
        let inside = self.neighbours[vertex]
            .iter()
            .filter(|(neighbour, _)| block.contains(neighbour));
        if self.max_bond_order <= 1 {
            Invariant::Count(inside.count())
        } else {
            let mut counts = vec![0; self.max_bond_order];
            for &(_, order) in inside {
                counts[order - 1] += 1;
            }
            Invariant::Counts(counts)
        }
    }

    fn initial_partition(&self) -> Partition {
        if self.options.ignore_elements {
            return Partition::unit(self.vertex_count());
        }
        let mut cells: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
        for (atom, symbol) in self.symbols.iter().enumerate() {
            cells.entry(*symbol).or_default().insert(atom);
        }
        Partition::from_cells(cells.into_values())
    }
}

impl MoleculeRefinable for AtomRefinable {
    fn from_molecule(graph: &MoleculeGraph, options: RefinableOptions) -> Self {
        Self::new(graph, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_smiles;

    #[test]
    fn test_initial_partition_groups_by_symbol() {
        // O=C(N)C: O0 C1 N2 C3
        let graph = parse_smiles("O=C(N)C").unwrap();
        let refinable = AtomRefinable::new(&graph, RefinableOptions::default());
        assert_eq!(refinable.initial_partition().to_string(), "[1,3|2|0]");

        let unit = AtomRefinable::new(
            &graph,
            RefinableOptions {
                ignore_elements: true,
                ..Default::default()
            },
        );
        assert_eq!(unit.initial_partition().to_string(), "[0,1,2,3]");
    }

    #[test]
    fn test_aromatic_atoms_share_symbol() {
        let graph = parse_smiles("c1ccncc1C").unwrap();
        let refinable = AtomRefinable::new(&graph, RefinableOptions::default());
        assert_eq!(refinable.initial_partition().to_string(), "[0,1,2,4,5,6|3]");
    }

    #[test]
    fn test_connectivity_is_bond_order() {
        let graph = parse_smiles("C=CC#N").unwrap();
        let refinable = AtomRefinable::new(&graph, RefinableOptions::default());
        assert_eq!(refinable.connectivity(0, 1), 2);
        assert_eq!(refinable.connectivity(1, 0), 2);
        assert_eq!(refinable.connectivity(1, 2), 1);
        assert_eq!(refinable.connectivity(2, 3), 3);
        assert_eq!(refinable.connectivity(0, 3), 0);
        assert_eq!(refinable.max_bond_order(), 3);

        let flat = AtomRefinable::new(
            &graph,
            RefinableOptions {
                ignore_bond_orders: true,
                ..Default::default()
            },
        );
        assert_eq!(flat.connectivity(2, 3), 1);
        assert_eq!(flat.max_bond_order(), 1);
    }

    #[test]
    fn test_aromatic_bonds_have_order_five() {
        let graph = parse_smiles("c1ccccc1").unwrap();
        let refinable = AtomRefinable::new(&graph, RefinableOptions::default());
        assert_eq!(refinable.connectivity(0, 5), 5);
        assert_eq!(refinable.max_bond_order(), 5);
    }

    #[test]
    fn test_invariant_kind_follows_bond_orders() {
        let single = parse_smiles("CCC").unwrap();
        let refinable = AtomRefinable::new(&single, RefinableOptions::default());
        let block = BTreeSet::from([0, 2]);
        assert_eq!(refinable.neighbours_in_block(&block, 1), Invariant::Count(2));
        assert_eq!(refinable.neighbours_in_block(&block, 0), Invariant::Count(0));

        let mixed = parse_smiles("C=CC").unwrap();
        let refinable = AtomRefinable::new(&mixed, RefinableOptions::default());
        assert_eq!(
            refinable.neighbours_in_block(&block, 1),
            Invariant::Counts(vec![1, 1])
        );
    }
}
