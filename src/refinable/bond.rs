use std::collections::{BTreeMap, BTreeSet};

use petgraph::visit::EdgeRef;

use super::{MoleculeRefinable, Refinable, RefinableOptions};
use crate::{Invariant, MoleculeGraph, Partition};

/// Bonds as vertices. Two bonds are connected when they share an atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondRefinable {
    descriptors: Vec<String>,
    /// Bonds sharing an atom with each bond, ascending.
    neighbours: Vec<Vec<usize>>,
}

impl BondRefinable {
    pub fn new(graph: &MoleculeGraph, options: RefinableOptions) -> Self {
        let descriptors = graph
            .edge_references()
            .map(|edge| {
                let order = if options.ignore_bond_orders {
                    1
                } else {
                    edge.weight().order()
                };
                if options.ignore_elements {
                    return order.to_string();
                }
                let a = graph[edge.source()].symbol();
                let b = graph[edge.target()].symbol();
                let (first, second) = if a < b { (a, b) } else { (b, a) };
                format!("{first}{order}{second}")
            })
            .collect();

        let mut neighbours = vec![BTreeSet::new(); graph.edge_count()];
        for atom in graph.node_indices() {
            let incident: Vec<usize> = graph.edges(atom).map(|e| e.id().index()).collect();
            for &a in &incident {
                for &b in &incident {
                    if a != b {
                        neighbours[a].insert(b);
                    }
                }
            }
        }

        Self {
            descriptors,
            neighbours: neighbours
                .into_iter()
                .map(|set| set.into_iter().collect())
                .collect(),
        }
    }

    /// The `"<element><order><element>"` label of `bond`, used for the initial coloring.
    pub fn descriptor(&self, bond: usize) -> &str {
        &self.descriptors[bond]
    }
}

impl Refinable for BondRefinable {
    fn vertex_count(&self) -> usize {
        self.descriptors.len()
    }

    fn connectivity(&self, i: usize, j: usize) -> usize {
        usize::from(self.neighbours[i].binary_search(&j).is_ok())
    }

    fn neighbours_in_block(&self, block: &BTreeSet<usize>, vertex: usize) -> Invariant {
        Invariant::Count(
            self.neighbours[vertex]
                .iter()
                .filter(|neighbour| block.contains(neighbour))
                .count(),
        )
    }

    fn initial_partition(&self) -> Partition {
        let mut cells: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
        for (bond, descriptor) in self.descriptors.iter().enumerate() {
            cells.entry(descriptor.as_str()).or_default().insert(bond);
        }
        let mut partition = Partition::from_cells(cells.into_values());
        partition.order();
        partition
    }
}

impl MoleculeRefinable for BondRefinable {
    fn from_molecule(graph: &MoleculeGraph, options: RefinableOptions) -> Self {
        Self::new(graph, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_smiles;

    #[test]
    fn test_descriptors_sort_symbols() {
        // bonds: 0 C=O, 1 C-C, 2 C-N
        let graph = parse_smiles("O=CC(N)").unwrap();
        let refinable = BondRefinable::new(&graph, RefinableOptions::default());
        assert_eq!(refinable.descriptor(0), "C2O");
        assert_eq!(refinable.descriptor(1), "C1C");
        assert_eq!(refinable.descriptor(2), "C1N");

        let no_orders = BondRefinable::new(
            &graph,
            RefinableOptions {
                ignore_bond_orders: true,
                ..Default::default()
            },
        );
        assert_eq!(no_orders.descriptor(0), "C1O");

        let no_elements = BondRefinable::new(
            &graph,
            RefinableOptions {
                ignore_elements: true,
                ..Default::default()
            },
        );
        assert_eq!(no_elements.descriptor(0), "2");
        assert_eq!(no_elements.descriptor(2), "1");
    }

    #[test]
    fn test_initial_partition_is_ordered_by_first_bond() {
        // bonds: 0 C-C, 1 C-O, 2 C-C
        let graph = parse_smiles("CCOC").unwrap();
        let refinable = BondRefinable::new(&graph, RefinableOptions::default());
        assert_eq!(refinable.descriptor(1), "C1O");
        assert_eq!(refinable.initial_partition().to_string(), "[0|1,2]");

        let graph = parse_smiles("OCC").unwrap();
        let refinable = BondRefinable::new(&graph, RefinableOptions::default());
        // "C1C" sorts before "C1O" but bond 0 is the C-O bond
        assert_eq!(refinable.initial_partition().to_string(), "[0|1]");
    }

    #[test]
    fn test_bonds_sharing_an_atom_are_connected() {
        // bonds of isobutane: all three share the central carbon
        let graph = parse_smiles("CC(C)C").unwrap();
        let refinable = BondRefinable::new(&graph, RefinableOptions::default());
        assert_eq!(refinable.vertex_count(), 3);
        assert_eq!(refinable.connectivity(0, 1), 1);
        assert_eq!(refinable.connectivity(1, 2), 1);
        assert_eq!(
            refinable.neighbours_in_block(&BTreeSet::from([1, 2]), 0),
            Invariant::Count(2)
        );

        let chain = parse_smiles("CCCC").unwrap();
        let refinable = BondRefinable::new(&chain, RefinableOptions::default());
        assert_eq!(refinable.connectivity(0, 2), 0);
        assert_eq!(refinable.connectivity(0, 1), 1);
    }
}
