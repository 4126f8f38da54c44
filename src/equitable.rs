use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::trace;

use crate::{Invariant, Partition, Refinable};

/// The order in which the pieces of a split cell are inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SplitOrder {
    /// Largest invariant first.
    #[default]
    Forward,
    /// Smallest invariant first.
    Reverse,
}

/// Refines a partition until every vertex of a cell has the same invariant
/// with respect to every cell.
#[derive(Debug, Clone)]
pub struct EquitablePartitionRefiner<R> {
    refinable: R,
    split_order: SplitOrder,
}

impl<R: Refinable> EquitablePartitionRefiner<R> {
    pub fn new(refinable: R) -> Self {
        Self::with_split_order(refinable, SplitOrder::default())
    }

    pub fn with_split_order(refinable: R, split_order: SplitOrder) -> Self {
        Self {
            refinable,
            split_order,
        }
    }

    pub fn refinable(&self) -> &R {
        &self.refinable
    }

    pub fn split_order(&self) -> SplitOrder {
        self.split_order
    }

    pub fn set_split_order(&mut self, split_order: SplitOrder) {
        self.split_order = split_order;
    }

    /// The equitable refinement of `coarser`. Stops early once it is discrete.
    pub fn refine(&self, coarser: &Partition) -> Partition {
        let mut finer = coarser.clone();
        let vertex_count = self.refinable.vertex_count();
        let mut targets: VecDeque<BTreeSet<usize>> = finer.cells().cloned().collect();

        while let Some(target) = targets.pop_front() {
            let mut index = 0;
            while index < finer.len() && finer.len() < vertex_count {
                if !finer.is_discrete_cell(index) {
                    index += self.split(&mut finer, index, &target, &mut targets);
                }
                index += 1;
            }
            if finer.len() == vertex_count {
                break;
            }
        }
        finer
    }

    /// Split the cell at `index` by invariant against `target`, queueing every
    /// new cell. Returns how many cells were added.
    fn split(
        &self,
        partition: &mut Partition,
        index: usize,
        target: &BTreeSet<usize>,
        targets: &mut VecDeque<BTreeSet<usize>>,
    ) -> usize {
        let mut groups: BTreeMap<Invariant, BTreeSet<usize>> = BTreeMap::new();
        for &vertex in partition.cell(index) {
            groups
                .entry(self.refinable.neighbours_in_block(target, vertex))
                .or_default()
                .insert(vertex);
        }
        if groups.len() < 2 {
            return 0;
        }

        trace!(cell = %index, pieces = groups.len(), "splitting cell");
        let added = groups.len() - 1;
        partition.remove_cell(index);
        let pieces: Vec<BTreeSet<usize>> = match self.split_order {
            SplitOrder::Forward => groups.into_values().rev().collect(),
            SplitOrder::Reverse => groups.into_values().collect(),
        };
        for (offset, piece) in pieces.into_iter().enumerate() {
            targets.push_back(piece.clone());
            partition.insert_cell(index + offset, piece);
        }
        added
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A graph given by its connectivity matrix, with a single initial color.
    pub(crate) struct MatrixRefinable {
        matrix: Vec<Vec<usize>>,
    }

    impl MatrixRefinable {
        pub(crate) fn new(matrix: Vec<Vec<usize>>) -> Self {
            Self { matrix }
        }

        /// An unweighted graph on `size` vertices.
        pub(crate) fn from_edges(size: usize, edges: &[(usize, usize)]) -> Self {
            let mut matrix = vec![vec![0; size]; size];
            for &(a, b) in edges {
                matrix[a][b] = 1;
                matrix[b][a] = 1;
            }
            Self::new(matrix)
        }
    }

    impl Refinable for MatrixRefinable {
        fn vertex_count(&self) -> usize {
            self.matrix.len()
        }

        fn connectivity(&self, i: usize, j: usize) -> usize {
            self.matrix[i][j]
        }

        fn neighbours_in_block(&self, block: &BTreeSet<usize>, vertex: usize) -> Invariant {
            Invariant::Count(block.iter().map(|&other| self.matrix[vertex][other].min(1)).sum())
        }

        fn initial_partition(&self) -> Partition {
            Partition::unit(self.vertex_count())
        }
    }

    #[test]
    fn test_path_splits_middle_from_ends() {
        let path = MatrixRefinable::from_edges(3, &[(0, 1), (1, 2)]);
        let refiner = EquitablePartitionRefiner::new(&path);
        // the middle vertex has two neighbours and sorts first
        assert_eq!(refiner.refine(&Partition::unit(3)).to_string(), "[1|0,2]");

        let reverse = EquitablePartitionRefiner::with_split_order(&path, SplitOrder::Reverse);
        assert_eq!(reverse.refine(&Partition::unit(3)).to_string(), "[0,2|1]");
    }

    #[test]
    fn test_regular_graph_is_already_equitable() {
        let cycle = MatrixRefinable::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let refiner = EquitablePartitionRefiner::new(cycle);
        let unit = Partition::unit(4);
        assert_eq!(refiner.refine(&unit), unit);
    }

    #[test]
    fn test_individualized_vertex_propagates() {
        let cycle = MatrixRefinable::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let refiner = EquitablePartitionRefiner::new(cycle);
        let start = Partition::unit(4).split_before(0, 0);
        // 1 and 3 see vertex 0, 2 does not
        assert_eq!(refiner.refine(&start).to_string(), "[0|1,3|2]");
    }

    #[test]
    fn test_stops_when_discrete() {
        let path = MatrixRefinable::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        let refiner = EquitablePartitionRefiner::new(path);
        let refined = refiner.refine(&Partition::unit(4).split_before(0, 0));
        assert!(refined.is_discrete());
        assert_eq!(refined.to_string(), "[0|1|2|3]");
    }

    #[test]
    fn test_refined_partition_is_equitable() {
        // a triangle with a pendant vertex on 0 and a tail on 3
        let graph =
            MatrixRefinable::from_edges(6, &[(0, 1), (1, 2), (2, 0), (0, 3), (3, 4), (4, 5)]);
        let refiner = EquitablePartitionRefiner::new(&graph);
        let refined = refiner.refine(&Partition::unit(6));
        for cell in refined.cells() {
            for target in refined.cells() {
                let invariants: BTreeSet<Invariant> = cell
                    .iter()
                    .map(|&v| graph.neighbours_in_block(target, v))
                    .collect();
                assert_eq!(invariants.len(), 1);
            }
        }
        assert_eq!(refined.number_of_elements(), 6);
    }
}
