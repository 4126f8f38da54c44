use tracing::{info, instrument};

use super::{DiscretePartitionRefiner, RefinerError};
use crate::{
    AtomRefinable, BondRefinable, EquitablePartitionRefiner, MoleculeGraph, MoleculeRefinable,
    Partition, PermutationGroup, RefinableOptions, SplitOrder,
};

/// Symmetry of a molecule's atoms.
pub type AtomDiscretePartitionRefiner = MoleculeDiscreteRefiner<AtomRefinable>;
/// Symmetry of a molecule's bonds.
pub type BondDiscretePartitionRefiner = MoleculeDiscreteRefiner<BondRefinable>;

/// Runs the search on a [`MoleculeGraph`] through the view `R`.
///
/// Every entry point rebuilds the view and starts a fresh search. To read both
/// the group and the orbits of one molecule, call [`MoleculeDiscreteRefiner::refine`]
/// once and then use the accessors of [`MoleculeDiscreteRefiner::refiner`].
#[derive(Debug, Clone)]
pub struct MoleculeDiscreteRefiner<R> {
    options: RefinableOptions,
    split_order: SplitOrder,
    refiner: DiscretePartitionRefiner<R>,
}

impl<R: MoleculeRefinable> Default for MoleculeDiscreteRefiner<R> {
    fn default() -> Self {
        Self::with_options(RefinableOptions::default())
    }
}

impl<R: MoleculeRefinable> MoleculeDiscreteRefiner<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RefinableOptions) -> Self {
        Self {
            options,
            split_order: SplitOrder::default(),
            refiner: DiscretePartitionRefiner::new(),
        }
    }

    pub fn with_split_order(mut self, split_order: SplitOrder) -> Self {
        self.split_order = split_order;
        self
    }

    pub fn options(&self) -> RefinableOptions {
        self.options
    }

    /// The underlying search, holding the results of the last run.
    pub fn refiner(&self) -> &DiscretePartitionRefiner<R> {
        &self.refiner
    }

    fn run(
        &mut self,
        graph: &MoleculeGraph,
        group: Option<PermutationGroup>,
        partition: Option<&Partition>,
    ) -> Result<(), RefinerError> {
        let refinable = R::from_molecule(graph, self.options);
        let initial = match partition {
            Some(partition) => partition.clone(),
            None => refinable.initial_partition(),
        };
        let group = group.unwrap_or_else(|| PermutationGroup::new(refinable.vertex_count()));
        self.refiner.setup(
            group,
            EquitablePartitionRefiner::with_split_order(refinable, self.split_order),
        )?;
        self.refiner.refine(&initial)?;

        info!(
            vertices = self.refiner.refinable()?.vertex_count(),
            order = %self.refiner.automorphism_group()?.order(),
            canonical = self.refiner.is_canonical()?,
            "search finished"
        );
        Ok(())
    }

    /// Search from the view's own initial coloring.
    #[instrument(skip_all, fields(atoms = graph.node_count(), bonds = graph.edge_count()))]
    pub fn refine(&mut self, graph: &MoleculeGraph) -> Result<(), RefinerError> {
        self.run(graph, None, None)
    }

    /// Search from `partition` instead of the view's initial coloring.
    #[instrument(skip_all, fields(atoms = graph.node_count(), partition = %partition))]
    pub fn refine_with_partition(
        &mut self,
        graph: &MoleculeGraph,
        partition: &Partition,
    ) -> Result<(), RefinerError> {
        self.run(graph, None, Some(partition))
    }

    /// True if the numbering of `graph` is already canonical.
    pub fn is_canonical(&mut self, graph: &MoleculeGraph) -> Result<bool, RefinerError> {
        self.refine(graph)?;
        self.refiner.is_canonical()
    }

    pub fn automorphism_group(
        &mut self,
        graph: &MoleculeGraph,
    ) -> Result<&PermutationGroup, RefinerError> {
        self.refine(graph)?;
        self.refiner.automorphism_group()
    }

    /// Search starting from the automorphisms already in `group`.
    pub fn automorphism_group_seeded(
        &mut self,
        graph: &MoleculeGraph,
        group: PermutationGroup,
    ) -> Result<&PermutationGroup, RefinerError> {
        self.run(graph, Some(group), None)?;
        self.refiner.automorphism_group()
    }

    pub fn automorphism_group_with_partition(
        &mut self,
        graph: &MoleculeGraph,
        partition: &Partition,
    ) -> Result<&PermutationGroup, RefinerError> {
        self.refine_with_partition(graph, partition)?;
        self.refiner.automorphism_group()
    }

    pub fn automorphism_partition(
        &mut self,
        graph: &MoleculeGraph,
    ) -> Result<Partition, RefinerError> {
        self.refine(graph)?;
        self.refiner.automorphism_partition()
    }
}
