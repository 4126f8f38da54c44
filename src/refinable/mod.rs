//! Graph views the partition refiners work on.
//!
//! A [`Refinable`] exposes a graph as vertices `0..n`, a symmetric edge
//! multiplicity between any two of them, and an initial coloring.

use std::collections::BTreeSet;

use crate::{Invariant, MoleculeGraph, Partition};

mod atom;
pub use atom::*;

mod bond;
pub use bond::*;

pub trait Refinable {
    fn vertex_count(&self) -> usize;

    /// Edge multiplicity between `i` and `j`, 0 when they are not adjacent.
    /// Only called with `i != j`.
    fn connectivity(&self, i: usize, j: usize) -> usize;

    /// How `vertex` is connected into `block`.
    fn neighbours_in_block(&self, block: &BTreeSet<usize>, vertex: usize) -> Invariant;

    fn initial_partition(&self) -> Partition;
}

/// Which molecular features the views take into account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefinableOptions {
    /// Treat every atom as the same element.
    pub ignore_elements: bool,
    /// Treat every bond as a single bond.
    pub ignore_bond_orders: bool,
}

/// A [`Refinable`] built from a molecule.
pub trait MoleculeRefinable: Refinable + Sized {
    fn from_molecule(graph: &MoleculeGraph, options: RefinableOptions) -> Self;
}

impl<R: Refinable + ?Sized> Refinable for &R {
    fn vertex_count(&self) -> usize {
        (**self).vertex_count()
    }

    fn connectivity(&self, i: usize, j: usize) -> usize {
        (**self).connectivity(i, j)
    }

    fn neighbours_in_block(&self, block: &BTreeSet<usize>, vertex: usize) -> Invariant {
        (**self).neighbours_in_block(block, vertex)
    }

    fn initial_partition(&self) -> Partition {
        (**self).initial_partition()
    }
}
