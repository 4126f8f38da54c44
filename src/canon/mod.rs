//! Canonical labelling and automorphism search.
//!
//! The search individualizes one vertex at a time, refining to an equitable
//! partition after each step, until the partition is discrete. Every discrete
//! partition is a candidate labelling; the one with the largest half matrix is
//! kept, and candidates that tie with it yield automorphisms. Automorphisms found
//! so far prune candidate vertices that are images of ones already tried.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::{
    DisjointSetForest, EquitablePartitionRefiner, Partition, Permutation, PermutationGroup,
    Refinable,
};

mod molecule;
pub use molecule::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefinerError {
    #[error("refiner used before setup")]
    NotSetUp,
    #[error("no refinement has been run yet")]
    NotRefined,
    #[error("partition holds {found} elements but the graph has {expected} vertices")]
    PartitionSize { expected: usize, found: usize },
    #[error("partition does not hold each of the vertices 0..{expected} exactly once")]
    PartitionElements { expected: usize },
    #[error("group acts on {found} points but the graph has {expected} vertices")]
    GroupSize { expected: usize, found: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Better,
    Equal,
    Worse,
}

#[derive(Debug, Clone)]
struct Setup<R> {
    group: PermutationGroup,
    equitable: EquitablePartitionRefiner<R>,
}

/// One level of the search: a non-discrete equitable partition and the
/// candidates left in its first non-discrete cell.
#[derive(Debug)]
struct Frame {
    finer: Partition,
    cell: usize,
    /// First elements of the discrete cells before `cell`.
    prefix: Vec<usize>,
    candidates: BTreeSet<usize>,
    cursor: usize,
    tried: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct DiscretePartitionRefiner<R> {
    setup: Option<Setup<R>>,
    best: Option<Permutation>,
    first: Option<Permutation>,
}

impl<R> Default for DiscretePartitionRefiner<R> {
    fn default() -> Self {
        Self {
            setup: None,
            best: None,
            first: None,
        }
    }
}

impl<R: Refinable> DiscretePartitionRefiner<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the group to grow and the refiner to search with. Clears the
    /// results of any earlier search.
    pub fn setup(
        &mut self,
        group: PermutationGroup,
        equitable: EquitablePartitionRefiner<R>,
    ) -> Result<(), RefinerError> {
        let expected = equitable.refinable().vertex_count();
        if group.size() != expected {
            return Err(RefinerError::GroupSize {
                expected,
                found: group.size(),
            });
        }
        self.setup = Some(Setup { group, equitable });
        self.best = None;
        self.first = None;
        Ok(())
    }

    pub fn is_set_up(&self) -> bool {
        self.setup.is_some()
    }

    pub fn refinable(&self) -> Result<&R, RefinerError> {
        self.setup
            .as_ref()
            .map(|setup| setup.equitable.refinable())
            .ok_or(RefinerError::NotSetUp)
    }

    /// Search every labelling reachable from `coarser`.
    #[instrument(skip_all, fields(cells = coarser.len()))]
    pub fn refine(&mut self, coarser: &Partition) -> Result<(), RefinerError> {
        let Self { setup, best, first } = self;
        let setup = setup.as_mut().ok_or(RefinerError::NotSetUp)?;
        let expected = setup.equitable.refinable().vertex_count();
        if coarser.number_of_elements() != expected {
            return Err(RefinerError::PartitionSize {
                expected,
                found: coarser.number_of_elements(),
            });
        }
        if !coarser.covers(expected) {
            return Err(RefinerError::PartitionElements { expected });
        }
        if expected == 0 {
            *best = Some(Permutation::identity(0));
            *first = Some(Permutation::identity(0));
            return Ok(());
        }

        let mut stack = Vec::new();
        stack.extend(setup.visit(coarser, best, first));
        while let Some(frame) = stack.last_mut() {
            if let Some(vertex) = frame.tried.take() {
                setup.prune(frame, vertex);
            }
            let Some(&vertex) = frame.candidates.range(frame.cursor..).next() else {
                stack.pop();
                continue;
            };
            frame.cursor = vertex + 1;
            frame.tried = Some(vertex);
            trace!(cell = frame.cell, vertex, "individualizing");
            let next = frame.finer.split_before(frame.cell, vertex);
            stack.extend(setup.visit(&next, best, first));
        }
        Ok(())
    }

    /// The best labelling found. `best[i]` is the vertex placed at position `i`.
    pub fn best(&self) -> Result<&Permutation, RefinerError> {
        self.best.as_ref().ok_or(RefinerError::NotRefined)
    }

    /// The first discrete labelling the search reached.
    pub fn first(&self) -> Result<&Permutation, RefinerError> {
        self.first.as_ref().ok_or(RefinerError::NotRefined)
    }

    pub fn first_is_identity(&self) -> Result<bool, RefinerError> {
        self.first().map(Permutation::is_identity)
    }

    /// True if the input numbering is already the canonical one.
    pub fn is_canonical(&self) -> Result<bool, RefinerError> {
        self.best().map(Permutation::is_identity)
    }

    pub fn automorphism_group(&self) -> Result<&PermutationGroup, RefinerError> {
        self.best()?;
        self.setup
            .as_ref()
            .map(|setup| &setup.group)
            .ok_or(RefinerError::NotSetUp)
    }

    /// The orbits of the automorphism group, ordered by their smallest vertex.
    pub fn automorphism_partition(&self) -> Result<Partition, RefinerError> {
        let group = self.automorphism_group()?;
        let mut forest = DisjointSetForest::new(group.size());
        for generator in group.generators() {
            for x in 0..generator.len() {
                forest.make_union(x, generator.get(x));
            }
        }
        let mut partition = Partition::from_cells(forest.sets());
        partition.order();
        Ok(partition)
    }

    /// The upper triangle of the connectivity matrix with rows and columns in
    /// the order of `permutation`, one digit per pair.
    pub fn half_matrix_string(&self, permutation: &Permutation) -> Result<String, RefinerError> {
        let refinable = self.refinable()?;
        let mut out = String::with_capacity(permutation.len() * permutation.len() / 2);
        for i in 0..permutation.len() {
            for j in i + 1..permutation.len() {
                out.push_str(
                    &refinable
                        .connectivity(permutation.get(i), permutation.get(j))
                        .to_string(),
                );
            }
        }
        Ok(out)
    }

    pub fn first_half_matrix_string(&self) -> Result<String, RefinerError> {
        self.half_matrix_string(self.first()?)
    }

    pub fn best_half_matrix_string(&self) -> Result<String, RefinerError> {
        self.half_matrix_string(self.best()?)
    }
}

impl<R: Refinable> Setup<R> {
    /// Refine `coarser`, record a discrete result, and return the frame to
    /// search below it when it is not discrete.
    fn visit(
        &mut self,
        coarser: &Partition,
        best: &mut Option<Permutation>,
        first: &mut Option<Permutation>,
    ) -> Option<Frame> {
        let finer = self.equitable.refine(coarser);
        let vertex_count = self.equitable.refinable().vertex_count();
        let cell = finer.first_non_discrete_cell().unwrap_or(vertex_count);
        let prefix = finer.set_as_permutation(cell);
        let comparison = match best.as_ref() {
            Some(best) => self.compare(best, &prefix),
            None => Comparison::Better,
        };

        if finer.is_discrete() {
            match best.as_ref() {
                None => {
                    let labelling = finer.to_permutation();
                    debug!(labelling = %labelling, "first labelling");
                    *first = Some(labelling.clone());
                    *best = Some(labelling);
                }
                Some(current) => match comparison {
                    Comparison::Better => {
                        debug!(labelling = %prefix, "better labelling");
                        *best = Some(Permutation::from(prefix.values().to_vec()));
                    }
                    Comparison::Equal => {
                        let automorphism = prefix.multiply(&current.invert());
                        debug!(automorphism = %automorphism.to_cycle_string(), "automorphism");
                        self.group.enter(&automorphism);
                    }
                    Comparison::Worse => {}
                },
            }
            return None;
        }

        if comparison == Comparison::Worse {
            return None;
        }
        Some(Frame {
            candidates: finer.copy_block(cell),
            finer,
            cell,
            prefix: prefix.values().to_vec(),
            cursor: 0,
            tried: None,
        })
    }

    /// Compare the rows of `best` and `candidate` pair by pair over the
    /// length of `candidate`.
    fn compare(&self, best: &Permutation, candidate: &Permutation) -> Comparison {
        let refinable = self.equitable.refinable();
        for i in 0..candidate.len() {
            for j in i + 1..candidate.len() {
                let x = refinable.connectivity(best.get(i), best.get(j));
                let y = refinable.connectivity(candidate.get(i), candidate.get(j));
                if x > y {
                    return Comparison::Worse;
                }
                if x < y {
                    return Comparison::Better;
                }
            }
        }
        Comparison::Equal
    }

    /// After trying `vertex`, move the group onto a base that starts with the
    /// fixed prefix and `vertex`, then drop every candidate an automorphism
    /// fixing the prefix sends `vertex` to.
    fn prune(&mut self, frame: &mut Frame, vertex: usize) {
        let size = self.group.size();
        let mut base: Vec<usize> = (0..size).collect();
        let mut position: Vec<usize> = (0..size).collect();
        for (j, &x) in frame.prefix.iter().chain(std::iter::once(&vertex)).enumerate() {
            let i = position[x];
            let displaced = base[j];
            base[j] = x;
            base[i] = displaced;
            position[displaced] = i;
            position[x] = j;
        }
        self.group.change_base(&Permutation::from(base));

        let before = frame.candidates.len();
        let group = &self.group;
        let cell = frame.cell;
        frame
            .candidates
            .retain(|&image| group.get(cell, image).is_none());
        trace!(cell, vertex, pruned = before - frame.candidates.len(), "pruned candidates");
    }
}
