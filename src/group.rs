//! Permutation groups in base-and-transversal (Schreier-Sims) form.

use num_bigint::BigUint;
use tracing::trace;

use crate::Permutation;

/// Visitor for [`PermutationGroup::apply`]. Enumeration stops as soon as
/// `is_finished` returns true.
pub trait Backtracker {
    fn apply_to(&mut self, p: &Permutation);

    fn is_finished(&self) -> bool {
        false
    }
}

/// A group of permutations of `0..size`.
///
/// Level `i` holds a left transversal of the stabilizer of `base[0..i]` in the
/// stabilizer of `base[0..i-1]`: slot `[i][x]` is a group element fixing the
/// earlier base points and sending `base[i]` to `x`, if one exists. Slot
/// `[i][base[i]]` is always the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationGroup {
    size: usize,
    base: Permutation,
    permutations: Vec<Vec<Option<Permutation>>>,
}

impl PermutationGroup {
    /// The trivial group on `size` points, with the identity as base.
    pub fn new(size: usize) -> Self {
        Self::with_base(Permutation::identity(size))
    }

    /// The trivial group, using `base` as the order in which points are stabilized.
    pub fn with_base(base: Permutation) -> Self {
        let size = base.len();
        let mut permutations = vec![vec![None; size]; size];
        for (level, point) in base.iter().enumerate() {
            permutations[level][point] = Some(Permutation::identity(size));
        }
        Self {
            size,
            base,
            permutations,
        }
    }

    /// The group generated by `generators`.
    pub fn from_generators<'a, I>(size: usize, generators: I) -> Self
    where
        I: IntoIterator<Item = &'a Permutation>,
    {
        let mut group = Self::new(size);
        for generator in generators {
            group.enter(generator);
        }
        group
    }

    /// The full symmetric group on `size` points, generated by `(0 1)` and
    /// the cycle `(0 1 ... size-1)`.
    pub fn sym_n(size: usize) -> Self {
        if size < 2 {
            return Self::new(size);
        }
        let mut transposition = Permutation::identity(size);
        transposition.set(0, 1);
        transposition.set(1, 0);
        let cycle = Permutation::from((1..size).chain(std::iter::once(0)).collect::<Vec<_>>());
        Self::from_generators(size, [&transposition, &cycle])
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn base(&self) -> &Permutation {
        &self.base
    }

    /// The transversal element at `level` that sends `base[level]` to `image`.
    pub fn get(&self, level: usize, image: usize) -> Option<&Permutation> {
        self.permutations[level][image].as_ref()
    }

    /// Every transversal element stored at `level`, the identity included.
    pub fn left_transversal(&self, level: usize) -> Vec<Permutation> {
        self.permutations[level].iter().flatten().cloned().collect()
    }

    /// The non-identity transversal elements. They generate the whole group.
    pub fn generators(&self) -> Vec<Permutation> {
        self.permutations
            .iter()
            .flatten()
            .flatten()
            .filter(|p| !p.is_identity())
            .cloned()
            .collect()
    }

    /// The number of elements, the product of the transversal sizes.
    pub fn order(&self) -> BigUint {
        self.permutations
            .iter()
            .map(|level| level.iter().filter(|p| p.is_some()).count())
            .fold(BigUint::from(1u32), |order, count| order * count)
    }

    /// Sift `permutation` down the stabilizer chain, reducing it in place.
    /// Returns the level at which no transversal element matches, or `size`
    /// when `permutation` was reduced to the identity and so is a member.
    pub fn test(&self, permutation: &mut Permutation) -> usize {
        for level in 0..self.size {
            let image = permutation.get(self.base.get(level));
            match &self.permutations[level][image] {
                Some(h) => *permutation = h.invert().multiply(permutation),
                None => return level,
            }
        }
        self.size
    }

    pub fn is_member(&self, permutation: &Permutation) -> bool {
        let mut sifted = permutation.clone();
        self.test(&mut sifted) == self.size
    }

    /// Extend the group by `permutation`, closing it under multiplication.
    pub fn enter(&mut self, permutation: &Permutation) {
        debug_assert_eq!(permutation.len(), self.size);
        let mut pending = vec![permutation.clone()];
        while let Some(mut g) = pending.pop() {
            let level = self.test(&mut g);
            if level == self.size {
                continue;
            }
            let image = g.get(self.base.get(level));
            trace!(level, image, "new transversal element");

            for h in self.permutations.iter().flatten().flatten() {
                if h.is_identity() {
                    continue;
                }
                pending.push(g.multiply(h));
                pending.push(h.multiply(&g));
            }
            pending.push(g.multiply(&g));
            self.permutations[level][image] = Some(g);
        }
    }

    /// Rebuild the transversals for `new_base`. Levels before the first point
    /// where the bases differ stabilize the same points and are kept as they are.
    pub fn change_base(&mut self, new_base: &Permutation) {
        debug_assert_eq!(new_base.len(), self.size);
        let unchanged = self.base.first_index_of_difference(new_base);
        if unchanged == self.size {
            return;
        }

        let mut rebuilt = Self::with_base(new_base.clone());
        for level in &self.permutations[unchanged..] {
            for g in level.iter().flatten() {
                rebuilt.enter(g);
            }
        }
        for (level, slots) in self.permutations[..unchanged].iter().enumerate() {
            let point = new_base.get(level);
            for g in slots.iter().flatten() {
                rebuilt.permutations[level][g.get(point)] = Some(g.clone());
            }
        }

        self.base = rebuilt.base;
        self.permutations = rebuilt.permutations;
    }

    /// Enumerate every element of the group into `backtracker`, depth first,
    /// picking one transversal element per level.
    pub fn apply<B: Backtracker>(&self, backtracker: &mut B) {
        // levels holding only the identity do not branch
        let levels: Vec<usize> = (0..self.size)
            .filter(|&level| self.permutations[level].iter().flatten().count() > 1)
            .collect();
        self.backtrack(&levels, Permutation::identity(self.size), backtracker);
    }

    fn backtrack<B: Backtracker>(&self, levels: &[usize], g: Permutation, backtracker: &mut B) {
        if backtracker.is_finished() {
            return;
        }
        match levels.split_first() {
            None => backtracker.apply_to(&g),
            Some((&level, rest)) => {
                for h in self.permutations[level].iter().flatten() {
                    self.backtrack(rest, g.multiply(h), backtracker);
                    if backtracker.is_finished() {
                        return;
                    }
                }
            }
        }
    }

    /// Every element of the group.
    pub fn all(&self) -> Vec<Permutation> {
        struct Collect(Vec<Permutation>);
        impl Backtracker for Collect {
            fn apply_to(&mut self, p: &Permutation) {
                self.0.push(p.clone());
            }
        }

        let mut collect = Collect(Vec::new());
        self.apply(&mut collect);
        collect.0
    }

    /// One representative of every right coset of `subgroup` in this group.
    pub fn transversal(&self, subgroup: &PermutationGroup) -> Vec<Permutation> {
        struct Cosets<'a> {
            subgroup: &'a PermutationGroup,
            index: BigUint,
            found: Vec<Permutation>,
        }
        impl Backtracker for Cosets<'_> {
            fn apply_to(&mut self, p: &Permutation) {
                let known = self
                    .found
                    .iter()
                    .any(|f| self.subgroup.is_member(&p.multiply(&f.invert())));
                if !known {
                    self.found.push(p.clone());
                }
            }

            fn is_finished(&self) -> bool {
                BigUint::from(self.found.len()) >= self.index
            }
        }

        let mut cosets = Cosets {
            subgroup,
            index: self.order() / subgroup.order(),
            found: Vec::new(),
        };
        self.apply(&mut cosets);
        cosets.found
    }
}
