use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::Mul;

/// A permutation of `0..n`, stored densely as the image of every point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// The identity permutation on `size` points.
    pub fn identity(size: usize) -> Self {
        Self((0..size).collect())
    }

    /// The images of the first few positions of some longer permutation. The
    /// values are vertex indices and need not lie below `values.len()`.
    pub(crate) fn from_prefix(values: Vec<usize>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The image of `index`.
    pub fn get(&self, index: usize) -> usize {
        self.0[index]
    }

    pub fn set(&mut self, index: usize, value: usize) {
        self.0[index] = value;
    }

    pub fn values(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn is_identity(&self) -> bool {
        self.iter().enumerate().all(|(i, x)| i == x)
    }

    /// Composition `self · other`, mapping `i` to `self[other[i]]`.
    pub fn multiply(&self, other: &Permutation) -> Permutation {
        debug_assert_eq!(self.len(), other.len());
        Permutation(other.iter().map(|x| self.0[x]).collect())
    }

    pub fn invert(&self) -> Permutation {
        let mut inverse = vec![0; self.len()];
        for (i, x) in self.iter().enumerate() {
            inverse[x] = i;
        }
        Permutation(inverse)
    }

    /// The first position at which the two permutations differ, or the length
    /// of the shorter one if they agree on a common prefix.
    pub fn first_index_of_difference(&self, other: &Permutation) -> usize {
        self.iter()
            .zip(other.iter())
            .position(|(a, b)| a != b)
            .unwrap_or(self.len().min(other.len()))
    }

    /// The cycle containing `element`, starting with `element` itself.
    pub fn orbit(&self, element: usize) -> Vec<usize> {
        let mut orbit = vec![element];
        let mut next = self.0[element];
        while next != element && orbit.len() < self.len() {
            orbit.push(next);
            next = self.0[next];
        }
        orbit
    }

    /// Cycle notation with fixed points left out, e.g. `(0,1)(2,3)`.
    pub fn to_cycle_string(&self) -> String {
        let mut seen = vec![false; self.len()];
        let mut out = String::new();
        for start in 0..self.len() {
            if seen[start] || self.0[start] == start {
                continue;
            }
            let cycle = self.orbit(start);
            for &x in &cycle {
                seen[x] = true;
            }
            let body: Vec<String> = cycle.iter().map(|x| x.to_string()).collect();
            out.push('(');
            out.push_str(&body.join(","));
            out.push(')');
        }
        if out.is_empty() {
            out.push_str("()");
        }
        out
    }
}

impl From<Vec<usize>> for Permutation {
    fn from(values: Vec<usize>) -> Self {
        debug_assert!(values.iter().all(|&x| x < values.len()));
        Self(values)
    }
}

impl Mul for &Permutation {
    type Output = Permutation;

    fn mul(self, rhs: &Permutation) -> Permutation {
        self.multiply(rhs)
    }
}

impl Display for Permutation {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let values: Vec<String> = self.iter().map(|x| x.to_string()).collect();
        write!(f, "[{}]", values.join(", "))
    }
}
