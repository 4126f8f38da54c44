use std::fmt::{Display, Formatter, Result as FmtResult};

/// Union-find over `0..n`. A root holds `-(size of its set)`, every other
/// element holds the index of its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisjointSetForest {
    forest: Vec<isize>,
}

impl DisjointSetForest {
    pub fn new(size: usize) -> Self {
        Self { forest: vec![-1; size] }
    }

    pub fn len(&self) -> usize {
        self.forest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forest.is_empty()
    }

    /// The raw slot for `index`: a parent index, or a negative set size at a root.
    pub fn get(&self, index: usize) -> isize {
        self.forest[index]
    }

    pub fn root(&self, element: usize) -> usize {
        let mut current = element;
        while self.forest[current] >= 0 {
            current = self.forest[current] as usize;
        }
        current
    }

    /// Merge the sets of `x` and `y`, hanging the smaller tree under the larger.
    pub fn make_union(&mut self, x: usize, y: usize) {
        let x_root = self.root(x);
        let y_root = self.root(y);
        if x_root == y_root {
            return;
        }
        if self.forest[x_root] < self.forest[y_root] {
            self.forest[x_root] += self.forest[y_root];
            self.forest[y_root] = x_root as isize;
        } else {
            self.forest[y_root] += self.forest[x_root];
            self.forest[x_root] = y_root as isize;
        }
    }

    pub fn same_set(&self, x: usize, y: usize) -> bool {
        self.root(x) == self.root(y)
    }

    /// Every set, in order of its root, each listed in ascending order.
    pub fn sets(&self) -> Vec<Vec<usize>> {
        let roots: Vec<usize> = (0..self.len()).filter(|&i| self.forest[i] < 0).collect();
        let mut sets: Vec<Vec<usize>> = roots
            .iter()
            .map(|&root| Vec::with_capacity((-self.forest[root]) as usize))
            .collect();
        for element in 0..self.len() {
            let root = self.root(element);
            if let Ok(slot) = roots.binary_search(&root) {
                sets[slot].push(element);
            }
        }
        sets
    }
}

impl Display for DisjointSetForest {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let slots: Vec<String> = self.forest.iter().map(|x| x.to_string()).collect();
        write!(f, "[{}]", slots.join(", "))
    }
}
