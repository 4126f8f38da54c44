use std::cmp::Ordering;

/// How a vertex relates to a target cell, as computed by a [`crate::Refinable`].
///
/// Vertices of one cell that get different invariants against some target cell
/// end up in different cells once the partition is refined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Invariant {
    /// Number of neighbours inside the target cell.
    Count(usize),
    /// Number of neighbours inside the target cell, one entry per bond order.
    Counts(Vec<usize>),
}

impl Ord for Invariant {
    /// `Count`s compare as plain integers. `Counts` compare lexicographically with
    /// the sign flipped: at the first differing entry, the larger count sorts first.
    /// Canonical orderings depend on this exact convention, so it must not change.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Invariant::Count(a), Invariant::Count(b)) => a.cmp(b),
            (Invariant::Counts(a), Invariant::Counts(b)) => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| y.cmp(x))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Invariant::Count(_), Invariant::Counts(_)) => Ordering::Less,
            (Invariant::Counts(_), Invariant::Count(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Invariant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
