//! Ordered partitions of the vertex set `0..n`.
//!
//! A partition is a sequence of disjoint, non-empty cells. The order of the cells
//! is part of its identity: a discrete partition *is* a vertex ordering.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{all_consuming, map, map_res, opt},
    multi::separated_list1,
    sequence::tuple,
    IResult,
};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use thiserror::Error;

use crate::Permutation;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartitionError {
    #[error("cannot read a partition from an empty string")]
    Empty,
    #[error("malformed partition string '{0}'")]
    Malformed(String),
    #[error("element {0} occurs in more than one cell")]
    Duplicate(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Partition {
    cells: Vec<BTreeSet<usize>>,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    /// The partition with a single cell holding `0..size`.
    pub fn unit(size: usize) -> Self {
        let mut partition = Self::new();
        if size > 0 {
            partition.add_cell((0..size).collect());
        }
        partition
    }

    pub fn from_cells<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = usize>,
    {
        Self {
            cells: cells.into_iter().map(|c| c.into_iter().collect()).collect(),
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total number of vertices over all cells.
    pub fn number_of_elements(&self) -> usize {
        self.cells.iter().map(BTreeSet::len).sum()
    }

    pub fn cells(&self) -> impl Iterator<Item = &BTreeSet<usize>> + '_ {
        self.cells.iter()
    }

    pub fn cell(&self, index: usize) -> &BTreeSet<usize> {
        &self.cells[index]
    }

    pub fn copy_block(&self, index: usize) -> BTreeSet<usize> {
        self.cells[index].clone()
    }

    /// The smallest element of the cell at `index`.
    pub fn first_in_cell(&self, index: usize) -> usize {
        *self.cells[index]
            .first()
            .expect("partition cells are never empty")
    }

    pub fn is_discrete(&self) -> bool {
        self.cells.iter().all(|c| c.len() == 1)
    }

    pub fn is_discrete_cell(&self, index: usize) -> bool {
        self.cells[index].len() == 1
    }

    pub fn first_non_discrete_cell(&self) -> Option<usize> {
        self.cells.iter().position(|c| c.len() > 1)
    }

    pub fn add_cell(&mut self, cell: BTreeSet<usize>) {
        debug_assert!(!cell.is_empty());
        self.cells.push(cell);
    }

    pub fn add_singleton_cell(&mut self, element: usize) {
        self.cells.push(BTreeSet::from([element]));
    }

    pub fn add_to_cell(&mut self, index: usize, element: usize) {
        self.cells[index].insert(element);
    }

    pub fn insert_cell(&mut self, index: usize, cell: BTreeSet<usize>) {
        debug_assert!(!cell.is_empty());
        self.cells.insert(index, cell);
    }

    pub fn remove_cell(&mut self, index: usize) -> BTreeSet<usize> {
        self.cells.remove(index)
    }

    /// Sort the cells by their first element.
    pub fn order(&mut self) {
        self.cells.sort_by_key(|c| c.first().copied());
    }

    /// Copy of this partition with `element` taken out of the cell at `index`
    /// and placed as a singleton directly before the rest of that cell.
    pub fn split_before(&self, index: usize, element: usize) -> Partition {
        self.split(index, element, true)
    }

    /// Like [`Partition::split_before`], but the singleton goes after the remainder.
    pub fn split_after(&self, index: usize, element: usize) -> Partition {
        self.split(index, element, false)
    }

    fn split(&self, index: usize, element: usize, before: bool) -> Partition {
        debug_assert!(self.cells[index].contains(&element));
        let mut cells = Vec::with_capacity(self.cells.len() + 1);
        cells.extend(self.cells[..index].iter().cloned());

        let mut remainder = self.cells[index].clone();
        remainder.remove(&element);
        let singleton = BTreeSet::from([element]);
        if before {
            cells.push(singleton);
            if !remainder.is_empty() {
                cells.push(remainder);
            }
        } else {
            if !remainder.is_empty() {
                cells.push(remainder);
            }
            cells.push(singleton);
        }

        cells.extend(self.cells[index + 1..].iter().cloned());
        Partition { cells }
    }

    /// The permutation sending position `i` to the element of cell `i`.
    /// Only meaningful for a discrete partition.
    pub fn to_permutation(&self) -> Permutation {
        debug_assert!(self.is_discrete());
        Permutation::from((0..self.len()).map(|i| self.first_in_cell(i)).collect::<Vec<_>>())
    }

    /// The first elements of the first `up_to` cells, as a permutation prefix.
    pub fn set_as_permutation(&self, up_to: usize) -> Permutation {
        let values: Vec<usize> = (0..up_to).map(|i| self.first_in_cell(i)).collect();
        Permutation::from_prefix(values)
    }

    /// True if the cells are disjoint and together hold exactly `0..size`.
    pub fn covers(&self, size: usize) -> bool {
        if self.number_of_elements() != size {
            return false;
        }
        let mut seen = vec![false; size];
        self.cells
            .iter()
            .flatten()
            .all(|&x| x < size && !std::mem::replace(&mut seen[x], true))
    }

    /// True if both the first and last elements strictly increase from cell to cell.
    pub fn in_order(&self) -> bool {
        self.cells.windows(2).all(|pair| {
            let (prev, next) = (&pair[0], &pair[1]);
            next.first() > prev.first() && next.last() > prev.last()
        })
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let cells: Vec<String> = self
            .cells
            .iter()
            .map(|cell| {
                cell.iter()
                    .map(|x| x.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect();
        write!(f, "[{}]", cells.join("|"))
    }
}

fn element(input: &str) -> IResult<&str, usize> {
    map_res(digit1, usize::from_str)(input)
}

fn cell(input: &str) -> IResult<&str, Vec<usize>> {
    separated_list1(char(','), element)(input)
}

fn cells(input: &str) -> IResult<&str, Vec<Vec<usize>>> {
    separated_list1(char('|'), cell)(input)
}

fn partition(input: &str) -> IResult<&str, Vec<Vec<usize>>> {
    alt((
        map(tag("[]"), |_| Vec::new()),
        map(tuple((opt(char('[')), cells, opt(char(']')))), |(_, cells, _)| cells),
    ))(input)
}

impl FromStr for Partition {
    type Err = PartitionError;

    /// Reads the `[0,2|1,3]` form written by `Display`. The brackets are optional;
    /// `[]` is the empty partition.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PartitionError::Empty);
        }
        let (_, raw) = all_consuming(partition)(s)
            .map_err(|_| PartitionError::Malformed(s.to_string()))?;

        let mut seen = BTreeSet::new();
        let mut result = Partition::new();
        for raw_cell in raw {
            let mut cell = BTreeSet::new();
            for x in raw_cell {
                if !seen.insert(x) {
                    return Err(PartitionError::Duplicate(x));
                }
                cell.insert(x);
            }
            result.add_cell(cell);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string_keeps_cell_order() {
        let p: Partition = "[0,2|1,3]".parse().unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.cell(0), &BTreeSet::from([0, 2]));
        assert_eq!(p.cell(1), &BTreeSet::from([1, 3]));
        assert_eq!(p.to_string(), "[0,2|1,3]");
    }

    #[test]
    fn test_round_trip() {
        for s in ["[]", "[0]", "[3|1,2|0]", "[0,1,2,3,4,5,6,7,8,9,10,11]", "[10|2|5,7|0,1,3]"] {
            let p: Partition = s.parse().unwrap();
            assert_eq!(p.to_string(), s);
            assert_eq!(p.to_string().parse::<Partition>().unwrap(), p);
        }
    }

    #[test]
    fn test_elements_printed_ascending() {
        let p: Partition = "[2,0|1]".parse().unwrap();
        assert_eq!(p.to_string(), "[0,2|1]");
    }

    #[test]
    fn test_brackets_optional() {
        let a: Partition = "0,1|2".parse().unwrap();
        let b: Partition = "[0,1|2]".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Partition>(), Err(PartitionError::Empty));
        assert!(matches!("[|]".parse::<Partition>(), Err(PartitionError::Malformed(_))));
        assert!(matches!("[0,|1]".parse::<Partition>(), Err(PartitionError::Malformed(_))));
        assert!(matches!("[0|1]x".parse::<Partition>(), Err(PartitionError::Malformed(_))));
        assert_eq!("[0,1|1]".parse::<Partition>(), Err(PartitionError::Duplicate(1)));
    }

    #[test]
    fn test_split_before_and_after() {
        let p: Partition = "[0|1,2,3|4]".parse().unwrap();
        assert_eq!(p.split_before(1, 2).to_string(), "[0|2|1,3|4]");
        assert_eq!(p.split_after(1, 2).to_string(), "[0|1,3|2|4]");
        // the source is untouched
        assert_eq!(p.to_string(), "[0|1,2,3|4]");
    }

    #[test]
    fn test_discreteness() {
        let unit = Partition::unit(3);
        assert!(!unit.is_discrete());
        assert_eq!(unit.first_non_discrete_cell(), Some(0));
        assert_eq!(unit.number_of_elements(), 3);

        let discrete: Partition = "[2|0|1]".parse().unwrap();
        assert!(discrete.is_discrete());
        assert!(discrete.is_discrete_cell(1));
        assert_eq!(discrete.first_non_discrete_cell(), None);
        assert_eq!(discrete.to_permutation(), Permutation::from(vec![2, 0, 1]));
    }

    #[test]
    fn test_set_as_permutation_prefix() {
        let p: Partition = "[3|1|0,2]".parse().unwrap();
        assert_eq!(p.set_as_permutation(2).values(), &[3, 1]);
    }

    #[test]
    fn test_empty_partition_round_trip() {
        let empty = Partition::new();
        assert_eq!(empty.to_string(), "[]");
        assert_eq!("[]".parse::<Partition>(), Ok(empty));
    }

    #[test]
    fn test_covers() {
        assert!("[0,2|1]".parse::<Partition>().unwrap().covers(3));
        assert!(Partition::new().covers(0));
        // right number of elements, but 7 is out of range and 2 is missing
        assert!(!"[0,7|1]".parse::<Partition>().unwrap().covers(3));
        assert!(!Partition::from_cells([vec![0, 1], vec![1]]).covers(3));
        assert!(!Partition::unit(2).covers(3));
    }

    #[test]
    fn test_in_order() {
        assert!("[0,1|2,4|3,5]".parse::<Partition>().unwrap().in_order());
        assert!(!"[0,4|1,2]".parse::<Partition>().unwrap().in_order());
        assert!(!"[1|0]".parse::<Partition>().unwrap().in_order());
    }

    #[test]
    fn test_order_sorts_by_first_element() {
        let mut p: Partition = "[3,4|0,5|1,2]".parse().unwrap();
        p.order();
        assert_eq!(p.to_string(), "[0,5|1,2|3,4]");
    }

    #[test]
    fn test_cell_editing() {
        let mut p = Partition::new();
        p.add_singleton_cell(2);
        p.add_cell(BTreeSet::from([0]));
        p.add_to_cell(1, 1);
        p.insert_cell(0, BTreeSet::from([3]));
        assert_eq!(p.to_string(), "[3|2|0,1]");
        assert_eq!(p.remove_cell(1), BTreeSet::from([2]));
        assert_eq!(p.to_string(), "[3|0,1]");
    }
}
