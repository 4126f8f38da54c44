use anyhow::{Context, Result};
use petgraph::graph::NodeIndex;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::{Bond, Element, MoleculeGraph, UnknownElement};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmilesError {
    #[error("empty SMILES string")]
    Empty,
    #[error("branch start '(' at position {0} without a current atom")]
    BranchNoCurrentAtom(usize),
    #[error("branch end ')' at position {0} without a matching '('")]
    BranchEndNoStart(usize),
    #[error("{0} branch(es) never closed")]
    UnclosedBranch(usize),
    #[error("ring closure {0} at position {1} without a current atom")]
    RingClosureNoCurrentAtom(usize, usize),
    #[error("ring closure {0} never closed")]
    UnclosedRing(usize),
    #[error("ring closure {0} at position {1} bonds an atom to itself or to an atom it is already bonded to")]
    RingClosureRepeatsBond(usize, usize),
    #[error("'%' at position {0} is not followed by two digits")]
    BadRingLabel(usize),
    #[error("unclosed bracket '[' at position {0}")]
    UnclosedBracket(usize),
    #[error("bond symbol at position {0} is not followed by an atom")]
    DanglingBond(usize),
    #[error(transparent)]
    Element(#[from] UnknownElement),
}

/// Parses a SMILES string into a MoleculeGraph.
///
/// Atoms are numbered in the order they appear, explicit hydrogens of a bracket
/// atom directly after it. Bonds are numbered in the order they are closed.
pub fn parse_smiles(smiles: &str) -> Result<MoleculeGraph> {
    parse_smiles_helper(smiles).context(format!("Failed to parse SMILES string {smiles}"))
}

#[derive(Default)]
struct Reader {
    graph: MoleculeGraph,
    current: Option<NodeIndex>,
    /// An explicit bond symbol waiting for the next atom, and where it was.
    bond: Option<(usize, Bond)>,
    branches: Vec<NodeIndex>,
    rings: BTreeMap<usize, (NodeIndex, Option<Bond>)>,
}

impl Reader {
    /// Two aromatic atoms joined without a bond symbol share an aromatic bond.
    fn bond_between(&self, a: NodeIndex, b: NodeIndex, explicit: Option<Bond>) -> Bond {
        match explicit {
            Some(bond) => bond,
            None if self.graph[a].is_aromatic() && self.graph[b].is_aromatic() => Bond::Aromatic,
            None => Bond::Single,
        }
    }

    fn add_atom(&mut self, element: Element) -> NodeIndex {
        let atom = self.graph.add_node(element);
        let explicit = self.bond.take().map(|(_, bond)| bond);
        if let Some(prev_atom) = self.current {
            let bond = self.bond_between(prev_atom, atom, explicit);
            self.graph.add_edge(prev_atom, atom, bond);
        }
        self.current = Some(atom);
        atom
    }

    fn ring_closure(&mut self, label: usize, position: usize) -> Result<(), SmilesError> {
        let current = self
            .current
            .ok_or(SmilesError::RingClosureNoCurrentAtom(label, position))?;
        let explicit = self.bond.take().map(|(_, bond)| bond);
        match self.rings.remove(&label) {
            Some((start_atom, opened)) => {
                if start_atom == current || self.graph.contains_edge(start_atom, current) {
                    return Err(SmilesError::RingClosureRepeatsBond(label, position));
                }
                let bond = self.bond_between(start_atom, current, explicit.or(opened));
                self.graph.add_edge(current, start_atom, bond);
            }
            None => {
                self.rings.insert(label, (current, explicit));
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<MoleculeGraph, SmilesError> {
        if let Some((position, _)) = self.bond {
            return Err(SmilesError::DanglingBond(position));
        }
        if !self.branches.is_empty() {
            return Err(SmilesError::UnclosedBranch(self.branches.len()));
        }
        if let Some(&label) = self.rings.keys().next() {
            return Err(SmilesError::UnclosedRing(label));
        }
        Ok(self.graph)
    }
}

/// Element and explicit hydrogen count of a bracket atom such as `13CH3`, `nH`
/// or `C@@H`. Isotopes, chirality and charges are dropped.
fn parse_bracketed_smiles(content: &str) -> Result<(Element, usize), SmilesError> {
    let content = content.trim_start_matches(|c: char| c.is_ascii_digit());
    let symbol_len = match content.get(..2) {
        Some(two) if content.starts_with(char::is_uppercase) && Element::from_smiles(two).is_ok() => 2,
        _ => content.chars().next().map_or(0, char::len_utf8),
    };
    let element = Element::from_smiles(&content[..symbol_len])?;

    let rest = content[symbol_len..].trim_start_matches('@');
    let h_count = match rest.strip_prefix('H') {
        Some(count) => {
            let digits: String = count.chars().take_while(|c| c.is_ascii_digit()).take(2).collect();
            digits.parse().unwrap_or(1)
        }
        None => 0,
    };
    Ok((element, h_count))
}

fn parse_smiles_helper(smiles: &str) -> Result<MoleculeGraph, SmilesError> {
    if smiles.trim().is_empty() {
        return Err(SmilesError::Empty);
    }
    let mut reader = Reader::default();
    let chars: Vec<char> = smiles.trim().chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '(' => {
                let atom = reader.current.ok_or(SmilesError::BranchNoCurrentAtom(i))?;
                reader.branches.push(atom);
                i += 1;
            }
            ')' => {
                reader.current = Some(
                    reader
                        .branches
                        .pop()
                        .ok_or(SmilesError::BranchEndNoStart(i))?,
                );
                i += 1;
            }
            '-' | '=' | '#' | ':' => {
                let bond = match c {
                    '-' => Bond::Single,
                    '=' => Bond::Double,
                    '#' => Bond::Triple,
                    _ => Bond::Aromatic,
                };
                reader.bond = Some((i, bond));
                i += 1;
            }
            '0'..='9' => {
                reader.ring_closure(c as usize - '0' as usize, i)?;
                i += 1;
            }
            '%' => {
                let label = match (chars.get(i + 1), chars.get(i + 2)) {
                    (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit() => {
                        (*a as usize - '0' as usize) * 10 + (*b as usize - '0' as usize)
                    }
                    _ => return Err(SmilesError::BadRingLabel(i)),
                };
                reader.ring_closure(label, i)?;
                i += 3;
            }
            '[' => {
                let end = chars[i..]
                    .iter()
                    .position(|&x| x == ']')
                    .map(|offset| i + offset)
                    .ok_or(SmilesError::UnclosedBracket(i))?;
                let content: String = chars[i + 1..end].iter().collect();
                let (element, h_count) = parse_bracketed_smiles(&content)?;
                let atom = reader.add_atom(element);
                for _ in 0..h_count {
                    let h_node = reader.graph.add_node(Element::H);
                    reader.graph.add_edge(atom, h_node, Bond::Single);
                }
                i = end + 1;
            }
            '@' | '/' | '\\' => {
                // stereo markers carry no connectivity
                i += 1;
            }
            '.' => {
                reader.current = None;
                reader.bond = None;
                reader.branches.clear();
                i += 1;
            }
            _ => {
                // two-letter symbols such as Cl and Br win over their first letter
                let two_letter = c.is_ascii_uppercase()
                    && chars.get(i + 1).is_some_and(|next| next.is_ascii_lowercase())
                    && Element::from_smiles(&chars[i..i + 2].iter().collect::<String>()).is_ok();
                let len = if two_letter { 2 } else { 1 };
                let symbol: String = chars[i..i + len].iter().collect();
                reader.add_atom(Element::from_smiles(&symbol)?);
                i += len;
            }
        }
    }

    reader.finish()
}
