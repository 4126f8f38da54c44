use anyhow::{Context, Result};
use num_bigint::BigUint;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::instrument;

use crate::{
    parse_smiles, AtomDiscretePartitionRefiner, BondDiscretePartitionRefiner, MoleculeGraph,
    Partition, Permutation, RefinableOptions,
};

/// Atom and bond symmetry of one molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetryReport {
    pub atom_count: usize,
    pub bond_count: usize,
    pub atom_group_order: BigUint,
    pub atom_orbits: Partition,
    /// The canonical labelling: position `i` holds the atom placed `i`-th.
    pub canonical_labelling: Permutation,
    /// Whether the input numbering already was the canonical one.
    pub is_canonical: bool,
    pub bond_group_order: BigUint,
    pub bond_orbits: Partition,
}

impl SymmetryReport {
    /// Column names matching [`SymmetryReport::fields`].
    pub const HEADER: [&'static str; 8] = [
        "atoms",
        "bonds",
        "atom_group_order",
        "atom_orbits",
        "canonical_labelling",
        "is_canonical",
        "bond_group_order",
        "bond_orbits",
    ];

    pub fn from_smiles(smiles: &str, options: RefinableOptions) -> Result<Self> {
        let graph = parse_smiles(smiles)?;
        Self::from_molecule(&graph, options)
            .context(format!("While computing the symmetry of {smiles}"))
    }

    #[instrument(skip_all, fields(atoms = graph.node_count(), bonds = graph.edge_count()))]
    pub fn from_molecule(graph: &MoleculeGraph, options: RefinableOptions) -> Result<Self> {
        let mut atoms = AtomDiscretePartitionRefiner::with_options(options);
        atoms.refine(graph).context("Atom symmetry search failed")?;
        let atom_search = atoms.refiner();

        let mut bonds = BondDiscretePartitionRefiner::with_options(options);
        bonds.refine(graph).context("Bond symmetry search failed")?;
        let bond_search = bonds.refiner();

        Ok(Self {
            atom_count: graph.node_count(),
            bond_count: graph.edge_count(),
            atom_group_order: atom_search.automorphism_group()?.order(),
            atom_orbits: atom_search.automorphism_partition()?,
            canonical_labelling: atom_search.best()?.clone(),
            is_canonical: atom_search.is_canonical()?,
            bond_group_order: bond_search.automorphism_group()?.order(),
            bond_orbits: bond_search.automorphism_partition()?,
        })
    }

    /// The report as one value per [`SymmetryReport::HEADER`] column.
    pub fn fields(&self) -> Vec<String> {
        vec![
            self.atom_count.to_string(),
            self.bond_count.to_string(),
            self.atom_group_order.to_string(),
            self.atom_orbits.to_string(),
            self.canonical_labelling.to_string(),
            self.is_canonical.to_string(),
            self.bond_group_order.to_string(),
            self.bond_orbits.to_string(),
        ]
    }
}

impl Display for SymmetryReport {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.fields().join("\t"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_for_cyclopropane() {
        let report = SymmetryReport::from_smiles("C1CC1", RefinableOptions::default()).unwrap();
        assert_eq!(report.atom_count, 3);
        assert_eq!(report.bond_count, 3);
        assert_eq!(report.atom_group_order, BigUint::from(6u32));
        assert_eq!(report.atom_orbits.to_string(), "[0,1,2]");
        assert_eq!(report.bond_group_order, BigUint::from(6u32));
        assert_eq!(report.bond_orbits.to_string(), "[0,1,2]");
        assert!(report.is_canonical);
    }

    #[test]
    fn test_report_line() {
        let report = SymmetryReport::from_smiles("CCO", RefinableOptions::default()).unwrap();
        assert_eq!(
            report.to_string(),
            "3\t2\t1\t[0|1|2]\t[1, 0, 2]\tfalse\t1\t[0|1]"
        );
        assert_eq!(report.fields().len(), SymmetryReport::HEADER.len());
    }

    #[test]
    fn test_report_without_bonds() {
        let report = SymmetryReport::from_smiles("C.C", RefinableOptions::default()).unwrap();
        assert_eq!(report.bond_count, 0);
        assert_eq!(report.bond_group_order, BigUint::from(1u32));
        assert_eq!(report.atom_group_order, BigUint::from(2u32));
        assert_eq!(report.bond_orbits.to_string(), "[]");
        let reread: Partition = report.bond_orbits.to_string().parse().unwrap();
        assert_eq!(reread, report.bond_orbits);
    }

    #[test]
    fn test_report_rejects_bad_smiles() {
        let err = SymmetryReport::from_smiles("C1CC", RefinableOptions::default()).unwrap_err();
        assert!(err.to_string().contains("C1CC"));
    }
}
