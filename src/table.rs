//! Symmetry reports for a CSV table of molecules.

use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord, Writer};
use std::fs::File;
use std::io::{Read, Write};
use tracing::{info, warn};

use crate::{RefinableOptions, SymmetryReport};

/// Read molecules from the `smiles_column` of `input` and write one report row
/// per molecule to `output`. Rows whose SMILES cannot be read are skipped.
/// Returns the number of rows written.
pub fn write_symmetry_table<R: Read, W: Write>(
    input: R,
    output: W,
    smiles_column: &str,
    options: RefinableOptions,
) -> Result<usize> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(input);
    let column = rdr
        .headers()?
        .iter()
        .position(|name| name == smiles_column)
        .ok_or_else(|| anyhow!("No column named '{smiles_column}'"))?;

    let mut wtr = Writer::from_writer(output);
    let mut header = vec!["smiles"];
    header.extend(SymmetryReport::HEADER);
    wtr.write_record(&header)?;

    let mut written = 0;
    for result in rdr.records() {
        let record: StringRecord = result?;
        let smiles = record.get(column).unwrap_or("").trim();
        if smiles.is_empty() {
            warn!("Skipping record with empty SMILES: {:?}", record);
            continue;
        }
        let report = match SymmetryReport::from_smiles(smiles, options) {
            Ok(report) => report,
            Err(err) => {
                warn!("Skipping '{}': {:#}", smiles, err);
                continue;
            }
        };
        let mut row = vec![smiles.to_string()];
        row.extend(report.fields());
        wtr.write_record(&row)?;
        written += 1;
    }
    wtr.flush()?;
    Ok(written)
}

/// [`write_symmetry_table`] between two files.
pub fn write_symmetry_table_file(
    input_csv: &str,
    output_csv: &str,
    smiles_column: &str,
    options: RefinableOptions,
) -> Result<usize> {
    let input = File::open(input_csv).context(format!("Failed to open {input_csv}"))?;
    let output = File::create(output_csv).context(format!("Failed to create {output_csv}"))?;
    let written = write_symmetry_table(input, output, smiles_column, options)?;
    info!("Symmetry table with {} rows written to {}", written, output_csv);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_skips_bad_rows() {
        let input = "name,smiles\nethanol,CCO\nbroken,C1CC\nempty,\ncyclopropane,C1CC1\n";
        let mut output = Vec::new();
        let written =
            write_symmetry_table(input.as_bytes(), &mut output, "smiles", RefinableOptions::default())
                .unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("smiles,atoms,bonds,atom_group_order"));
        assert!(lines[1].starts_with("CCO,3,2,1,"));
        assert!(lines[2].starts_with("C1CC1,3,3,6,"));
    }

    #[test]
    fn test_table_needs_smiles_column() {
        let input = "name,structure\nethanol,CCO\n";
        let result = write_symmetry_table(
            input.as_bytes(),
            Vec::new(),
            "smiles",
            RefinableOptions::default(),
        );
        assert!(result.is_err());
    }
}
