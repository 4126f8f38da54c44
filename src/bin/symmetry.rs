use anyhow::Result;
use clap::Parser;
use molecule_symmetry::*;

/// Print the atom and bond symmetry of molecules given as SMILES.
#[derive(Debug, Parser)]
struct Cli {
    /// SMILES strings to analyse.
    #[arg(required = true)]
    smiles: Vec<String>,
    /// Treat every atom as the same element.
    #[arg(long)]
    ignore_elements: bool,
    /// Treat every bond as a single bond.
    #[arg(long)]
    ignore_bond_orders: bool,
    /// One of error, warn, info, debug or trace.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    let options = RefinableOptions {
        ignore_elements: cli.ignore_elements,
        ignore_bond_orders: cli.ignore_bond_orders,
    };

    println!("smiles\t{}", SymmetryReport::HEADER.join("\t"));
    for smiles in &cli.smiles {
        let report = SymmetryReport::from_smiles(smiles, options)?;
        println!("{smiles}\t{report}");
    }
    Ok(())
}
