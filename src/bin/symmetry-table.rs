use anyhow::Result;
use clap::Parser;
use molecule_symmetry::*;

/// Add symmetry columns to a CSV table of molecules.
#[derive(Debug, Parser)]
struct Cli {
    /// Input CSV with a header row.
    input: String,
    /// Output CSV.
    output: String,
    /// Name of the column holding the SMILES.
    #[arg(long, default_value = "smiles")]
    column: String,
    #[arg(long)]
    ignore_elements: bool,
    #[arg(long)]
    ignore_bond_orders: bool,
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    let options = RefinableOptions {
        ignore_elements: cli.ignore_elements,
        ignore_bond_orders: cli.ignore_bond_orders,
    };
    write_symmetry_table_file(&cli.input, &cli.output, &cli.column, options)?;
    Ok(())
}
