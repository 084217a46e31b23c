//! sheetlist: batch plotting and drawing list extraction from CAD title blocks.
//!
//! Reads the title block of every paper space layout in a folder of DXF
//! drawings, plots each layout to PDF through an external plot command and
//! writes the drawing list as CSV.

mod commands;

use anyhow::Result;
use clap::Parser;

use commands::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
