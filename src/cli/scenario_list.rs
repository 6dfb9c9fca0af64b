use std::io::{self, Write};

use crate::core::scenario::ScenarioCatalog;

pub fn list_scenarios<W: Write>(catalog: &ScenarioCatalog, out: &mut W) -> io::Result<()> {
    if catalog.is_empty() {
        writeln!(out, "No scenarios configured.")?;
        return Ok(());
    }

    let name_width = catalog
        .iter()
        .map(|scenario| scenario.name.chars().count())
        .max()
        .unwrap_or(0);

    writeln!(out, "Available scenarios:")?;
    writeln!(out)?;
    for scenario in catalog.iter() {
        if scenario.description.is_empty() {
            writeln!(out, "  {}", scenario.name)?;
        } else {
            writeln!(
                out,
                "  {:<width$}  {}",
                scenario.name,
                scenario.description,
                width = name_width
            )?;
        }
    }
    writeln!(out)?;
    writeln!(out, "Start one with: rpchat talk <scenario>")?;
    Ok(())
}
