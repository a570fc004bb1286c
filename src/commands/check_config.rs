use anyhow::Result;
use std::path::Path;

use situs::aircraft_performance::PerformanceTable;
use situs::config::SitusConfig;

/// Print the effective configuration as TOML
pub fn handle_check_config(path: &Path, config: &SitusConfig) -> Result<()> {
    let table = PerformanceTable::new(&config.aircraft);
    println!("# Effective configuration ({})", path.display());
    println!(
        "# {} aircraft overrides, {} known types",
        config.aircraft.len(),
        table.len()
    );
    print!("{}", config.to_toml()?);
    Ok(())
}
