use anyhow::{Result, bail};
use std::path::Path;
use tracing::info;

use situs::config::SitusConfig;
use situs::replay::run_replay;

pub fn handle_replay(input: &Path, output: Option<&Path>, config: &SitusConfig) -> Result<()> {
    if !input.exists() {
        bail!("Input file {:?} does not exist", input);
    }
    let summary = run_replay(input, output, config)?;
    if let Some(path) = output {
        info!("Wrote {} situations to {:?}", summary.processed, path);
    }
    Ok(())
}
