use crate::config::CliConfig;
use anyhow::{Context, Result};
use slotkv::OpenMode;
use std::path::Path;

pub fn run(path: &Path, key: &[u8]) -> Result<()> {
    let config = CliConfig::load()?;
    let mut store = slotkv::Store::open(path, OpenMode::OpenReadWrite, config.store_options())
        .with_context(|| format!("opening {}", path.display()))?;
    store.delete(key)?;
    store.close()?;
    println!("deleted");
    Ok(())
}
