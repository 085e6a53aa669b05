use crate::config::CliConfig;
use anyhow::{Context, Result};
use slotkv::OpenMode;
use std::io::Write;
use std::path::Path;

pub fn run(path: &Path, key: &[u8]) -> Result<()> {
    let config = CliConfig::load()?;
    let mut store = slotkv::Store::open(path, OpenMode::OpenReadOnly, config.store_options())
        .with_context(|| format!("opening {}", path.display()))?;
    let value = store.read(key)?;
    std::io::stdout().write_all(&value)?;
    Ok(())
}
