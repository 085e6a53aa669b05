use crate::config::CliConfig;
use anyhow::{Context, Result};
use slotkv::OpenMode;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let config = CliConfig::load()?;
    let store = slotkv::Store::open(path, OpenMode::OpenReadOnly, config.store_options())
        .with_context(|| format!("opening {}", path.display()))?;
    let mut keys = store.keys()?;
    keys.sort();
    for key in keys {
        println!("{}", String::from_utf8_lossy(&key));
    }
    Ok(())
}
