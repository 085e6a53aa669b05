use crate::config::CliConfig;
use anyhow::{Context, Result};
use slotkv::OpenMode;
use std::path::Path;

pub fn run(path: &Path, key: &[u8], value: &[u8]) -> Result<()> {
    let config = CliConfig::load()?;
    let mut store = slotkv::Store::open(path, OpenMode::CreateOrOpenReadWrite, config.store_options())
        .with_context(|| format!("opening {}", path.display()))?;

    if store.exists(key)? {
        store.update(key, value)?;
        println!("updated {} bytes", value.len());
    } else {
        store.insert(key, value)?;
        println!("inserted {} bytes", value.len());
    }
    store.close()?;
    Ok(())
}
