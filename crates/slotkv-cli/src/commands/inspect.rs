use crate::config::CliConfig;
use anyhow::{Context, Result};
use slotkv::OpenMode;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let config = CliConfig::load()?;
    let store = slotkv::Store::open(path, OpenMode::OpenReadOnly, config.store_options())
        .with_context(|| format!("opening {}", path.display()))?;

    println!("max_key_len:   {}", store.max_key_len());
    println!("records:       {}", store.len()?);
    println!("index slots:   {}", store.total_slots());
    match store.data_region_span()? {
        Some((start, end)) => println!("data region:   [{start}, {end})"),
        None => println!("data region:   (empty)"),
    }
    for slot_num in 0..store.total_slots() {
        if let Some(key) = store.slot_key(slot_num)? {
            println!("  slot {slot_num}: {}", String::from_utf8_lossy(&key));
        }
    }
    Ok(())
}
