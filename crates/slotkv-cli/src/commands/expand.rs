//! Offline utility: rewrite a store with a larger `maxKeyLen`.
//!
//! `maxKeyLen` is fixed for the life of a file (it sizes every index slot),
//! so growing it means writing a new file. This is built entirely on the
//! public `Store` API — no access to the on-disk format beyond what `Store`
//! already exposes.

use anyhow::{bail, Context, Result};
use slotkv::{OpenMode, Store, StoreOptions};
use std::path::Path;

pub fn run(source: &Path, new_max_key_len: u8, destination: &Path) -> Result<()> {
    let mut source_store = Store::open(
        source,
        OpenMode::OpenReadOnly,
        StoreOptions {
            max_key_len: 1,
            preallocated_slots: 1,
            payload_crc_enabled: true,
        },
    )
    .with_context(|| format!("opening {}", source.display()))?;

    if new_max_key_len < source_store.max_key_len() {
        bail!(
            "new max_key_len ({new_max_key_len}) must be >= the source's ({})",
            source_store.max_key_len()
        );
    }

    let pairs = source_store.snapshot()?;
    let preallocated_slots = source_store.total_slots().max(1);

    let mut destination_store = Store::open(
        destination,
        OpenMode::CreateOrOpenReadWrite,
        StoreOptions {
            max_key_len: new_max_key_len,
            preallocated_slots,
            payload_crc_enabled: true,
        },
    )
    .with_context(|| format!("creating {}", destination.display()))?;

    for (key, value) in &pairs {
        destination_store.insert(key, value)?;
    }
    destination_store.close()?;

    println!(
        "expanded {} record(s) from {} (max_key_len={}) to {} (max_key_len={new_max_key_len})",
        pairs.len(),
        source.display(),
        source_store.max_key_len(),
        destination.display()
    );
    Ok(())
}
