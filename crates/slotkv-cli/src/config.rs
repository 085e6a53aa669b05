//! Optional `slotkv.toml` defaults for store creation.
//!
//! This only ever influences brand-new files: once a store exists its
//! `maxKeyLen` is fixed in the header and always wins over the config file.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub max_key_len: u8,
    pub preallocated_slots: u32,
    pub payload_crc_enabled: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            max_key_len: 64,
            preallocated_slots: 16,
            payload_crc_enabled: true,
        }
    }
}

impl CliConfig {
    /// Loads `slotkv.toml` from the current directory, falling back to
    /// defaults if it doesn't exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new("slotkv.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn store_options(&self) -> slotkv::StoreOptions {
        slotkv::StoreOptions {
            max_key_len: self.max_key_len,
            preallocated_slots: self.preallocated_slots,
            payload_crc_enabled: self.payload_crc_enabled,
        }
    }
}
