pub mod analyze;
pub mod benchmark;
pub mod completion;
pub mod export;
pub mod history;
pub mod opportunities;

use anyhow::Result;
use kestrel_core::history::JsonFileStore;
use std::path::Path;

/// Open the on-disk result store, honoring --data-dir
pub fn open_store(data_dir: Option<&Path>) -> Result<JsonFileStore> {
    let store = match data_dir {
        Some(dir) => JsonFileStore::open_in(dir)?,
        None => JsonFileStore::open_default()?,
    };
    Ok(store)
}
