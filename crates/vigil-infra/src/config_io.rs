// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Loading and saving [`ConfigStore`]s through the file service.

use thiserror::Error;
use vigil_core::config::ConfigStore;
use vigil_core::fs::FileService;

/// Failure while loading or saving a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The underlying file operation failed.
    #[error("config file i/o failed")]
    Io(#[from] std::io::Error),
    /// The file exists but is not valid flat key=value text.
    #[error("config file '{name}' is malformed: {reason}")]
    Parse {
        /// File name as given to the service.
        name: String,
        /// What the parser objected to.
        reason: &'static str,
    },
}

/// Loads and parses the named config file.
pub fn load_config(files: &dyn FileService, name: &str) -> Result<ConfigStore, ConfigError> {
    let text = files.read_to_string(name)?;
    let store = ConfigStore::from_text(name, &text).map_err(|reason| ConfigError::Parse {
        name: name.to_string(),
        reason,
    })?;
    log::debug!("loaded config '{}' ({} keys)", name, store.len());
    Ok(store)
}

/// Writes the store back out under its own name.
pub fn save_config(files: &dyn FileService, store: &ConfigStore) -> Result<(), ConfigError> {
    files.write(store.name(), store.to_text().as_bytes())?;
    log::debug!("saved config '{}' ({} keys)", store.name(), store.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::DiskFileService;
    use vigil_core::config::ConfigValue;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let files = DiskFileService::new(dir.path()).unwrap();

        let store = ConfigStore::new("engine.cf");
        store.set("width", ConfigValue::Int(640));
        store.set("title", ConfigValue::String("vigil".to_string()));
        save_config(&files, &store).unwrap();

        let loaded = load_config(&files, "engine.cf").unwrap();
        assert_eq!(loaded.get_int("width", 0), 640);
        assert_eq!(loaded.get_string("title", ""), "vigil");
    }

    #[test]
    fn loading_an_absent_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = DiskFileService::new(dir.path()).unwrap();
        assert!(matches!(
            load_config(&files, "missing.cf"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn loading_garbage_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = DiskFileService::new(dir.path()).unwrap();
        files.write("bad.cf", b"this is not a config").unwrap();
        assert!(matches!(
            load_config(&files, "bad.cf"),
            Err(ConfigError::Parse { .. })
        ));
    }
}
