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

//! Scene files: JSON-encoded [`SceneDescriptor`]s read and written through
//! the file service. Only structure is persisted; components are attached
//! by application code after loading.

use thiserror::Error;
use vigil_core::fs::FileService;
use vigil_core::scene::{Scene, SceneDescriptor};

/// Failure while loading or saving a scene file.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The underlying file operation failed.
    #[error("scene file i/o failed")]
    Io(#[from] std::io::Error),
    /// The file exists but does not decode as a scene descriptor.
    #[error("scene file '{name}' is not a valid scene")]
    Decode {
        /// File name as given to the service.
        name: String,
        /// The decoder's complaint.
        #[source]
        source: serde_json::Error,
    },
}

/// Loads and builds the named scene file.
pub fn load_scene(files: &dyn FileService, name: &str) -> Result<Scene, SceneError> {
    let text = files.read_to_string(name)?;
    let descriptor: SceneDescriptor =
        serde_json::from_str(&text).map_err(|source| SceneError::Decode {
            name: name.to_string(),
            source,
        })?;
    log::debug!(
        "loaded scene '{}' ({} root objects)",
        descriptor.name,
        descriptor.objects.len()
    );
    Ok(descriptor.build())
}

/// Writes the scene's structure out as JSON under `name`.
pub fn save_scene(files: &dyn FileService, name: &str, scene: &Scene) -> Result<(), SceneError> {
    let descriptor = SceneDescriptor::describe(scene);
    let text = serde_json::to_string_pretty(&descriptor).map_err(|source| SceneError::Decode {
        name: name.to_string(),
        source,
    })?;
    files.write(name, text.as_bytes())?;
    Ok(())
}
