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

//! Disk-backed file service rooted at one directory.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use vigil_core::fs::FileService;

/// A [`FileService`] mapping names to files under a root directory.
///
/// Names are relative identifiers; anything that would escape the root
/// (absolute paths, `..` components) is rejected rather than resolved.
#[derive(Debug, Clone)]
pub struct DiskFileService {
    root: PathBuf,
}

impl DiskFileService {
    /// A service rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        log::debug!("file service rooted at {}", root.display());
        Ok(Self { root })
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || name.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("file name '{name}' escapes the service root"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl FileService for DiskFileService {
    fn exists(&self, name: &str) -> bool {
        self.resolve(name).map(|p| p.is_file()).unwrap_or(false)
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(name)?)
    }

    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.resolve(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)
    }

    fn append(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.resolve(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(bytes)
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        fs::remove_file(self.resolve(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (tempfile::TempDir, DiskFileService) {
        let dir = tempfile::tempdir().unwrap();
        let service = DiskFileService::new(dir.path().join("data")).unwrap();
        (dir, service)
    }

    #[test]
    fn write_read_append_remove() {
        let (_dir, service) = service();

        assert!(!service.exists("engine.cf"));
        service.write("engine.cf", b"width = 640\n").unwrap();
        assert!(service.exists("engine.cf"));
        assert_eq!(service.read("engine.cf").unwrap(), b"width = 640\n");

        service.append("engine.cf", b"height = 480\n").unwrap();
        assert_eq!(
            service.read_to_string("engine.cf").unwrap(),
            "width = 640\nheight = 480\n"
        );

        service.remove("engine.cf").unwrap();
        assert!(!service.exists("engine.cf"));
        assert!(service.read("engine.cf").is_err());
    }

    #[test]
    fn append_creates_the_file() {
        let (_dir, service) = service();
        service.append("journal.txt", b"first line\n").unwrap();
        assert_eq!(service.read_to_string("journal.txt").unwrap(), "first line\n");
    }

    #[test]
    fn nested_names_create_directories() {
        let (_dir, service) = service();
        service.write("saves/slot1/world.scene", b"{}").unwrap();
        assert!(service.exists("saves/slot1/world.scene"));
    }

    #[test]
    fn names_escaping_the_root_are_rejected() {
        let (_dir, service) = service();
        assert!(service.read("../outside").is_err());
        assert!(service.write("/etc/hostname", b"x").is_err());
        assert!(service.read("").is_err());
        assert!(!service.exists("../outside"));
    }
}
