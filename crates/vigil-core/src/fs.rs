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

//! The file service seam: byte-level read/write of named files.
//!
//! Names are plain relative identifiers (`"engine.cf"`, `"journal.txt"`);
//! how they map to actual storage is the backend's business. The disk
//! backend lives in `vigil-infra`.

use std::io;

/// Byte-level access to named files.
pub trait FileService: Send + Sync {
    /// Whether a file with this name currently exists.
    fn exists(&self, name: &str) -> bool;

    /// Reads the whole file.
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Replaces the file's contents.
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()>;

    /// Appends to the file, creating it if absent.
    fn append(&self, name: &str, bytes: &[u8]) -> io::Result<()>;

    /// Removes the file. Removing an absent file is an error.
    fn remove(&self, name: &str) -> io::Result<()>;

    /// Reads the whole file as UTF-8 text.
    fn read_to_string(&self, name: &str) -> io::Result<String> {
        let bytes = self.read(name)?;
        String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
