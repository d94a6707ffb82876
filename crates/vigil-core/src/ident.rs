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

//! Shared identity value for everything held in a named collection.
//!
//! Workers, scenes, and game objects all carry the same three facts: a name
//! used for lookup, a numeric id, and a pinned flag that protects the entry
//! from name-based eviction. Holding this as a plain value keeps identity a
//! matter of composition rather than inheritance.

/// Name, numeric id, and eviction protection for a registered entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Lookup name. Uniqueness is not enforced; lookups return the first match.
    pub name: String,
    /// Numeric id, either pinned by the application or assigned by a registry.
    pub id: u64,
    /// A pinned entity is skipped by name-based eviction, but not by
    /// teardown-all operations.
    pub pinned: bool,
}

impl Identity {
    /// Creates an identity with the given name and id, not pinned.
    pub fn new(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
            pinned: false,
        }
    }

    /// Marks this identity as pinned.
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}
