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

//! Serializable description of a scene's structure.
//!
//! Descriptors carry only the containment tree: names, ids, nesting.
//! Components are behavior and are attached by application code after the
//! structure is built. Loading from disk lives in `vigil-infra`.

use super::{GameObject, Scene};
use crate::ident::Identity;
use serde::{Deserialize, Serialize};

/// Structure of one game object and its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    /// Object name.
    pub name: String,
    /// Object id; 0 lets the application assign one later.
    #[serde(default)]
    pub id: u64,
    /// Child objects.
    #[serde(default)]
    pub children: Vec<ObjectDescriptor>,
}

/// Structure of a whole scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    /// Scene name.
    pub name: String,
    /// Scene id; 0 lets the set assign one.
    #[serde(default)]
    pub id: u64,
    /// Root objects.
    #[serde(default)]
    pub objects: Vec<ObjectDescriptor>,
}

impl ObjectDescriptor {
    fn build(&self) -> GameObject {
        let mut object = GameObject::new(Identity::new(self.name.clone(), self.id));
        for child in &self.children {
            object.add_child(child.build());
        }
        object
    }

    fn describe(object: &GameObject) -> Self {
        Self {
            name: object.name().to_string(),
            id: object.ident().id,
            children: object.children().iter().map(Self::describe).collect(),
        }
    }
}

impl SceneDescriptor {
    /// Builds the scene this descriptor describes. Components are not part
    /// of the description and must be attached afterwards.
    pub fn build(&self) -> Scene {
        let mut scene = Scene::new(Identity::new(self.name.clone(), self.id));
        for object in &self.objects {
            scene.add_object(object.build());
        }
        scene
    }

    /// Describes an existing scene's structure.
    pub fn describe(scene: &Scene) -> Self {
        Self {
            name: scene.name().to_string(),
            id: scene.ident().id,
            objects: scene.objects().iter().map(ObjectDescriptor::describe).collect(),
        }
    }
}
