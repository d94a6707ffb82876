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

//! The scene/object containment tree.
//!
//! Pure composition, no concurrency: a [`Scene`] holds root [`GameObject`]s,
//! each of which holds [`Component`]s (a transform, a sprite, or any other
//! behavior attached to the object) and child objects. `update` cascades
//! down the tree once per tick.

mod format;

pub use format::{ObjectDescriptor, SceneDescriptor};

use crate::ident::Identity;
use std::time::Duration;

/// A piece of behavior or data attached to a game object.
pub trait Component: Send {
    /// Advances the component by one tick.
    fn update(&mut self, dt: Duration);
}

/// A node of the containment tree: identity, attached components, and child
/// objects it owns.
pub struct GameObject {
    ident: Identity,
    components: Vec<Box<dyn Component>>,
    children: Vec<GameObject>,
}

impl GameObject {
    /// An empty object with the given identity.
    pub fn new(ident: Identity) -> Self {
        Self {
            ident,
            components: Vec::new(),
            children: Vec::new(),
        }
    }

    /// The object's identity.
    pub fn ident(&self) -> &Identity {
        &self.ident
    }

    /// The object's lookup name.
    pub fn name(&self) -> &str {
        &self.ident.name
    }

    /// Attaches a component.
    pub fn add_component(&mut self, component: Box<dyn Component>) {
        self.components.push(component);
    }

    /// Adds a child object.
    pub fn add_child(&mut self, child: GameObject) {
        self.children.push(child);
    }

    /// First child with the given name, if any.
    pub fn find_child(&self, name: &str) -> Option<&GameObject> {
        self.children.iter().find(|c| c.ident.name == name)
    }

    /// Mutable access to the first child with the given name.
    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut GameObject> {
        self.children.iter_mut().find(|c| c.ident.name == name)
    }

    /// The object's children.
    pub fn children(&self) -> &[GameObject] {
        &self.children
    }

    /// Number of attached components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Ticks the object's components, then its children.
    pub fn update(&mut self, dt: Duration) {
        for component in &mut self.components {
            component.update(dt);
        }
        for child in &mut self.children {
            child.update(dt);
        }
    }
}

/// A named collection of root game objects.
pub struct Scene {
    ident: Identity,
    roots: Vec<GameObject>,
}

impl Scene {
    /// An empty scene with the given identity.
    pub fn new(ident: Identity) -> Self {
        Self {
            ident,
            roots: Vec::new(),
        }
    }

    /// The scene's identity.
    pub fn ident(&self) -> &Identity {
        &self.ident
    }

    /// The scene's lookup name.
    pub fn name(&self) -> &str {
        &self.ident.name
    }

    /// Adds a root object.
    pub fn add_object(&mut self, object: GameObject) {
        self.roots.push(object);
    }

    /// First root object with the given name, if any.
    pub fn find_object(&self, name: &str) -> Option<&GameObject> {
        self.roots.iter().find(|o| o.ident.name == name)
    }

    /// Mutable access to the first root object with the given name.
    pub fn find_object_mut(&mut self, name: &str) -> Option<&mut GameObject> {
        self.roots.iter_mut().find(|o| o.ident.name == name)
    }

    /// The scene's root objects.
    pub fn objects(&self) -> &[GameObject] {
        &self.roots
    }

    /// Ticks every root object.
    pub fn update(&mut self, dt: Duration) {
        for object in &mut self.roots {
            object.update(dt);
        }
    }
}

/// The set of loaded scenes, with the same lookup and eviction discipline as
/// the worker registry: first match wins, pinned scenes survive name-based
/// removal.
pub struct SceneSet {
    scenes: Vec<Scene>,
    next_id: u64,
}

impl SceneSet {
    /// Ids this set assigns on its own start here; smaller ids are left to
    /// the application.
    pub const ID_SEED: u64 = 1000;

    /// An empty set.
    pub fn new() -> Self {
        Self {
            scenes: Vec::new(),
            next_id: Self::ID_SEED,
        }
    }

    /// A fresh id, strictly increasing and never colliding with
    /// application-pinned ids below the seed.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Adds a scene.
    pub fn add(&mut self, scene: Scene) {
        self.scenes.push(scene);
    }

    /// Creates an empty scene under the given name and returns it for
    /// population.
    pub fn create(&mut self, name: impl Into<String>) -> &mut Scene {
        let id = self.next_id();
        self.scenes.push(Scene::new(Identity::new(name, id)));
        self.scenes.last_mut().expect("scene pushed above")
    }

    /// First scene with the given name, if any.
    pub fn find(&self, name: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.ident.name == name)
    }

    /// Mutable access to the first scene with the given name.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.ident.name == name)
    }

    /// Removes the first scene with the given name unless it is pinned.
    pub fn remove(&mut self, name: &str) {
        if let Some(pos) = self.scenes.iter().position(|s| s.ident.name == name) {
            if self.scenes[pos].ident.pinned {
                log::debug!("scene '{name}' is pinned; not removed");
                return;
            }
            self.scenes.remove(pos);
        }
    }

    /// Number of loaded scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether no scenes are loaded.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Ticks every loaded scene.
    pub fn update_all(&mut self, dt: Duration) {
        for scene in &mut self.scenes {
            scene.update(dt);
        }
    }
}

impl Default for SceneSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counter(Arc<AtomicUsize>);

    impl Component for Counter {
        fn update(&mut self, _dt: Duration) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    const DT: Duration = Duration::from_millis(16);

    #[test]
    fn update_cascades_through_the_tree() {
        let hits = Arc::new(AtomicUsize::new(0));

        let mut root = GameObject::new(Identity::new("root", 1));
        root.add_component(Box::new(Counter(Arc::clone(&hits))));

        let mut child = GameObject::new(Identity::new("child", 2));
        child.add_component(Box::new(Counter(Arc::clone(&hits))));
        let mut grandchild = GameObject::new(Identity::new("grandchild", 3));
        grandchild.add_component(Box::new(Counter(Arc::clone(&hits))));
        child.add_child(grandchild);
        root.add_child(child);

        let mut scene = Scene::new(Identity::new("level", 10));
        scene.add_object(root);

        scene.update(DT);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        scene.update(DT);
        assert_eq!(hits.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn find_returns_first_match() {
        let mut scene = Scene::new(Identity::new("level", 10));
        let mut first = GameObject::new(Identity::new("prop", 1));
        first.add_component(Box::new(Counter(Arc::new(AtomicUsize::new(0)))));
        scene.add_object(first);
        scene.add_object(GameObject::new(Identity::new("prop", 2)));

        let found = scene.find_object("prop").unwrap();
        assert_eq!(found.ident().id, 1);
        assert_eq!(found.component_count(), 1);
    }

    #[test]
    fn pinned_scene_survives_removal() {
        let mut set = SceneSet::new();
        set.add(Scene::new(Identity::new("boot", 1).pinned()));
        set.add(Scene::new(Identity::new("level", 2)));

        set.remove("boot");
        set.remove("level");

        assert_eq!(set.len(), 1);
        assert!(set.find("boot").is_some());
        assert!(set.find("level").is_none());
    }

    #[test]
    fn set_ids_start_above_the_seed() {
        let mut set = SceneSet::new();
        let scene = set.create("level");
        assert!(scene.ident().id >= SceneSet::ID_SEED);
        let a = set.next_id();
        let b = set.next_id();
        assert!(b > a);
    }
}
