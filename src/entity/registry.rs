//! Entity registry - owns every actor and file in the scene.
//!
//! Slots are generational: despawning bumps the slot's generation, so a
//! handle held by a still-running action resolves to `StaleHandle`
//! instead of silently pointing at whatever reused the slot.

use ahash::AHashMap;
use glam::Vec2;

use super::{Actor, FileNode};
use crate::core::error::{Result, VisError};
use crate::core::types::{ActorId, FileId};

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Generational slot storage.
#[derive(Debug, Clone)]
struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Arena<T> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    fn insert(&mut self, value: T) -> (u32, u32) {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return (index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        (index, 0)
    }

    fn get(&self, index: u32, generation: u32) -> Option<&T> {
        self.slots
            .get(index as usize)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.value.as_ref())
    }

    fn get_mut(&mut self, index: u32, generation: u32) -> Option<&mut T> {
        self.slots
            .get_mut(index as usize)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.value.as_mut())
    }

    fn remove(&mut self, index: u32, generation: u32) -> Option<T> {
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.live -= 1;
        Some(value)
    }

    fn has_slot(&self, index: u32) -> bool {
        (index as usize) < self.slots.len()
    }

    fn iter(&self) -> impl Iterator<Item = (u32, u32, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (index as u32, slot.generation, value))
        })
    }
}

/// Owns actors and files, and hands out handles to them.
#[derive(Debug, Clone)]
pub struct Registry {
    actors: Arena<Actor>,
    files: Arena<FileNode>,
    actor_names: AHashMap<String, ActorId>,
    file_paths: AHashMap<String, FileId>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            actors: Arena::new(),
            files: Arena::new(),
            actor_names: AHashMap::new(),
            file_paths: AHashMap::new(),
        }
    }

    pub fn spawn_actor(&mut self, actor: Actor) -> ActorId {
        let name = actor.name.clone();
        let (index, generation) = self.actors.insert(actor);
        let id = ActorId::new(index, generation);
        self.actor_names.insert(name, id);
        id
    }

    pub fn spawn_file(&mut self, file: FileNode) -> FileId {
        let path = file.path.clone();
        let (index, generation) = self.files.insert(file);
        let id = FileId::new(index, generation);
        self.file_paths.insert(path, id);
        id
    }

    pub fn find_actor(&self, name: &str) -> Option<ActorId> {
        self.actor_names.get(name).copied()
    }

    pub fn find_file(&self, path: &str) -> Option<FileId> {
        self.file_paths.get(path).copied()
    }

    pub fn actor(&self, id: ActorId) -> Result<&Actor> {
        self.actors
            .get(id.index, id.generation)
            .ok_or_else(|| self.actor_error(id))
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Result<&mut Actor> {
        if self.actors.get(id.index, id.generation).is_none() {
            return Err(self.actor_error(id));
        }
        self.actors
            .get_mut(id.index, id.generation)
            .ok_or_else(|| VisError::EntityNotFound(id.to_string()))
    }

    pub fn file(&self, id: FileId) -> Result<&FileNode> {
        self.files
            .get(id.index, id.generation)
            .ok_or_else(|| self.file_error(id))
    }

    pub fn file_mut(&mut self, id: FileId) -> Result<&mut FileNode> {
        if self.files.get(id.index, id.generation).is_none() {
            return Err(self.file_error(id));
        }
        self.files
            .get_mut(id.index, id.generation)
            .ok_or_else(|| VisError::EntityNotFound(id.to_string()))
    }

    /// Borrow an actor immutably and a file mutably at the same time.
    pub fn pair_mut(&mut self, actor: ActorId, file: FileId) -> Result<(&Actor, &mut FileNode)> {
        let actor_ref = self
            .actors
            .get(actor.index, actor.generation)
            .ok_or_else(|| stale_or_missing(self.actors.has_slot(actor.index), actor.to_string()))?;
        let file_slot = self.files.has_slot(file.index);
        let file_ref = self
            .files
            .get_mut(file.index, file.generation)
            .ok_or_else(|| stale_or_missing(file_slot, file.to_string()))?;
        Ok((actor_ref, file_ref))
    }

    pub fn despawn_file(&mut self, id: FileId) -> Result<FileNode> {
        let file = self
            .files
            .remove(id.index, id.generation)
            .ok_or_else(|| self.file_error(id))?;
        if self.file_paths.get(&file.path) == Some(&id) {
            self.file_paths.remove(&file.path);
        }
        Ok(file)
    }

    pub fn despawn_actor(&mut self, id: ActorId) -> Result<Actor> {
        let actor = self
            .actors
            .remove(id.index, id.generation)
            .ok_or_else(|| self.actor_error(id))?;
        if self.actor_names.get(&actor.name) == Some(&id) {
            self.actor_names.remove(&actor.name);
        }
        Ok(actor)
    }

    pub fn actors(&self) -> impl Iterator<Item = (ActorId, &Actor)> + '_ {
        self.actors
            .iter()
            .map(|(index, generation, actor)| (ActorId::new(index, generation), actor))
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &FileNode)> + '_ {
        self.files
            .iter()
            .map(|(index, generation, file)| (FileId::new(index, generation), file))
    }

    pub fn actor_count(&self) -> usize {
        self.actors.live
    }

    pub fn file_count(&self) -> usize {
        self.files.live
    }

    fn actor_error(&self, id: ActorId) -> VisError {
        stale_or_missing(self.actors.has_slot(id.index), id.to_string())
    }

    fn file_error(&self, id: FileId) -> VisError {
        stale_or_missing(self.files.has_slot(id.index), id.to_string())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// A handle into a slot that exists is stale; one past the end was never issued.
fn stale_or_missing(slot_exists: bool, handle: String) -> VisError {
    if slot_exists {
        VisError::StaleHandle(handle)
    } else {
        VisError::EntityNotFound(handle)
    }
}

/// Place `count` actors evenly on a ring, the way the demo scene lays them out.
pub fn ring_position(slot: usize, count: usize, radius: f32) -> Vec2 {
    let count = count.max(1);
    let angle = (slot as f32 / count as f32) * std::f32::consts::TAU;
    Vec2::new(angle.cos(), angle.sin()) * radius
}
