use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

/// Handle referencing a host entity. Stale handles (after a despawn) never
/// alias the entity that later reuses the same slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub const fn index(self) -> u32 {
        self.index
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Default)]
struct Slot {
    generation: u32,
    alive: bool,
    /// Spawn sequence of the current occupant.
    spawned: u64,
}

/// Marker trait for types that can be stored as components.
pub trait Component: Any + Send + Sync {}

impl<T: Any + Send + Sync> Component for T {}

trait ErasedColumn: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn evict(&mut self, spawned: u64);
}

// Keyed by spawn sequence, so iteration follows spawn order even after a
// slot index is reused.
struct Column<T: Component> {
    rows: BTreeMap<u64, (Entity, T)>,
}

impl<T: Component> Default for Column<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Component> ErasedColumn for Column<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn evict(&mut self, spawned: u64) {
        self.rows.remove(&spawned);
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EcsError {
    #[error("entity {0} is not alive in this world")]
    NoSuchEntity(Entity),
}

/// Entity slots plus one typed column per component type.
#[derive(Default)]
pub struct World {
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_spawn: u64,
    columns: HashMap<TypeId, Box<dyn ErasedColumn>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> Entity {
        let spawned = self.next_spawn;
        self.next_spawn += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.alive = true;
                slot.spawned = spawned;
                Entity::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    alive: true,
                    spawned,
                });
                Entity::new(index, 0)
            }
        }
    }

    pub fn despawn(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.ensure_alive(entity)?;
        let slot = &mut self.slots[entity.index as usize];
        slot.alive = false;
        slot.generation = slot.generation.wrapping_add(1);
        let spawned = slot.spawned;
        for column in self.columns.values_mut() {
            column.evict(spawned);
        }
        self.free.push(entity.index);
        Ok(())
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.index as usize)
            .is_some_and(|slot| slot.alive && slot.generation == entity.generation)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.alive).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn insert<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<Option<T>, EcsError> {
        let spawned = self
            .spawn_sequence(entity)
            .ok_or(EcsError::NoSuchEntity(entity))?;
        let previous = self
            .column_mut_or_default::<T>()
            .rows
            .insert(spawned, (entity, component));
        Ok(previous.map(|(_, component)| component))
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        let spawned = self.spawn_sequence(entity)?;
        self.column::<T>()?
            .rows
            .get(&spawned)
            .map(|(_, value)| value)
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let spawned = self.spawn_sequence(entity)?;
        self.column_mut::<T>()?
            .rows
            .get_mut(&spawned)
            .map(|(_, value)| value)
    }

    /// All `(entity, component)` pairs of one type, in spawn order.
    pub fn query<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.column::<T>()
            .into_iter()
            .flat_map(|column| column.rows.values())
            .map(|(entity, value)| (*entity, value))
    }

    fn spawn_sequence(&self, entity: Entity) -> Option<u64> {
        self.contains(entity)
            .then(|| self.slots[entity.index as usize].spawned)
    }

    fn ensure_alive(&self, entity: Entity) -> Result<(), EcsError> {
        if self.contains(entity) {
            Ok(())
        } else {
            Err(EcsError::NoSuchEntity(entity))
        }
    }

    fn column<T: Component>(&self) -> Option<&Column<T>> {
        self.columns
            .get(&TypeId::of::<T>())
            .and_then(|column| column.as_any().downcast_ref::<Column<T>>())
    }

    fn column_mut<T: Component>(&mut self) -> Option<&mut Column<T>> {
        self.columns
            .get_mut(&TypeId::of::<T>())
            .and_then(|column| column.as_any_mut().downcast_mut::<Column<T>>())
    }

    fn column_mut_or_default<T: Component>(&mut self) -> &mut Column<T> {
        self.columns
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Column::<T>::default()))
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .expect("column registered under its own TypeId")
    }
}
