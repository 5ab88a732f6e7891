// registry.rs - One pool per component type
//
// Typed calls find their pool through `T::ID` and downcast it; tag-addressed
// calls go through the `ErasedPool` capability. Pools are created on first
// write, from the value's own metadata when it is typed, otherwise from the
// global component registry.

use crate::ecs::component::{meta_of, register_component};
use crate::ecs::pool::{ComponentPool, ErasedPool};
use crate::ecs::{Component, ComponentId, ComponentValue, EntityId, WorldError};
use crate::time::Tick;
use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Owns every component pool of a world.
#[derive(Default)]
pub struct ComponentRegistry {
    pools: HashMap<ComponentId, Box<dyn ErasedPool>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            pools: HashMap::new(),
        }
    }

    /// Typed pool for `T`, if one has been created.
    pub fn pool<T: Component>(&self) -> Option<&ComponentPool<T>> {
        self.pools
            .get(&T::ID)?
            .as_any()
            .downcast_ref::<ComponentPool<T>>()
    }

    /// Pool for a tag, if one has been created.
    pub fn pool_dyn(&self, id: ComponentId) -> Option<&dyn ErasedPool> {
        self.pools.get(&id).map(|pool| pool.as_ref())
    }

    /// Number of entries in the pool for `id`, `None` if there is no pool.
    pub fn len_of(&self, id: ComponentId) -> Option<usize> {
        self.pools.get(&id).map(|pool| pool.len())
    }

    /// Number of pools created so far.
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.pools.keys().copied()
    }

    // ------------------------------------------------------------------
    // Typed access
    // ------------------------------------------------------------------

    pub fn add<T: Component>(
        &mut self,
        entity: EntityId,
        value: T,
        tick: Tick,
    ) -> Result<(), WorldError> {
        self.pool_mut::<T>()?.add(entity, value, tick)
    }

    pub fn set<T: Component>(
        &mut self,
        entity: EntityId,
        value: T,
        tick: Tick,
    ) -> Result<(), WorldError> {
        self.pool_mut::<T>()?.set(entity, value, tick);
        Ok(())
    }

    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.pool::<T>()?.get(entity)
    }

    pub fn get_or_default<T: Component + Default>(&self, entity: EntityId) -> T {
        self.get::<T>(entity).cloned().unwrap_or_default()
    }

    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        self.has_dyn(entity, T::ID)
    }

    pub fn tick_of<T: Component>(&self, entity: EntityId) -> Option<Tick> {
        self.tick_of_dyn(entity, T::ID)
    }

    pub fn remove<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        self.pools
            .get_mut(&T::ID)?
            .as_any_mut()
            .downcast_mut::<ComponentPool<T>>()?
            .remove(entity)
    }

    // ------------------------------------------------------------------
    // Tag-addressed access
    // ------------------------------------------------------------------

    pub fn add_dyn(
        &mut self,
        entity: EntityId,
        value: ComponentValue,
        tick: Tick,
    ) -> Result<(), WorldError> {
        self.pool_for_value(&value)?.add_any(entity, value, tick)
    }

    pub fn set_dyn(
        &mut self,
        entity: EntityId,
        value: ComponentValue,
        tick: Tick,
    ) -> Result<(), WorldError> {
        self.pool_for_value(&value)?.set_any(entity, value, tick)
    }

    pub fn get_dyn(&self, entity: EntityId, id: ComponentId) -> Option<&dyn Any> {
        self.pools.get(&id)?.get_any(entity)
    }

    pub fn has_dyn(&self, entity: EntityId, id: ComponentId) -> bool {
        self.pools
            .get(&id)
            .is_some_and(|pool| pool.contains(entity))
    }

    pub fn tick_of_dyn(&self, entity: EntityId, id: ComponentId) -> Option<Tick> {
        self.pools.get(&id)?.tick_of(entity)
    }

    /// Returns `true` if an entry was removed.
    pub fn remove_dyn(&mut self, entity: EntityId, id: ComponentId) -> bool {
        self.pools
            .get_mut(&id)
            .is_some_and(|pool| pool.remove_entity(entity))
    }

    /// Drop every component `entity` carries. Returns how many were removed.
    pub fn remove_all(&mut self, entity: EntityId) -> usize {
        self.pools
            .values_mut()
            .filter_map(|pool| pool.remove_entity(entity).then_some(()))
            .count()
    }

    fn pool_mut<T: Component>(&mut self) -> Result<&mut ComponentPool<T>, WorldError> {
        let pool = self.pools.entry(T::ID).or_insert_with(|| {
            T::ensure_registered();
            Box::new(ComponentPool::<T>::new())
        });
        pool.as_any_mut()
            .downcast_mut::<ComponentPool<T>>()
            .ok_or(WorldError::TypeMismatch {
                id: T::ID,
                component: T::NAME,
            })
    }

    fn pool_for_value(
        &mut self,
        value: &ComponentValue,
    ) -> Result<&mut Box<dyn ErasedPool>, WorldError> {
        let id = value.component_id();
        match self.pools.entry(id) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => {
                let meta = match value.meta() {
                    Some(meta) => {
                        register_component(*meta);
                        *meta
                    }
                    None => meta_of(id).ok_or(WorldError::UnregisteredComponent { id })?,
                };
                Ok(slot.insert(meta.new_pool()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_component;

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Position {
        x: i32,
        y: i32,
    }
    define_component!(Position, 1100, "Position");

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Velocity {
        x: i32,
        y: i32,
    }
    define_component!(Velocity, 1101, "Velocity");

    #[derive(Clone, Debug, PartialEq)]
    struct Label(String);
    define_component!(Label, 1102, "Label");

    fn e(raw: u64) -> EntityId {
        EntityId::from_raw(raw)
    }

    #[test]
    fn typed_operations_route_to_their_pool() {
        let mut registry = ComponentRegistry::new();
        registry.add(e(1), Position { x: 1, y: 2 }, 0).unwrap();
        registry.add(e(1), Velocity { x: 3, y: 4 }, 0).unwrap();
        registry.set(e(2), Position { x: 5, y: 6 }, 1).unwrap();

        assert_eq!(registry.pool_count(), 2);
        assert_eq!(registry.len_of(Position::ID), Some(2));
        assert_eq!(registry.get::<Velocity>(e(1)), Some(&Velocity { x: 3, y: 4 }));
        assert!(registry.has::<Position>(e(2)));
        assert!(!registry.has::<Velocity>(e(2)));
        assert_eq!(registry.tick_of::<Position>(e(2)), Some(1));
        assert_eq!(registry.get_or_default::<Velocity>(e(2)), Velocity::default());

        assert_eq!(registry.remove::<Velocity>(e(1)), Some(Velocity { x: 3, y: 4 }));
        assert_eq!(registry.remove::<Velocity>(e(1)), None);
    }

    #[test]
    fn erased_add_creates_pool_from_value_metadata() {
        let mut registry = ComponentRegistry::new();
        registry
            .add_dyn(e(1), ComponentValue::new(Label("crate".into())), 2)
            .unwrap();

        let stored = registry
            .get_dyn(e(1), Label::ID)
            .and_then(|value| value.downcast_ref::<Label>());
        assert_eq!(stored, Some(&Label("crate".into())));
        assert_eq!(registry.tick_of_dyn(e(1), Label::ID), Some(2));

        let err = registry
            .add_dyn(e(1), ComponentValue::new(Label("again".into())), 3)
            .unwrap_err();
        assert!(matches!(err, WorldError::DuplicateComponent { .. }));
    }

    #[test]
    fn erased_add_of_unknown_tag_is_rejected() {
        let mut registry = ComponentRegistry::new();
        let value = ComponentValue::from_boxed(1199, Box::new(1_u32));
        assert_eq!(
            registry.add_dyn(e(1), value, 0),
            Err(WorldError::UnregisteredComponent { id: 1199 })
        );
        assert_eq!(registry.pool_count(), 0);
    }

    #[test]
    fn erased_add_with_wrong_payload_is_a_type_mismatch() {
        let mut registry = ComponentRegistry::new();
        Position::ensure_registered();
        let value = ComponentValue::from_boxed(Position::ID, Box::new(Velocity { x: 0, y: 0 }));

        let err = registry.add_dyn(e(1), value, 0).unwrap_err();
        assert_eq!(
            err,
            WorldError::TypeMismatch {
                id: Position::ID,
                component: "Position"
            }
        );
        assert!(!registry.has::<Position>(e(1)));
    }

    #[test]
    fn remove_all_clears_every_pool() {
        let mut registry = ComponentRegistry::new();
        registry.add(e(1), Position::default(), 0).unwrap();
        registry.add(e(1), Velocity::default(), 0).unwrap();
        registry.add(e(2), Position::default(), 0).unwrap();

        assert_eq!(registry.remove_all(e(1)), 2);
        assert!(!registry.has::<Position>(e(1)));
        assert!(!registry.has::<Velocity>(e(1)));
        assert!(registry.has::<Position>(e(2)));
        assert_eq!(registry.remove_all(e(1)), 0);
        assert!(!registry.remove_dyn(e(2), Velocity::ID));
        assert!(registry.remove_dyn(e(2), Position::ID));
    }
}
