// pool.rs - Dense per-type component storage
//
// Values, write ticks and owning entities live in three parallel Vecs with no
// gaps. A sparse map goes from entity to dense row. Removal swaps the last row
// into the hole, so every operation is O(1) and rows never carry meaning.

use crate::ecs::{Component, ComponentId, ComponentValue, EntityId, WorldError};
use crate::time::Tick;
use std::any::Any;
use std::collections::HashMap;

/// Storage for every instance of one component type.
#[derive(Debug)]
pub struct ComponentPool<T: Component> {
    values: Vec<T>,
    ticks: Vec<Tick>,
    entities: Vec<EntityId>,
    rows: HashMap<EntityId, usize>,
}

impl<T: Component> ComponentPool<T> {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            ticks: Vec::new(),
            entities: Vec::new(),
            rows: HashMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[inline]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.rows.contains_key(&entity)
    }

    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.rows.get(&entity).map(|&row| &self.values[row])
    }

    /// Permissive read: a clone of the stored value, or `T::default()` if absent.
    pub fn get_or_default(&self, entity: EntityId) -> T
    where
        T: Default,
    {
        self.get(entity).cloned().unwrap_or_default()
    }

    /// Tick of the last write, `None` if `entity` has no entry.
    pub fn tick_of(&self, entity: EntityId) -> Option<Tick> {
        self.rows.get(&entity).map(|&row| self.ticks[row])
    }

    /// Insert a new entry. Fails if `entity` already has one.
    pub fn add(&mut self, entity: EntityId, value: T, tick: Tick) -> Result<(), WorldError> {
        if self.contains(entity) {
            return Err(WorldError::DuplicateComponent {
                entity,
                component: T::NAME,
            });
        }
        self.push(entity, value, tick);
        Ok(())
    }

    /// Insert or overwrite. Returns `true` if a new entry was created.
    pub fn set(&mut self, entity: EntityId, value: T, tick: Tick) -> bool {
        match self.rows.get(&entity) {
            Some(&row) => {
                self.values[row] = value;
                self.ticks[row] = tick;
                false
            }
            None => {
                self.push(entity, value, tick);
                true
            }
        }
    }

    /// Remove via swap-with-last. No-op if absent.
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        let row = self.rows.remove(&entity)?;
        let last = self.entities.len() - 1;

        self.entities.swap_remove(row);
        self.ticks.swap_remove(row);
        let value = self.values.swap_remove(row);

        if row != last {
            let moved = self.entities[row];
            self.rows.insert(moved, row);
        }
        Some(value)
    }

    /// Owning entities in dense order.
    #[inline]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T, Tick)> + '_ {
        self.entities
            .iter()
            .zip(&self.values)
            .zip(&self.ticks)
            .map(|((&entity, value), &tick)| (entity, value, tick))
    }

    /// Entities whose entry was written after `since`.
    pub fn changed_since(&self, since: Tick) -> impl Iterator<Item = EntityId> + '_ {
        self.entities
            .iter()
            .zip(&self.ticks)
            .filter(move |&(_, &tick)| tick > since)
            .map(|(&entity, _)| entity)
    }

    fn push(&mut self, entity: EntityId, value: T, tick: Tick) {
        self.rows.insert(entity, self.entities.len());
        self.entities.push(entity);
        self.values.push(value);
        self.ticks.push(tick);
    }

    fn take_value(value: ComponentValue) -> Result<T, WorldError> {
        value.into_typed::<T>().map_err(|_| WorldError::TypeMismatch {
            id: T::ID,
            component: T::NAME,
        })
    }
}

impl<T: Component> Default for ComponentPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Tag-addressed access to a pool whose element type is not known statically.
pub trait ErasedPool: Any {
    fn component_id(&self) -> ComponentId;

    fn component_name(&self) -> &'static str;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, entity: EntityId) -> bool;

    fn tick_of(&self, entity: EntityId) -> Option<Tick>;

    fn entities(&self) -> &[EntityId];

    fn get_any(&self, entity: EntityId) -> Option<&dyn Any>;

    /// Strict insert; rejects payloads of the wrong runtime type.
    fn add_any(&mut self, entity: EntityId, value: ComponentValue, tick: Tick)
        -> Result<(), WorldError>;

    /// Upsert; rejects payloads of the wrong runtime type.
    fn set_any(&mut self, entity: EntityId, value: ComponentValue, tick: Tick)
        -> Result<(), WorldError>;

    /// Returns `true` if an entry was removed.
    fn remove_entity(&mut self, entity: EntityId) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedPool for ComponentPool<T> {
    fn component_id(&self) -> ComponentId {
        T::ID
    }

    fn component_name(&self) -> &'static str {
        T::NAME
    }

    fn len(&self) -> usize {
        ComponentPool::len(self)
    }

    fn contains(&self, entity: EntityId) -> bool {
        ComponentPool::contains(self, entity)
    }

    fn tick_of(&self, entity: EntityId) -> Option<Tick> {
        ComponentPool::tick_of(self, entity)
    }

    fn entities(&self) -> &[EntityId] {
        ComponentPool::entities(self)
    }

    fn get_any(&self, entity: EntityId) -> Option<&dyn Any> {
        self.get(entity).map(|value| value as &dyn Any)
    }

    fn add_any(
        &mut self,
        entity: EntityId,
        value: ComponentValue,
        tick: Tick,
    ) -> Result<(), WorldError> {
        let value = Self::take_value(value)?;
        self.add(entity, value, tick)
    }

    fn set_any(
        &mut self,
        entity: EntityId,
        value: ComponentValue,
        tick: Tick,
    ) -> Result<(), WorldError> {
        let value = Self::take_value(value)?;
        self.set(entity, value, tick);
        Ok(())
    }

    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_component;

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Health {
        value: i32,
    }
    define_component!(Health, 1000, "Health");

    fn e(raw: u64) -> EntityId {
        EntityId::from_raw(raw)
    }

    #[test]
    fn add_then_get_and_duplicate_add_fails() {
        let mut pool = ComponentPool::<Health>::new();
        pool.add(e(1), Health { value: 10 }, 3).unwrap();

        assert!(pool.contains(e(1)));
        assert_eq!(pool.get(e(1)), Some(&Health { value: 10 }));
        assert_eq!(pool.tick_of(e(1)), Some(3));

        let err = pool.add(e(1), Health { value: 99 }, 4).unwrap_err();
        assert_eq!(
            err,
            WorldError::DuplicateComponent {
                entity: e(1),
                component: "Health"
            }
        );
        assert_eq!(pool.get(e(1)), Some(&Health { value: 10 }));

        assert!(!pool.set(e(1), Health { value: 20 }, 5));
        assert_eq!(pool.get(e(1)), Some(&Health { value: 20 }));
        assert_eq!(pool.tick_of(e(1)), Some(5));
    }

    #[test]
    fn absent_reads_are_permissive_or_none() {
        let pool = ComponentPool::<Health>::new();
        assert_eq!(pool.get(e(7)), None);
        assert_eq!(pool.get_or_default(e(7)), Health::default());
        assert_eq!(pool.tick_of(e(7)), None);
    }

    #[test]
    fn swap_remove_keeps_other_entries_intact() {
        let mut pool = ComponentPool::<Health>::new();
        for raw in 1..=5 {
            pool.add(e(raw), Health { value: raw as i32 * 10 }, raw).unwrap();
        }

        // Remove from the middle: entity 5 moves into row 1.
        assert_eq!(pool.remove(e(2)), Some(Health { value: 20 }));
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.entities(), &[e(1), e(5), e(3), e(4)]);

        for raw in [1, 3, 4, 5] {
            assert!(pool.contains(e(raw)));
            assert_eq!(pool.get(e(raw)), Some(&Health { value: raw as i32 * 10 }));
            assert_eq!(pool.tick_of(e(raw)), Some(raw));
        }
        assert!(!pool.contains(e(2)));

        // Remove the last row: no move needed.
        assert_eq!(pool.remove(e(4)), Some(Health { value: 40 }));
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(e(5)), Some(&Health { value: 50 }));

        // Absent removal is a no-op.
        assert_eq!(pool.remove(e(2)), None);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn changed_since_is_strictly_after() {
        let mut pool = ComponentPool::<Health>::new();
        pool.add(e(1), Health { value: 1 }, 5).unwrap();
        pool.add(e(2), Health { value: 2 }, 3).unwrap();

        assert_eq!(pool.changed_since(4).collect::<Vec<_>>(), vec![e(1)]);
        assert!(pool.changed_since(5).next().is_none());
        assert_eq!(pool.changed_since(0).count(), 2);
    }

    #[test]
    fn erased_writes_reject_mismatched_payloads() {
        let mut pool: Box<dyn ErasedPool> = Box::new(ComponentPool::<Health>::new());
        let bogus = ComponentValue::from_boxed(Health::ID, Box::new(3.5_f32));

        let err = pool.add_any(e(1), bogus.clone(), 1).unwrap_err();
        assert_eq!(
            err,
            WorldError::TypeMismatch {
                id: Health::ID,
                component: "Health"
            }
        );
        assert!(pool.set_any(e(1), bogus, 1).is_err());
        assert!(pool.is_empty());

        pool.set_any(e(1), ComponentValue::new(Health { value: 4 }), 2)
            .unwrap();
        let stored = pool.get_any(e(1)).and_then(|v| v.downcast_ref::<Health>());
        assert_eq!(stored, Some(&Health { value: 4 }));
        assert_eq!(pool.tick_of(e(1)), Some(2));
        assert!(pool.remove_entity(e(1)));
        assert!(!pool.remove_entity(e(1)));
    }
}
