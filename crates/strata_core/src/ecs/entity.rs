//! Entity identifiers and read views
//!
//! Entities are plain 8-byte ids minted by the World. Ids increase
//! monotonically and are never reused within a process run, so no
//! generation counter is needed to detect stale handles: a destroyed id
//! simply stops being alive.

use crate::ecs::{Component, World};
use crate::time::Tick;
use std::fmt;

/// Opaque entity handle.
///
/// Two values are reserved and never handed out for live entities:
/// [`EntityId::NULL`] (`0`) and [`EntityId::INVALID`] (`u64::MAX`).
/// Ids from different worlds are not comparable in any meaningful way.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    /// "No entity" sentinel.
    pub const NULL: EntityId = EntityId(0);

    /// "Broken reference" sentinel.
    pub const INVALID: EntityId = EntityId(u64::MAX);

    /// First id a world hands out.
    pub(crate) const FIRST: EntityId = EntityId(1);

    /// Wrap a raw value (for tooling and tests).
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Whether the value lies in the range used for live allocations.
    pub const fn is_live_range(self) -> bool {
        self.0 != Self::NULL.0 && self.0 != Self::INVALID.0
    }

    pub(crate) fn next(self) -> EntityId {
        EntityId(self.0 + 1)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NULL => f.write_str("#null"),
            Self::INVALID => f.write_str("#invalid"),
            Self(raw) => write!(f, "#{raw}"),
        }
    }
}

/// Read view pairing an id with the world it lives in.
///
/// Bound to the world borrow: the view cannot outlive the phase in which a
/// query produced it.
#[derive(Clone, Copy)]
pub struct Entity<'w> {
    id: EntityId,
    world: &'w World,
}

impl<'w> Entity<'w> {
    pub(crate) fn new(id: EntityId, world: &'w World) -> Self {
        Self { id, world }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn get<T: Component>(&self) -> Option<&'w T> {
        self.world.components().get::<T>(self.id)
    }

    pub fn has<T: Component>(&self) -> bool {
        self.world.components().has::<T>(self.id)
    }

    /// Tick of the last write to `T`, `None` if absent.
    pub fn tick_of<T: Component>(&self) -> Option<Tick> {
        self.world.components().tick_of::<T>(self.id)
    }
}

impl fmt::Debug for Entity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Entity").field(&self.id).finish()
    }
}
