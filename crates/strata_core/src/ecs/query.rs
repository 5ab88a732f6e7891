//! Conjunctive entity queries.
//!
//! A [`QueryBuilder`] accumulates required (`with`), forbidden (`without`)
//! and at most one recency (`with_changed_since`) condition. Iteration picks
//! a single enumeration source up front and filters every candidate against
//! all conditions:
//!
//! 1. a recency condition enumerates that component's pool,
//! 2. otherwise the smallest required pool is used (first one wins ties),
//! 3. with only forbidden components every live entity is scanned,
//! 4. a query with no conditions at all yields nothing.
//!
//! A required component that has no pool yet short-circuits to an empty
//! result without scanning.

use crate::ecs::{Component, ComponentId, Entity, EntityId, World, WorldError};
use crate::time::Tick;
use std::collections::btree_set;
use std::slice;
use tracing::trace;

/// Enumeration source chosen for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPlan {
    /// Nothing to enumerate.
    Empty,
    /// Entries of `component` written after `since`.
    ChangedSince { component: ComponentId, since: Tick },
    /// The required pool with the fewest entries.
    SmallestPool { component: ComponentId, len: usize },
    /// Every live entity.
    AllEntities,
}

/// Declarative filter over component presence, absence and recency.
#[derive(Clone)]
pub struct QueryBuilder<'w> {
    world: &'w World,
    with: Vec<ComponentId>,
    without: Vec<ComponentId>,
    changed: Option<(ComponentId, Tick)>,
}

impl<'w> QueryBuilder<'w> {
    pub(crate) fn new(world: &'w World) -> Self {
        Self {
            world,
            with: Vec::new(),
            without: Vec::new(),
            changed: None,
        }
    }

    pub fn with<T: Component>(self) -> Self {
        self.with_id(T::ID)
    }

    pub fn without<T: Component>(self) -> Self {
        self.without_id(T::ID)
    }

    pub fn with_id(mut self, component: ComponentId) -> Self {
        if !self.with.contains(&component) {
            self.with.push(component);
        }
        self
    }

    pub fn without_id(mut self, component: ComponentId) -> Self {
        if !self.without.contains(&component) {
            self.without.push(component);
        }
        self
    }

    /// Require `T` written strictly after `since`. Implies `with::<T>()`.
    ///
    /// Fails if the query already carries a recency condition.
    pub fn with_changed_since<T: Component>(self, since: Tick) -> Result<Self, WorldError> {
        self.with_changed_since_id(T::ID, since)
    }

    pub fn with_changed_since_id(
        mut self,
        component: ComponentId,
        since: Tick,
    ) -> Result<Self, WorldError> {
        if self.changed.is_some() {
            return Err(WorldError::InvalidQueryConstruction {
                reason: "a query may carry at most one recency condition",
            });
        }
        self.changed = Some((component, since));
        Ok(self.with_id(component))
    }

    /// Source the cost heuristic selects for the current conditions.
    pub fn plan(&self) -> QueryPlan {
        if self.with.is_empty() && self.without.is_empty() {
            return QueryPlan::Empty;
        }

        let components = self.world.components();
        let mut smallest: Option<(ComponentId, usize)> = None;
        for &component in &self.with {
            let Some(len) = components.len_of(component) else {
                return QueryPlan::Empty;
            };
            if smallest.is_none_or(|(_, best)| len < best) {
                smallest = Some((component, len));
            }
        }

        if let Some((component, since)) = self.changed {
            return QueryPlan::ChangedSince { component, since };
        }
        match smallest {
            Some((component, len)) => QueryPlan::SmallestPool { component, len },
            None => QueryPlan::AllEntities,
        }
    }

    /// Lazily yield matching entities.
    pub fn iter(self) -> QueryIter<'w> {
        let plan = self.plan();
        trace!(
            plan = ?plan,
            with = self.with.len(),
            without = self.without.len(),
            "query source selected"
        );

        let source = match plan {
            QueryPlan::Empty => Source::Empty,
            QueryPlan::ChangedSince { component, .. }
            | QueryPlan::SmallestPool { component, .. } => {
                match self.world.components().pool_dyn(component) {
                    Some(pool) => Source::Pool(pool.entities().iter()),
                    None => Source::Empty,
                }
            }
            QueryPlan::AllEntities => Source::Alive(self.world.live_entities().iter()),
        };

        QueryIter {
            world: self.world,
            source,
            with: self.with,
            without: self.without,
            changed: self.changed,
        }
    }

    /// Ids of matching entities, collected.
    pub fn ids(self) -> Vec<EntityId> {
        self.iter().map(|entity| entity.id()).collect()
    }
}

impl<'w> IntoIterator for QueryBuilder<'w> {
    type Item = Entity<'w>;
    type IntoIter = QueryIter<'w>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

enum Source<'w> {
    Empty,
    Pool(slice::Iter<'w, EntityId>),
    Alive(btree_set::Iter<'w, EntityId>),
}

/// Single-pass iterator over the entities matching a query.
pub struct QueryIter<'w> {
    world: &'w World,
    source: Source<'w>,
    with: Vec<ComponentId>,
    without: Vec<ComponentId>,
    changed: Option<(ComponentId, Tick)>,
}

impl<'w> QueryIter<'w> {
    fn matches(&self, entity: EntityId) -> bool {
        let components = self.world.components();
        self.with
            .iter()
            .all(|&component| components.has_dyn(entity, component))
            && !self
                .without
                .iter()
                .any(|&component| components.has_dyn(entity, component))
            && self.changed.is_none_or(|(component, since)| {
                components
                    .tick_of_dyn(entity, component)
                    .is_some_and(|tick| tick > since)
            })
    }
}

impl<'w> Iterator for QueryIter<'w> {
    type Item = Entity<'w>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entity = match &mut self.source {
                Source::Empty => return None,
                Source::Pool(ids) => *ids.next()?,
                Source::Alive(ids) => *ids.next()?,
            };
            if self.matches(entity) {
                return Some(Entity::new(entity, self.world));
            }
        }
    }
}
