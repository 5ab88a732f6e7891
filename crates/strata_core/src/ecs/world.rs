// world.rs - Entity store, system scheduler and the six-phase tick loop

use crate::ecs::{
    Blueprint, CommandBuffer, Component, ComponentId, ComponentRegistry, ComponentValue, Entity,
    EntityBuilder, EntityId, Event, Phase, PlaybackResult, QueryBuilder, System, SystemDescriptor,
    SystemEntry, SystemRegistry, TransientCleanup, WorldError,
};
use crate::time::{SimulationClock, Tick};
use crate::WorldConfig;
use std::any::Any;
use std::collections::BTreeSet;
use std::mem;
use std::time::Duration;
use strata_metrics::{Counter, SystemProfiler};
use tracing::{debug, error, trace};

/// The main ECS world: live entities, component pools, systems and the tick.
///
/// Direct mutation methods exist for setup code and continuations. During
/// `update` systems only see `&World` and write through the command buffer.
pub struct World {
    config: WorldConfig,
    clock: SimulationClock,
    next_entity: EntityId,
    alive: BTreeSet<EntityId>,
    components: ComponentRegistry,
    systems: SystemRegistry,
    commands: CommandBuffer,
    incoming: CommandBuffer,
    events: Vec<Event>,
    profiler: SystemProfiler,
    counters: Counter,
}

impl World {
    /// Create a world with the default configuration.
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    pub fn with_config(config: WorldConfig) -> Self {
        let mut world = Self {
            clock: SimulationClock::new(config.tick_rate_hz),
            next_entity: EntityId::FIRST,
            alive: BTreeSet::new(),
            components: ComponentRegistry::new(),
            systems: SystemRegistry::new(),
            commands: CommandBuffer::new(),
            incoming: CommandBuffer::new(),
            events: Vec::new(),
            profiler: SystemProfiler::new(),
            counters: Counter::new(),
            config,
        };

        if world.config.transient_cleanup {
            let priority = world.config.cleanup_priority;
            // first registration on an empty registry, cannot collide
            let _ = world
                .systems
                .register_trailing(Phase::Cleanup, TransientCleanup, priority);
        }
        world
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    /// Create an empty entity.
    pub fn create_entity(&mut self) -> EntityId {
        let entity = self.mint();
        self.counters.increment("entities.created", 1);
        entity
    }

    /// Create an entity with the builder's components.
    ///
    /// Nothing is left behind on failure; the id is burned.
    pub fn spawn(&mut self, builder: EntityBuilder) -> Result<EntityId, WorldError> {
        self.spawn_values(builder.into_values())
    }

    pub(crate) fn spawn_values(
        &mut self,
        components: Vec<ComponentValue>,
    ) -> Result<EntityId, WorldError> {
        let entity = self.mint();
        let tick = self.tick();
        for value in components {
            if let Err(err) = self.components.add_dyn(entity, value, tick) {
                self.components.remove_all(entity);
                self.alive.remove(&entity);
                return Err(err);
            }
        }
        self.counters.increment("entities.created", 1);
        Ok(entity)
    }

    /// Destroy an entity and every component it carries.
    pub fn destroy_entity(&mut self, entity: EntityId) -> Result<(), WorldError> {
        if !self.alive.remove(&entity) {
            return Err(WorldError::UnknownEntity { entity });
        }
        self.components.remove_all(entity);
        self.counters.increment("entities.destroyed", 1);
        Ok(())
    }

    #[inline]
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.alive.contains(&entity)
    }

    /// Read view of a live entity.
    pub fn entity(&self, entity: EntityId) -> Option<Entity<'_>> {
        self.is_alive(entity).then(|| Entity::new(entity, self))
    }

    /// Live entity ids in ascending order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.alive.iter().copied()
    }

    pub fn entity_count(&self) -> usize {
        self.alive.len()
    }

    pub(crate) fn live_entities(&self) -> &BTreeSet<EntityId> {
        &self.alive
    }

    fn mint(&mut self) -> EntityId {
        let entity = self.next_entity;
        self.next_entity = entity.next();
        self.alive.insert(entity);
        entity
    }

    fn ensure_alive(&self, entity: EntityId) -> Result<(), WorldError> {
        if self.is_alive(entity) {
            Ok(())
        } else {
            Err(WorldError::UnknownEntity { entity })
        }
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Attach `value`. Fails if the entity already has a `T`.
    pub fn add_component<T: Component>(&mut self, entity: EntityId, value: T) -> Result<(), WorldError> {
        self.ensure_alive(entity)?;
        self.components.add(entity, value, self.clock.tick())
    }

    pub fn add_component_dyn(
        &mut self,
        entity: EntityId,
        value: ComponentValue,
    ) -> Result<(), WorldError> {
        self.ensure_alive(entity)?;
        self.components.add_dyn(entity, value, self.clock.tick())
    }

    /// Insert or overwrite.
    pub fn set_component<T: Component>(&mut self, entity: EntityId, value: T) -> Result<(), WorldError> {
        self.ensure_alive(entity)?;
        self.components.set(entity, value, self.clock.tick())
    }

    pub fn set_component_dyn(
        &mut self,
        entity: EntityId,
        value: ComponentValue,
    ) -> Result<(), WorldError> {
        self.ensure_alive(entity)?;
        self.components.set_dyn(entity, value, self.clock.tick())
    }

    pub fn get_component<T: Component>(&self, entity: EntityId) -> Result<Option<&T>, WorldError> {
        self.ensure_alive(entity)?;
        Ok(self.components.get::<T>(entity))
    }

    /// Permissive read: `T::default()` when the component is absent.
    pub fn get_component_or_default<T: Component + Default>(
        &self,
        entity: EntityId,
    ) -> Result<T, WorldError> {
        self.ensure_alive(entity)?;
        Ok(self.components.get_or_default::<T>(entity))
    }

    pub fn get_component_dyn(
        &self,
        entity: EntityId,
        component: ComponentId,
    ) -> Result<Option<&dyn Any>, WorldError> {
        self.ensure_alive(entity)?;
        Ok(self.components.get_dyn(entity, component))
    }

    pub fn has_component<T: Component>(&self, entity: EntityId) -> Result<bool, WorldError> {
        self.ensure_alive(entity)?;
        Ok(self.components.has::<T>(entity))
    }

    pub fn has_component_dyn(
        &self,
        entity: EntityId,
        component: ComponentId,
    ) -> Result<bool, WorldError> {
        self.ensure_alive(entity)?;
        Ok(self.components.has_dyn(entity, component))
    }

    /// Tick of the last write to `T` on `entity`.
    pub fn component_tick<T: Component>(&self, entity: EntityId) -> Result<Option<Tick>, WorldError> {
        self.ensure_alive(entity)?;
        Ok(self.components.tick_of::<T>(entity))
    }

    /// Detach and return `T`. Absent components yield `Ok(None)`.
    pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> Result<Option<T>, WorldError> {
        self.ensure_alive(entity)?;
        Ok(self.components.remove::<T>(entity))
    }

    pub fn remove_component_dyn(
        &mut self,
        entity: EntityId,
        component: ComponentId,
    ) -> Result<bool, WorldError> {
        self.ensure_alive(entity)?;
        Ok(self.components.remove_dyn(entity, component))
    }

    /// Let `blueprint` build and attach one component to `entity`.
    pub fn instantiate(
        &mut self,
        entity: EntityId,
        blueprint: &dyn Blueprint,
    ) -> Result<ComponentValue, WorldError> {
        self.ensure_alive(entity)?;
        blueprint.instantiate(self, entity)
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }

    // ------------------------------------------------------------------
    // Systems
    // ------------------------------------------------------------------

    /// Register a system. Returns `false` if its type is already registered.
    pub fn add_system<S: System>(&mut self, phase: Phase, system: S, priority: i32) -> bool {
        self.systems.register(phase, system, priority).is_ok()
    }

    pub fn remove_system<S: System>(&mut self) -> Option<SystemDescriptor> {
        self.systems.unregister::<S>()
    }

    pub fn system<S: System>(&self) -> Option<&S> {
        self.systems.get::<S>()
    }

    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    // ------------------------------------------------------------------
    // Tick loop
    // ------------------------------------------------------------------

    /// Commands queued here are applied during the next `update`, as if
    /// issued at the start of its Input phase.
    pub fn incoming_commands(&mut self) -> &mut CommandBuffer {
        &mut self.incoming
    }

    /// Events flushed so far in the current (or last completed) tick.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Current tick; 0 until the first `update`.
    #[inline]
    pub fn tick(&self) -> Tick {
        self.clock.tick()
    }

    /// Simulated time covered by the ticks run so far.
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn profiler(&self) -> &SystemProfiler {
        &self.profiler
    }

    pub fn counters(&self) -> &Counter {
        &self.counters
    }

    /// Run one tick: every phase in order, each followed by playback.
    ///
    /// The first error aborts the tick. Commands still queued at that point
    /// are discarded.
    pub fn update(&mut self) -> Result<PlaybackResult, WorldError> {
        let tick = self.clock.advance_tick();
        self.events.clear();
        self.counters.increment("ticks", 1);

        let mut buffer = mem::take(&mut self.commands);
        buffer.copy_from(&self.incoming);
        self.incoming.clear();
        debug!(tick, queued = buffer.len(), "tick started");

        let outcome = self.run_phases(&mut buffer);
        buffer.clear();
        self.commands = buffer;

        if let Err((phase, err)) = outcome {
            error!(tick, phase = %phase, error = %err, "update aborted");
            return Err(err);
        }

        debug!(tick, events = self.events.len(), "tick finished");
        Ok(PlaybackResult {
            tick,
            events: self.events.clone(),
        })
    }

    fn run_phases(&mut self, buffer: &mut CommandBuffer) -> Result<(), (Phase, WorldError)> {
        for phase in Phase::ALL {
            let systems = self.systems.systems_for(phase).to_vec();

            let mut profiler = mem::take(&mut self.profiler);
            let ran = self.run_systems(&systems, buffer, &mut profiler);
            self.profiler = profiler;
            ran.map_err(|err| (phase, err))?;

            let events = buffer.events().len();
            let applied = buffer.playback(self).map_err(|err| (phase, err))?;
            debug!(phase = %phase, applied, events, "phase played back");
        }
        Ok(())
    }

    fn run_systems(
        &self,
        systems: &[SystemEntry],
        commands: &mut CommandBuffer,
        profiler: &mut SystemProfiler,
    ) -> Result<(), WorldError> {
        for entry in systems {
            let name = entry.descriptor().name();
            trace!(system = name, "running system");
            profiler.time_system(name, || entry.system().on_update(self, commands))?;
        }
        Ok(())
    }

    pub(crate) fn finish_playback(&mut self, applied: usize, events: Vec<Event>) {
        self.counters.increment("commands.applied", applied);
        self.counters.increment("events.emitted", events.len());
        self.events.extend(events);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
