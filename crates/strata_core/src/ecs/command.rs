//! Deferred structural changes.
//!
//! Systems never touch component storage directly. They append records to a
//! [`CommandBuffer`], and the world plays the buffer back between phases:
//!
//! ```text
//!  System A ──append──┐
//!  System B ──append──┼──► CommandBuffer ──playback──► World
//!  System C ──append──┘    (records + events)
//! ```
//!
//! Playback is strictly sequential in append order. A `CreateEntity` record
//! only learns its id when it is applied, so a producer that needs the id
//! attaches a continuation to the record's [`CommandHandle`].

use crate::ecs::{
    Component, ComponentId, ComponentValue, EntityBuilder, EntityId, Event, World, WorldError,
};
use std::any::Any;
use std::fmt;
use std::mem;
use std::rc::Rc;

/// Callback run right after its record is applied, with the resolved entity id.
pub type Continuation = Rc<dyn Fn(&mut World, EntityId) -> Result<(), WorldError>>;

/// One structural-change request.
#[derive(Clone, Debug)]
pub enum Command {
    /// Mint a fresh entity and attach the initial components.
    CreateEntity { components: Vec<ComponentValue> },

    /// Destroy an entity together with all its components.
    DestroyEntity { entity: EntityId },

    /// Strict insert; fails if the component is already present.
    AddComponent {
        entity: EntityId,
        value: ComponentValue,
    },

    /// Insert or overwrite.
    SetComponent {
        entity: EntityId,
        value: ComponentValue,
    },

    /// Remove a component by tag. Absent components are ignored.
    RemoveComponent {
        entity: EntityId,
        component: ComponentId,
    },
}

impl Command {
    /// Target entity, `None` for `CreateEntity` until playback resolves it.
    pub fn target(&self) -> Option<EntityId> {
        match self {
            Command::CreateEntity { .. } => None,
            Command::DestroyEntity { entity }
            | Command::AddComponent { entity, .. }
            | Command::SetComponent { entity, .. }
            | Command::RemoveComponent { entity, .. } => Some(*entity),
        }
    }

    /// Apply to `world`, returning the entity the command resolved to.
    pub fn apply(self, world: &mut World) -> Result<EntityId, WorldError> {
        match self {
            Command::CreateEntity { components } => world.spawn_values(components),
            Command::DestroyEntity { entity } => {
                world.destroy_entity(entity)?;
                Ok(entity)
            }
            Command::AddComponent { entity, value } => {
                world.add_component_dyn(entity, value)?;
                Ok(entity)
            }
            Command::SetComponent { entity, value } => {
                world.set_component_dyn(entity, value)?;
                Ok(entity)
            }
            Command::RemoveComponent { entity, component } => {
                world.remove_component_dyn(entity, component)?;
                Ok(entity)
            }
        }
    }
}

#[derive(Clone)]
struct CommandRecord {
    command: Command,
    continuations: Vec<Continuation>,
}

/// Ordered log of commands plus the events to flush with them.
#[derive(Clone, Default)]
pub struct CommandBuffer {
    records: Vec<CommandRecord>,
    events: Vec<Event>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw command.
    pub fn push(&mut self, command: Command) -> CommandHandle<'_> {
        let index = self.records.len();
        self.records.push(CommandRecord {
            command,
            continuations: Vec::new(),
        });
        CommandHandle {
            buffer: self,
            index,
        }
    }

    pub fn create_entity(&mut self) -> CommandHandle<'_> {
        self.push(Command::CreateEntity {
            components: Vec::new(),
        })
    }

    /// Create an entity carrying the builder's components.
    pub fn create_entity_with(&mut self, builder: EntityBuilder) -> CommandHandle<'_> {
        self.push(Command::CreateEntity {
            components: builder.into_values(),
        })
    }

    pub fn destroy_entity(&mut self, entity: EntityId) -> CommandHandle<'_> {
        self.push(Command::DestroyEntity { entity })
    }

    pub fn add_component<T: Component>(&mut self, entity: EntityId, value: T) -> CommandHandle<'_> {
        self.add_component_dyn(entity, ComponentValue::new(value))
    }

    pub fn add_component_dyn(&mut self, entity: EntityId, value: ComponentValue) -> CommandHandle<'_> {
        self.push(Command::AddComponent { entity, value })
    }

    pub fn set_component<T: Component>(&mut self, entity: EntityId, value: T) -> CommandHandle<'_> {
        self.set_component_dyn(entity, ComponentValue::new(value))
    }

    pub fn set_component_dyn(&mut self, entity: EntityId, value: ComponentValue) -> CommandHandle<'_> {
        self.push(Command::SetComponent { entity, value })
    }

    pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> CommandHandle<'_> {
        self.remove_component_dyn(entity, T::ID)
    }

    pub fn remove_component_dyn(
        &mut self,
        entity: EntityId,
        component: ComponentId,
    ) -> CommandHandle<'_> {
        self.push(Command::RemoveComponent { entity, component })
    }

    /// Queue an event for the next playback.
    pub fn emit<E: Any + Send + Sync>(&mut self, payload: E) {
        self.events.push(Event::new(payload));
    }

    pub fn emit_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Number of queued commands.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if neither commands nor events are queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.events.is_empty()
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> + '_ {
        self.records.iter().map(|record| &record.command)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Append clones of `other`'s commands and events. `other` is left intact.
    pub fn copy_from(&mut self, other: &CommandBuffer) {
        self.records.extend(other.records.iter().cloned());
        self.events.extend(other.events.iter().cloned());
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.events.clear();
    }

    /// Apply every record in append order, then flush the queued events into
    /// the world's tick event list.
    ///
    /// The buffer is empty afterwards whether or not playback succeeded. The
    /// first failing record or continuation aborts the rest of the buffer and
    /// its events are dropped.
    pub fn playback(&mut self, world: &mut World) -> Result<usize, WorldError> {
        let records = mem::take(&mut self.records);
        let events = mem::take(&mut self.events);

        let mut applied = 0;
        for CommandRecord {
            command,
            continuations,
        } in records
        {
            let entity = command.apply(world)?;
            for continuation in &continuations {
                continuation(world, entity)?;
            }
            applied += 1;
        }

        world.finish_playback(applied, events);
        Ok(applied)
    }
}

impl fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("commands", &self.records.len())
            .field("events", &self.events)
            .finish()
    }
}

/// Single-use handle to a freshly appended command.
pub struct CommandHandle<'a> {
    buffer: &'a mut CommandBuffer,
    index: usize,
}

impl<'a> CommandHandle<'a> {
    /// Attach a continuation. Attachments chain and run in attachment order.
    pub fn continue_with<F>(self, continuation: F) -> Self
    where
        F: Fn(&mut World, EntityId) -> Result<(), WorldError> + 'static,
    {
        self.buffer.records[self.index]
            .continuations
            .push(Rc::new(continuation));
        self
    }

    pub fn command(&self) -> &Command {
        &self.buffer.records[self.index].command
    }
}
