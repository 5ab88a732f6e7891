//! Entity Component System core types.
//!
//! Components live in dense per-type pools keyed by [`EntityId`] and stamped
//! with the tick of their last write. Systems run in six fixed phases; they
//! read the [`World`] and queue structural changes in a [`CommandBuffer`]
//! that the world plays back at the end of every phase.

mod builder;
mod cleanup;
mod command;
mod component;
mod entity;
mod error;
mod event;
mod phase;
mod pool;
mod query;
mod registry;
mod system;
mod system_descriptor;
mod system_registration_error;
mod system_registry;
mod world;

pub use builder::{Blueprint, ComponentBlueprint, EntityBuilder};
pub use cleanup::{Transient, TransientCleanup};
pub use command::{Command, CommandBuffer, CommandHandle, Continuation};
pub use component::{
    meta_of, meta_of_name, register_component, Component, ComponentId, ComponentMeta,
    ComponentValue, BUILTIN_COMPONENT_ID_BASE,
};
pub use entity::{Entity, EntityId};
pub use error::WorldError;
pub use event::{Event, PlaybackResult};
pub use phase::Phase;
pub use pool::{ComponentPool, ErasedPool};
pub use query::{QueryBuilder, QueryIter, QueryPlan};
pub use registry::ComponentRegistry;
pub use system::System;
pub use system_descriptor::SystemDescriptor;
pub use system_registration_error::SystemRegistrationError;
pub use system_registry::{SystemEntry, SystemRegistry};
pub use world::World;

/// Spawn an entity into the world using builder-style component construction.
///
/// Evaluates to `Result<EntityId, WorldError>`.
#[macro_export]
macro_rules! spawn {
    ($world:expr $(, $component:expr)+ $(,)?) => {{
        let builder = {
            let mut builder = $crate::ecs::EntityBuilder::new();
            $(
                builder = builder.with($component);
            )+
            builder
        };
        $world.spawn(builder)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_component;

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Position(i32, i32);
    define_component!(Position, 1600, "Position");

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Facing(u8);
    define_component!(Facing, 1601, "Facing");

    #[test]
    fn spawn_macro_attaches_every_component() {
        let mut world = World::with_config(crate::WorldConfig::bare());
        let entity = crate::spawn!(world, Position(1, 2), Facing(3)).unwrap();

        let view = world.entity(entity).unwrap();
        assert_eq!(view.get::<Position>(), Some(&Position(1, 2)));
        assert_eq!(view.get::<Facing>(), Some(&Facing(3)));
        assert_eq!(view.tick_of::<Facing>(), Some(0));
    }
}
