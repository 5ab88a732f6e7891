// cleanup.rs - Transient entities and the housekeeping system that reaps them

use crate::define_component;
use crate::ecs::component::BUILTIN_COMPONENT_ID_BASE;
use crate::ecs::{CommandBuffer, System, World, WorldError};

/// Tag marking an entity for destruction at the end of the current tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transient;

define_component!(Transient, BUILTIN_COMPONENT_ID_BASE, "Transient");

/// Cleanup-phase system that destroys every `Transient` entity.
///
/// Pre-registered by a default-configured world at the lowest priority.
#[derive(Debug, Default)]
pub struct TransientCleanup;

impl System for TransientCleanup {
    fn on_update(&self, world: &World, commands: &mut CommandBuffer) -> Result<(), WorldError> {
        for entity in world.query().with::<Transient>() {
            commands.destroy_entity(entity.id());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "transient_cleanup"
    }
}
