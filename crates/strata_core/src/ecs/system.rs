// system.rs - Logic units run by the scheduler

use crate::ecs::{CommandBuffer, World, WorldError};
use std::any::Any;

/// A unit of per-tick logic bound to one phase.
///
/// Systems read the world and append to the shared command buffer. They
/// never mutate component storage directly; the world plays the buffer back
/// once every system of the phase has run.
pub trait System: 'static {
    fn on_update(&self, world: &World, commands: &mut CommandBuffer) -> Result<(), WorldError>;

    /// Name used in logs and profiles.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Object-safe view of a stored system that can also be downcast.
pub(crate) trait DynSystem {
    fn as_system(&self) -> &dyn System;

    fn as_any(&self) -> &dyn Any;
}

impl<S: System> DynSystem for S {
    fn as_system(&self) -> &dyn System {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
