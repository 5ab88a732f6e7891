use crate::ecs::{ComponentId, EntityId};
use thiserror::Error;

/// Fatal errors raised by store operations, command playback and queries.
///
/// Any of these aborts the `World::update` call that produced it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorldError {
    #[error("entity {entity} is not alive")]
    UnknownEntity { entity: EntityId },

    #[error("entity {entity} already has component '{component}' (use set instead)")]
    DuplicateComponent {
        entity: EntityId,
        component: &'static str,
    },

    #[error("value supplied for component '{component}' (id {id}) has a different runtime type")]
    TypeMismatch {
        id: ComponentId,
        component: &'static str,
    },

    #[error("component id {id} is not registered")]
    UnregisteredComponent { id: ComponentId },

    #[error("invalid query: {reason}")]
    InvalidQueryConstruction { reason: &'static str },
}
