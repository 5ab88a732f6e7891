use crate::ecs::Phase;
use thiserror::Error;

/// Errors that can occur while registering a system with the world.
///
/// None of these are fatal: the world logs them and carries on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SystemRegistrationError {
    #[error("system '{name}' is already registered in phase {phase} (requested {requested})")]
    DuplicateSystem {
        name: &'static str,
        phase: Phase,
        requested: Phase,
    },
}
