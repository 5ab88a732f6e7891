use crate::ecs::Phase;

/// Registration metadata for one system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemDescriptor {
    name: &'static str,
    phase: Phase,
    priority: i32,
    sequence: u64,
    trailing: bool,
}

impl SystemDescriptor {
    pub(crate) fn new(
        name: &'static str,
        phase: Phase,
        priority: i32,
        sequence: u64,
        trailing: bool,
    ) -> Self {
        Self {
            name,
            phase,
            priority,
            sequence,
            trailing,
        }
    }

    /// System name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Phase the system runs in.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Ordering key within the phase; lower runs first.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Registration order across the whole registry.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Runs after every other system of equal priority, whenever registered.
    pub fn is_trailing(&self) -> bool {
        self.trailing
    }

    pub(crate) fn sort_key(&self) -> (i32, bool) {
        (self.priority, self.trailing)
    }
}
