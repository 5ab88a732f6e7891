use crate::ecs::system::DynSystem;
use crate::ecs::{Phase, System, SystemDescriptor, SystemRegistrationError};
use once_cell::unsync::OnceCell;
use std::any::TypeId;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, warn};

/// Per-phase, priority-ordered registry of systems.
///
/// Each concrete system type can be registered once. Within a phase systems
/// run by ascending priority; equal priorities keep registration order,
/// except that trailing systems go after their whole priority band.
#[derive(Default)]
pub struct SystemRegistry {
    phases: [PhaseSlot; Phase::COUNT],
    lookup: HashMap<TypeId, Phase>,
    next_sequence: u64,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `system` in `phase`.
    ///
    /// A second registration of the same type is ignored and logged.
    pub fn register<S: System>(
        &mut self,
        phase: Phase,
        system: S,
        priority: i32,
    ) -> Result<(), SystemRegistrationError> {
        self.insert(phase, system, priority, false)
    }

    /// Register `system` so it runs after every system of equal priority,
    /// including ones registered later. Used for world housekeeping.
    pub(crate) fn register_trailing<S: System>(
        &mut self,
        phase: Phase,
        system: S,
        priority: i32,
    ) -> Result<(), SystemRegistrationError> {
        self.insert(phase, system, priority, true)
    }

    fn insert<S: System>(
        &mut self,
        phase: Phase,
        system: S,
        priority: i32,
        trailing: bool,
    ) -> Result<(), SystemRegistrationError> {
        let type_id = TypeId::of::<S>();
        let name = system.name();

        if let Some(&existing) = self.lookup.get(&type_id) {
            warn!(
                system = name,
                phase = %existing,
                requested = %phase,
                "system already registered, ignoring"
            );
            return Err(SystemRegistrationError::DuplicateSystem {
                name,
                phase: existing,
                requested: phase,
            });
        }

        let descriptor = SystemDescriptor::new(name, phase, priority, self.next_sequence, trailing);
        self.next_sequence += 1;
        debug!(system = name, phase = %phase, priority, "system registered");

        self.lookup.insert(type_id, phase);
        self.slot_mut(phase).push(SystemEntry {
            type_id,
            system: Rc::new(system),
            descriptor,
        });
        Ok(())
    }

    /// Remove `S` from whichever phase holds it.
    pub fn unregister<S: System>(&mut self) -> Option<SystemDescriptor> {
        let type_id = TypeId::of::<S>();
        let phase = self.lookup.remove(&type_id)?;
        let entry = self.slot_mut(phase).remove(type_id)?;
        debug!(system = entry.descriptor.name(), phase = %phase, "system unregistered");
        Some(entry.descriptor)
    }

    /// Systems of `phase` in execution order.
    pub fn systems_for(&self, phase: Phase) -> &[SystemEntry] {
        self.phases[phase.index()].ordered()
    }

    /// The registered instance of `S`, if any.
    pub fn get<S: System>(&self) -> Option<&S> {
        let type_id = TypeId::of::<S>();
        let phase = *self.lookup.get(&type_id)?;
        self.phases[phase.index()]
            .systems
            .iter()
            .find(|entry| entry.type_id == type_id)?
            .system
            .as_any()
            .downcast_ref::<S>()
    }

    pub fn phase_of<S: System>(&self) -> Option<Phase> {
        self.lookup.get(&TypeId::of::<S>()).copied()
    }

    pub fn contains<S: System>(&self) -> bool {
        self.lookup.contains_key(&TypeId::of::<S>())
    }

    /// Every registration, phase by phase in execution order.
    pub fn descriptors(&self) -> impl Iterator<Item = &SystemDescriptor> + '_ {
        Phase::ALL
            .into_iter()
            .flat_map(move |phase| self.systems_for(phase))
            .map(SystemEntry::descriptor)
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    fn slot_mut(&mut self, phase: Phase) -> &mut PhaseSlot {
        &mut self.phases[phase.index()]
    }
}

/// A registered system together with its metadata.
#[derive(Clone)]
pub struct SystemEntry {
    type_id: TypeId,
    system: Rc<dyn DynSystem>,
    descriptor: SystemDescriptor,
}

impl SystemEntry {
    pub fn system(&self) -> &dyn System {
        self.system.as_system()
    }

    pub fn descriptor(&self) -> &SystemDescriptor {
        &self.descriptor
    }
}

/// Systems of one phase in registration order plus a lazily sorted copy.
#[derive(Default)]
struct PhaseSlot {
    systems: Vec<SystemEntry>,
    ordered: OnceCell<Vec<SystemEntry>>,
}

impl PhaseSlot {
    fn push(&mut self, entry: SystemEntry) {
        self.systems.push(entry);
        self.ordered.take();
    }

    fn remove(&mut self, type_id: TypeId) -> Option<SystemEntry> {
        let index = self
            .systems
            .iter()
            .position(|entry| entry.type_id == type_id)?;
        self.ordered.take();
        Some(self.systems.remove(index))
    }

    fn ordered(&self) -> &[SystemEntry] {
        self.ordered.get_or_init(|| {
            let mut ordered = self.systems.clone();
            // stable: equal keys keep registration order
            ordered.sort_by_key(|entry| entry.descriptor.sort_key());
            ordered
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{CommandBuffer, World, WorldError};

    struct Tagged<const N: usize>;

    impl<const N: usize> System for Tagged<N> {
        fn on_update(&self, _: &World, _: &mut CommandBuffer) -> Result<(), WorldError> {
            Ok(())
        }
    }

    struct Threshold {
        limit: u32,
    }

    impl System for Threshold {
        fn on_update(&self, _: &World, _: &mut CommandBuffer) -> Result<(), WorldError> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "threshold"
        }
    }

    fn names(registry: &SystemRegistry, phase: Phase) -> Vec<&'static str> {
        registry
            .systems_for(phase)
            .iter()
            .map(|entry| entry.descriptor().name())
            .collect()
    }

    #[test]
    fn ascending_priority_with_stable_ties() {
        let mut registry = SystemRegistry::new();
        registry.register(Phase::Execution, Tagged::<0>, 5).unwrap();
        registry.register(Phase::Execution, Tagged::<1>, -1).unwrap();
        registry.register(Phase::Execution, Tagged::<2>, 5).unwrap();
        registry.register(Phase::Execution, Tagged::<3>, 0).unwrap();
        registry.register(Phase::Input, Tagged::<4>, 0).unwrap();

        let order: Vec<_> = registry
            .systems_for(Phase::Execution)
            .iter()
            .map(|entry| entry.descriptor().sequence())
            .collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
        assert_eq!(registry.systems_for(Phase::Input).len(), 1);
        assert!(registry.systems_for(Phase::Cleanup).is_empty());
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn trailing_system_stays_behind_later_ties() {
        let mut registry = SystemRegistry::new();
        registry.register(Phase::Cleanup, Tagged::<0>, 0).unwrap();
        registry
            .register_trailing(Phase::Cleanup, Tagged::<1>, i32::MAX)
            .unwrap();
        registry.register(Phase::Cleanup, Tagged::<2>, i32::MAX).unwrap();
        registry.register(Phase::Cleanup, Tagged::<3>, i32::MAX).unwrap();

        let order: Vec<_> = registry
            .systems_for(Phase::Cleanup)
            .iter()
            .map(|entry| entry.descriptor().sequence())
            .collect();
        assert_eq!(order, vec![0, 2, 3, 1]);
        assert!(registry.systems_for(Phase::Cleanup)[3].descriptor().is_trailing());
        assert!(!registry.systems_for(Phase::Cleanup)[0].descriptor().is_trailing());
    }

    #[test]
    fn cache_is_rebuilt_after_changes() {
        let mut registry = SystemRegistry::new();
        registry.register(Phase::Reaction, Tagged::<0>, 10).unwrap();
        assert_eq!(registry.systems_for(Phase::Reaction).len(), 1);

        registry.register(Phase::Reaction, Threshold { limit: 3 }, 0).unwrap();
        assert_eq!(names(&registry, Phase::Reaction)[0], "threshold");

        registry.unregister::<Threshold>().unwrap();
        assert_eq!(registry.systems_for(Phase::Reaction).len(), 1);
        assert!(!registry.contains::<Threshold>());
    }

    #[test]
    fn duplicate_registration_keeps_the_original() {
        let mut registry = SystemRegistry::new();
        registry
            .register(Phase::Validation, Threshold { limit: 1 }, 0)
            .unwrap();

        let err = registry
            .register(Phase::Cleanup, Threshold { limit: 2 }, 0)
            .unwrap_err();
        assert_eq!(
            err,
            SystemRegistrationError::DuplicateSystem {
                name: "threshold",
                phase: Phase::Validation,
                requested: Phase::Cleanup,
            }
        );
        assert_eq!(registry.get::<Threshold>().map(|s| s.limit), Some(1));
        assert_eq!(registry.phase_of::<Threshold>(), Some(Phase::Validation));
        assert!(registry.systems_for(Phase::Cleanup).is_empty());
    }

    #[test]
    fn unregister_reports_the_descriptor() {
        let mut registry = SystemRegistry::new();
        registry.register(Phase::Cleanup, Tagged::<7>, 3).unwrap();

        let descriptor = registry.unregister::<Tagged<7>>().unwrap();
        assert_eq!(descriptor.phase(), Phase::Cleanup);
        assert_eq!(descriptor.priority(), 3);
        assert!(registry.unregister::<Tagged<7>>().is_none());
        assert!(registry.get::<Tagged<7>>().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn descriptors_follow_phase_order() {
        let mut registry = SystemRegistry::new();
        registry.register(Phase::Cleanup, Tagged::<0>, 0).unwrap();
        registry.register(Phase::Input, Tagged::<1>, 0).unwrap();

        let phases: Vec<_> = registry.descriptors().map(|d| d.phase()).collect();
        assert_eq!(phases, vec![Phase::Input, Phase::Cleanup]);
    }
}
