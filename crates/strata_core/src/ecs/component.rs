// component.rs - Component trait and runtime type registry
//
// Components are identified by stable u32 tags, not Rust TypeIds. The global
// registry maps each tag to the metadata needed to build its pool, so
// type-erased callers (command playback, blueprints) can create storage for a
// component type they only know by tag.

use crate::ecs::pool::{ComponentPool, ErasedPool};
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

pub type ComponentId = u32;

/// Tags at or above this value are reserved for built-in components.
pub const BUILTIN_COMPONENT_ID_BASE: ComponentId = 0xFFFF_0000;

/// Metadata describing a registered component type.
#[derive(Clone, Copy)]
pub struct ComponentMeta {
    pub id: ComponentId,
    pub name: &'static str,
    pub type_id: TypeId,
    pub type_name: &'static str,
    new_pool: fn() -> Box<dyn ErasedPool>,
}

impl ComponentMeta {
    pub fn of<T: Component>() -> Self {
        Self {
            id: T::ID,
            name: T::NAME,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            new_pool: new_pool::<T>,
        }
    }

    /// Build an empty pool for this component type.
    pub(crate) fn new_pool(&self) -> Box<dyn ErasedPool> {
        (self.new_pool)()
    }
}

impl fmt::Debug for ComponentMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentMeta")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish()
    }
}

fn new_pool<T: Component>() -> Box<dyn ErasedPool> {
    Box::new(ComponentPool::<T>::new())
}

static REGISTRY: Lazy<RwLock<HashMap<ComponentId, ComponentMeta>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a component's metadata.
///
/// Re-registering the same type is a no-op.
///
/// # Panics
/// If `meta.id` is already registered for a different Rust type. Two types
/// sharing one tag would make every type-erased operation ambiguous.
pub fn register_component(meta: ComponentMeta) {
    let mut map = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    match map.get(&meta.id) {
        Some(prev) => assert!(
            prev.type_id == meta.type_id,
            "component id {} is registered for `{}`, cannot reuse it for `{}`",
            meta.id,
            prev.type_name,
            meta.type_name
        ),
        None => {
            map.insert(meta.id, meta);
        }
    }
}

/// Look up component metadata by tag.
pub fn meta_of(id: ComponentId) -> Option<ComponentMeta> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .copied()
}

/// Look up component metadata by its human-readable name.
pub fn meta_of_name(name: &str) -> Option<ComponentMeta> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .values()
        .find(|meta| meta.name == name)
        .copied()
}

/// Trait for plain-data components.
///
/// Implementors are value types owned entirely by their pool. `Clone` lets a
/// queued value be copied between command buffers.
pub trait Component: 'static + Sized + Send + Sync + Clone {
    /// Globally unique component tag.
    const ID: ComponentId;

    /// Human-readable name for debugging.
    const NAME: &'static str;

    /// Register this component with the global registry.
    ///
    /// Typed world operations do this on first use; call it during startup
    /// when the type will first be touched through a type-erased path.
    fn ensure_registered() {
        register_component(ComponentMeta::of::<Self>());
    }
}

/// Helper macro to implement Component trait.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Copy)]
/// struct Position { x: f32, y: f32 }
///
/// define_component!(Position, 1, "Position");
/// ```
#[macro_export]
macro_rules! define_component {
    ($ty:ty, $id:expr, $name:expr) => {
        impl $crate::ecs::Component for $ty {
            const ID: $crate::ecs::ComponentId = $id;
            const NAME: &'static str = $name;
        }
    };
}

/// Type-erased component value tagged with its component id.
///
/// Cloning shares the payload; the pool takes ownership on insert (copying
/// only if the payload is still shared).
#[derive(Clone)]
pub struct ComponentValue {
    id: ComponentId,
    value: Arc<dyn Any + Send + Sync>,
    meta: Option<ComponentMeta>,
}

impl ComponentValue {
    /// Wrap a typed value.
    pub fn new<T: Component>(value: T) -> Self {
        Self {
            id: T::ID,
            value: Arc::new(value),
            meta: Some(ComponentMeta::of::<T>()),
        }
    }

    /// Pair a tag with an arbitrary payload.
    ///
    /// The payload type is only checked when the value reaches a pool, which
    /// rejects it with `TypeMismatch` if it disagrees with the tag's type.
    pub fn from_raw(id: ComponentId, value: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            id,
            value,
            meta: None,
        }
    }

    pub fn from_boxed(id: ComponentId, value: Box<dyn Any + Send + Sync>) -> Self {
        Self::from_raw(id, Arc::from(value))
    }

    #[inline]
    pub fn component_id(&self) -> ComponentId {
        self.id
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Metadata of the type this value was constructed from, if typed.
    pub(crate) fn meta(&self) -> Option<&ComponentMeta> {
        self.meta.as_ref()
    }

    /// Take the payload as `T`, handing the value back on a type mismatch.
    pub(crate) fn into_typed<T: Component>(self) -> Result<T, ComponentValue> {
        let Self { id, value, meta } = self;
        match value.downcast::<T>() {
            Ok(typed) => Ok(Arc::unwrap_or_clone(typed)),
            Err(value) => Err(Self { id, value, meta }),
        }
    }
}

impl fmt::Debug for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.meta.map(|meta| meta.name).unwrap_or("<untyped>");
        f.debug_struct("ComponentValue")
            .field("id", &self.id)
            .field("name", &name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Mass(f32);
    define_component!(Mass, 1700, "Mass");

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Charge(f32);
    define_component!(Charge, 1701, "Charge");

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Impostor(f32);
    define_component!(Impostor, 1701, "Impostor");

    #[test]
    fn registration_is_idempotent_and_queryable() {
        Mass::ensure_registered();
        Mass::ensure_registered();

        let meta = meta_of(Mass::ID).unwrap();
        assert_eq!(meta.name, "Mass");
        assert_eq!(meta.type_id, TypeId::of::<Mass>());
        assert_eq!(meta_of_name("Mass").map(|m| m.id), Some(1700));
        assert!(meta_of(1799).is_none());
    }

    #[test]
    #[should_panic(expected = "cannot reuse it")]
    fn conflicting_registration_panics() {
        Charge::ensure_registered();
        Impostor::ensure_registered();
    }

    #[test]
    fn value_round_trips_through_erasure() {
        let value = ComponentValue::new(Mass(2.5));
        assert_eq!(value.component_id(), Mass::ID);
        assert!(value.is::<Mass>());
        assert_eq!(value.downcast_ref::<Mass>(), Some(&Mass(2.5)));

        let shared = value.clone();
        assert_eq!(value.into_typed::<Mass>().unwrap(), Mass(2.5));
        assert_eq!(shared.into_typed::<Mass>().unwrap(), Mass(2.5));
    }

    #[test]
    fn raw_value_with_wrong_payload_is_handed_back() {
        let value = ComponentValue::from_boxed(Mass::ID, Box::new(7_u8));
        let returned = value.into_typed::<Mass>().unwrap_err();
        assert_eq!(returned.component_id(), Mass::ID);
        assert_eq!(returned.downcast_ref::<u8>(), Some(&7));
    }
}
