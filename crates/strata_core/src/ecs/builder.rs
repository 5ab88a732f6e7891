use crate::ecs::{Component, ComponentValue, EntityId, World, WorldError};

/// Initial component set for a new entity.
///
/// Used by [`World::spawn`] and [`CommandBuffer::create_entity_with`].
/// Adding a component type twice replaces the earlier value in place.
///
/// [`CommandBuffer::create_entity_with`]: crate::ecs::CommandBuffer::create_entity_with
#[derive(Clone, Debug, Default)]
pub struct EntityBuilder {
    components: Vec<ComponentValue>,
}

impl EntityBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Add a Rust-typed component by value.
    pub fn with<T: Component>(self, value: T) -> Self {
        self.with_value(ComponentValue::new(value))
    }

    /// Add a type-erased component.
    pub fn with_value(mut self, value: ComponentValue) -> Self {
        let id = value.component_id();
        match self
            .components
            .iter_mut()
            .find(|existing| existing.component_id() == id)
        {
            Some(slot) => *slot = value,
            None => self.components.push(value),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[ComponentValue] {
        &self.components
    }

    pub(crate) fn into_values(self) -> Vec<ComponentValue> {
        self.components
    }
}

/// Produces one concrete component for an entity.
///
/// Host applications implement this over their asset formats; the world only
/// needs the single entry point.
pub trait Blueprint {
    /// Build the component, attach it to `entity` and return it.
    fn instantiate(&self, world: &mut World, entity: EntityId) -> Result<ComponentValue, WorldError>;
}

/// Blueprint that attaches a clone of a template value.
#[derive(Clone, Debug)]
pub struct ComponentBlueprint<T: Component> {
    template: T,
}

impl<T: Component> ComponentBlueprint<T> {
    pub fn new(template: T) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &T {
        &self.template
    }
}

impl<T: Component> Blueprint for ComponentBlueprint<T> {
    fn instantiate(&self, world: &mut World, entity: EntityId) -> Result<ComponentValue, WorldError> {
        let value = ComponentValue::new(self.template.clone());
        world.add_component_dyn(entity, value.clone())?;
        Ok(value)
    }
}
