use crate::ecs::Entity;
use crate::scene::{Scene, SceneError};
use serde::Serialize;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds per-entity component instances. Invoked once per host when the
/// component is first declared on it.
pub trait ComponentFactory: Send + Sync {
    fn attach(
        &self,
        scene: &mut Scene,
        host: Entity,
        attributes: &str,
    ) -> Result<Box<dyn ComponentInstance>, SceneError>;
}

/// State owned by one host for the lifetime of one attachment.
pub trait ComponentInstance: Send {
    fn update(
        &mut self,
        scene: &mut Scene,
        host: Entity,
        attributes: &str,
    ) -> Result<(), SceneError>;

    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Boolean,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySchema {
    pub name: &'static str,
    pub kind: PropertyKind,
    pub default: &'static str,
}

impl PropertySchema {
    pub const fn new(name: &'static str, kind: PropertyKind, default: &'static str) -> Self {
        Self {
            name,
            kind,
            default,
        }
    }
}

#[derive(Clone)]
pub struct ComponentDefinition {
    factory: Arc<dyn ComponentFactory>,
    schema: Vec<PropertySchema>,
}

impl ComponentDefinition {
    pub fn builder(factory: Arc<dyn ComponentFactory>) -> ComponentDefinitionBuilder {
        ComponentDefinitionBuilder {
            factory,
            schema: Vec::new(),
        }
    }

    pub fn factory(&self) -> &dyn ComponentFactory {
        self.factory.as_ref()
    }

    pub fn schema(&self) -> &[PropertySchema] {
        &self.schema
    }
}

pub struct ComponentDefinitionBuilder {
    factory: Arc<dyn ComponentFactory>,
    schema: Vec<PropertySchema>,
}

impl ComponentDefinitionBuilder {
    pub fn property(mut self, property: PropertySchema) -> Self {
        self.schema.push(property);
        self
    }

    pub fn properties(mut self, properties: impl IntoIterator<Item = PropertySchema>) -> Self {
        self.schema.extend(properties);
        self
    }

    pub fn build(self) -> ComponentDefinition {
        ComponentDefinition {
            factory: self.factory,
            schema: self.schema,
        }
    }
}

/// Name-to-definition table handed to the runtime at construction.
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    definitions: BTreeMap<String, ComponentDefinition>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, definition: ComponentDefinition) {
        let name = name.into();
        if self.definitions.insert(name.clone(), definition).is_some() {
            log::warn!(
                "[scene] component '{name}' registered twice; keeping the latest definition"
            );
        }
    }

    pub fn get(&self, name: &str) -> Option<&ComponentDefinition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Definitions sorted by component name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentDefinition)> {
        self.definitions
            .iter()
            .map(|(name, definition)| (name.as_str(), definition))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
