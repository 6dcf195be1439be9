// Entity class registry
//
// Associates scripted class names with the native entity type backing them
// and a constructor, so the engine can create entities by name.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use super::entity::DynamicEntity;

/// Native entity type a scripted class is backed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// Movable physical entity (characters)
    Dynent,
    /// Static map entity
    Extent,
}

impl NativeType {
    /// Tag the native engine uses for this type
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Dynent => "dynent",
            Self::Extent => "extent",
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Builds a fresh, uninitialized entity
pub type EntityConstructor = fn() -> Box<dyn DynamicEntity>;

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Entity class already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Unknown entity class: {0}")]
    UnknownClass(String),
}

#[derive(Clone, Copy)]
struct EntityClass {
    native_type: NativeType,
    construct: EntityConstructor,
}

/// Class name to native type and constructor
#[derive(Default)]
pub struct EntityRegistry {
    classes: HashMap<&'static str, EntityClass>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class under `name`
    pub fn register(
        &mut self,
        name: &'static str,
        native_type: NativeType,
        construct: EntityConstructor,
    ) -> Result<(), RegistryError> {
        if self.classes.contains_key(name) {
            return Err(RegistryError::AlreadyRegistered(name.to_string()));
        }
        debug!("Registering entity class {} as {}", name, native_type);
        self.classes.insert(
            name,
            EntityClass {
                native_type,
                construct,
            },
        );
        Ok(())
    }

    /// Create an uninitialized entity of class `name`
    pub fn create(&self, name: &str) -> Result<Box<dyn DynamicEntity>, RegistryError> {
        self.classes
            .get(name)
            .map(|class| (class.construct)())
            .ok_or_else(|| RegistryError::UnknownClass(name.to_string()))
    }

    /// Native type backing class `name`
    pub fn native_type(&self, name: &str) -> Option<NativeType> {
        self.classes.get(name).map(|class| class.native_type)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Number of registered classes
    pub fn count(&self) -> usize {
        self.classes.len()
    }
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.classes.keys().collect();
        names.sort();
        f.debug_struct("EntityRegistry")
            .field("classes", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::characters::Character;

    fn make_character() -> Box<dyn DynamicEntity> {
        Box::new(Character::new())
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = EntityRegistry::new();
        registry
            .register("Character", NativeType::Dynent, make_character)
            .unwrap();

        assert!(registry.is_registered("Character"));
        assert_eq!(registry.native_type("Character"), Some(NativeType::Dynent));

        let entity = registry.create("Character").unwrap();
        assert_eq!(entity.class_name(), "Character");
        assert_eq!(entity.unique_id(), None);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = EntityRegistry::new();
        registry
            .register("Character", NativeType::Dynent, make_character)
            .unwrap();
        let err = registry
            .register("Character", NativeType::Dynent, make_character)
            .unwrap_err();
        assert_eq!(err.to_string(), "Entity class already registered: Character");
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_unknown_class() {
        let registry = EntityRegistry::new();
        assert!(matches!(
            registry.create("Ghost"),
            Err(RegistryError::UnknownClass(name)) if name == "Ghost"
        ));
        assert_eq!(registry.native_type("Ghost"), None);
    }

    #[test]
    fn test_native_type_tags() {
        assert_eq!(NativeType::Dynent.tag(), "dynent");
        assert_eq!(NativeType::Extent.to_string(), "extent");
    }
}
