// Character system
//
// This module contains the scripted character classes backed by native dynents:
// - Character and Player entities and their lifecycle
// - Client/physical state mirrored from the engine
// - Animation selection
// - Per-frame render argument caching
// - Spawn defaults

pub mod animation;
pub mod character;
pub mod defaults;
pub mod player;
pub mod render_cache;
pub mod state;

use crate::engine::entity::DynamicEntity;
use crate::engine::registry::{EntityRegistry, NativeType, RegistryError};

// Re-export commonly used types
pub use animation::{decide_animation, AnimationCode, MotionState};
pub use character::{Character, CharacterFields, CharacterHooks, DefaultHooks};
pub use defaults::CharacterDefaults;
pub use player::Player;
pub use render_cache::RenderArgsCache;
pub use state::{ClientState, PhysicalState};

fn new_character() -> Box<dyn DynamicEntity> {
    Box::new(Character::new())
}

fn new_player() -> Box<dyn DynamicEntity> {
    Box::new(Player::new())
}

/// Register Character and Player as dynent-backed classes
pub fn register_character_classes(registry: &mut EntityRegistry) -> Result<(), RegistryError> {
    registry.register(Character::CLASS_NAME, NativeType::Dynent, new_character)?;
    registry.register(Player::CLASS_NAME, NativeType::Dynent, new_player)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_character_classes() {
        let mut registry = EntityRegistry::new();
        register_character_classes(&mut registry).unwrap();

        assert_eq!(registry.native_type("Character"), Some(NativeType::Dynent));
        assert_eq!(registry.native_type("Player"), Some(NativeType::Dynent));
        assert_eq!(registry.create("Player").unwrap().class_name(), "Player");
    }

    #[test]
    fn test_register_twice_fails() {
        let mut registry = EntityRegistry::new();
        register_character_classes(&mut registry).unwrap();
        assert!(register_character_classes(&mut registry).is_err());
    }
}
