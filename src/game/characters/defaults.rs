// Character spawn defaults
// Applied in init; the server overrides name and position afterwards

use crate::core::math::Vec3;

/// Initial values for a freshly created character
#[derive(Debug, Clone)]
pub struct CharacterDefaults {
    /// Shown until the server assigns a real name
    pub name: &'static str,
    /// Model used for third-person rendering
    pub model_name: &'static str,

    // Movement
    /// Maximum movement speed. 20 is slow, 60 is quite fast
    pub movement_speed: f32,
    /// How fast facing can change, in degrees/second
    pub facing_speed: i32,

    // Dimensions
    /// Distance from the eyes down to the feet
    pub eye_height: f32,
    /// Distance from `position` up to the eyes
    pub above_eye: f32,
    /// Bounding box radius
    pub radius: f32,

    /// Spawn position
    pub position: Vec3,
    pub can_move: bool,
}

/// Defaults every character starts with
pub const BASE_DEFAULTS: CharacterDefaults = CharacterDefaults {
    name: "-?-",
    model_name: "stromar",

    movement_speed: 50.0,
    facing_speed: 120,

    eye_height: 14.0,
    above_eye: 1.0,
    radius: 3.0,

    position: Vec3::new(512.0, 512.0, 550.0),
    can_move: true,
};

impl Default for CharacterDefaults {
    fn default() -> Self {
        BASE_DEFAULTS
    }
}

impl CharacterDefaults {
    pub fn standard() -> Self {
        BASE_DEFAULTS
    }

    /// Same defaults with a different model
    pub fn with_model(mut self, model_name: &'static str) -> Self {
        self.model_name = model_name;
        self
    }

    /// Same defaults with a different spawn position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let defaults = CharacterDefaults::default();
        assert_eq!(defaults.name, "-?-");
        assert_eq!(defaults.model_name, "stromar");
        assert_eq!(defaults.movement_speed, 50.0);
        assert_eq!(defaults.facing_speed, 120);
        assert_eq!(defaults.eye_height, 14.0);
        assert_eq!(defaults.above_eye, 1.0);
        assert_eq!(defaults.radius, 3.0);
        assert_eq!(defaults.position, Vec3::new(512.0, 512.0, 550.0));
        assert!(defaults.can_move);
    }

    #[test]
    fn test_standard_equals_default() {
        let standard = CharacterDefaults::standard();
        let default = CharacterDefaults::default();
        assert_eq!(standard.model_name, default.model_name);
        assert_eq!(standard.position, default.position);
    }

    #[test]
    fn test_builders() {
        let defaults = CharacterDefaults::standard()
            .with_model("mrfixit")
            .with_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(defaults.model_name, "mrfixit");
        assert_eq!(defaults.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(defaults.radius, 3.0);
    }
}
