// Math utilities and helper functions

pub use glam::Vec3;

/// Clamp a value between min and max
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Clamp a movement intention to the tri-state range (-1, 0, +1)
pub fn clamp_intent(value: i32) -> i32 {
    clamp(value, -1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(15.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn test_clamp_intent() {
        assert_eq!(clamp_intent(0), 0);
        assert_eq!(clamp_intent(1), 1);
        assert_eq!(clamp_intent(-1), -1);
        assert_eq!(clamp_intent(7), 1);
        assert_eq!(clamp_intent(-42), -1);
    }
}
