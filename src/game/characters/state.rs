// Client and physical state of a character, mirrored from the native dynent

/// High-level mode of a character.
///
/// Discriminants match the native engine's numbering, so raw values read from
/// the dynent convert directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ClientState {
    /// Playing normally
    Alive = 0,
    /// Dead (not produced by this layer)
    Dead = 1,
    /// Waiting to spawn
    Spawning = 2,
    /// Connection is lagging; drawn faded
    Lagged = 3,
    /// In map edit mode
    Editing = 4,
    /// Watching, not participating
    Spectator = 5,
}

impl Default for ClientState {
    fn default() -> Self {
        Self::Alive
    }
}

impl ClientState {
    /// Convert a raw engine value. Out-of-range values yield `None`.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Alive),
            1 => Some(Self::Dead),
            2 => Some(Self::Spawning),
            3 => Some(Self::Lagged),
            4 => Some(Self::Editing),
            5 => Some(Self::Spectator),
            _ => None,
        }
    }

    /// Raw engine value
    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Whether a character in this state is hidden from rendering
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Spectator | Self::Spawning)
    }

    /// Whether this state shows the edit animation
    pub fn is_editing_view(&self) -> bool {
        matches!(self, Self::Editing | Self::Spectator)
    }
}

/// Motion/contact regime reported by the physics integrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum PhysicalState {
    Float = 0,
    Fall = 1,
    Slide = 2,
    Slope = 3,
    Floor = 4,
    StepUp = 5,
    StepDown = 6,
    Bounce = 7,
}

impl Default for PhysicalState {
    fn default() -> Self {
        Self::Float
    }
}

impl PhysicalState {
    /// Convert a raw engine value. Out-of-range values yield `None`.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Float),
            1 => Some(Self::Fall),
            2 => Some(Self::Slide),
            3 => Some(Self::Slope),
            4 => Some(Self::Floor),
            5 => Some(Self::StepUp),
            6 => Some(Self::StepDown),
            7 => Some(Self::Bounce),
            _ => None,
        }
    }

    /// Raw engine value
    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Not supported by a surface: floating or falling
    pub fn is_unsupported(&self) -> bool {
        *self <= Self::Fall
    }
}
