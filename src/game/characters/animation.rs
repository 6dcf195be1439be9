// Character animation selection
//
// Animations are packed into a single integer: the primary animation (index
// plus modifier flags) in the low bits, and a secondary overlay shifted up by
// `ANIM_SECONDARY` bits. The renderer plays both layers.

use std::fmt;

use crate::core::math::Vec3;
use crate::engine::replicated::FieldValue;

use super::state::{ClientState, PhysicalState};

// Animation indices, as numbered by the model renderer
pub const ANIM_DEAD: u32 = 0;
pub const ANIM_DYING: u32 = 1;
pub const ANIM_IDLE: u32 = 2;
pub const ANIM_FORWARD: u32 = 3;
pub const ANIM_BACKWARD: u32 = 4;
pub const ANIM_LEFT: u32 = 5;
pub const ANIM_RIGHT: u32 = 6;
pub const ANIM_HOLD1: u32 = 7;
pub const ANIM_ATTACK1: u32 = 14;
pub const ANIM_PAIN: u32 = 21;
pub const ANIM_JUMP: u32 = 22;
pub const ANIM_SINK: u32 = 23;
pub const ANIM_SWIM: u32 = 24;
pub const ANIM_EDIT: u32 = 25;
pub const ANIM_LAG: u32 = 26;
pub const ANIM_TAUNT: u32 = 27;
pub const ANIM_WIN: u32 = 28;
pub const ANIM_LOSE: u32 = 29;
pub const ANIM_GUN_IDLE: u32 = 30;
pub const ANIM_GUN_SHOOT: u32 = 31;
pub const ANIM_VWEP_IDLE: u32 = 32;
pub const ANIM_VWEP_SHOOT: u32 = 33;
pub const ANIM_SHIELD: u32 = 34;
pub const ANIM_POWERUP: u32 = 35;

// Modifiers
pub const ANIM_INDEX: u32 = 0x7F;
pub const ANIM_LOOP: u32 = 1 << 7;
pub const ANIM_START: u32 = 1 << 8;
pub const ANIM_END: u32 = 1 << 9;
pub const ANIM_REVERSE: u32 = 1 << 10;

/// Bit width of one animation layer (index plus modifiers)
pub const ANIM_SECONDARY: u32 = 11;

const LAYER_MASK: u32 = (1 << ANIM_SECONDARY) - 1;

/// Time in the air (ms) after which the jump overlay is shown
pub const JUMP_OVERLAY_AIR_TIME_MS: i32 = 250;

/// Packed primary + secondary animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AnimationCode(u32);

impl AnimationCode {
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Build from separate primary and secondary layers
    pub const fn from_layers(primary: u32, secondary: u32) -> Self {
        Self((primary & LAYER_MASK) | ((secondary & LAYER_MASK) << ANIM_SECONDARY))
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Primary layer: index plus modifiers
    pub fn primary(&self) -> u32 {
        self.0 & LAYER_MASK
    }

    /// Secondary layer: index plus modifiers
    pub fn secondary(&self) -> u32 {
        (self.0 >> ANIM_SECONDARY) & LAYER_MASK
    }

    /// Primary animation index without modifiers
    pub fn index(&self) -> u32 {
        self.0 & ANIM_INDEX
    }

    /// Secondary animation index without modifiers
    pub fn secondary_index(&self) -> u32 {
        (self.0 >> ANIM_SECONDARY) & ANIM_INDEX
    }

    /// Whether the primary layer loops
    pub fn is_looping(&self) -> bool {
        self.0 & ANIM_LOOP != 0
    }
}

impl From<u32> for AnimationCode {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl From<AnimationCode> for FieldValue {
    fn from(code: AnimationCode) -> Self {
        FieldValue::Int(code.0 as i32)
    }
}

impl fmt::Display for AnimationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            animation_name(self.index()),
            animation_name(self.secondary_index())
        )
    }
}

/// Human-readable name of an animation index, for logging
pub fn animation_name(index: u32) -> &'static str {
    match index {
        ANIM_DEAD => "dead",
        ANIM_DYING => "dying",
        ANIM_IDLE => "idle",
        ANIM_FORWARD => "forward",
        ANIM_BACKWARD => "backward",
        ANIM_LEFT => "left",
        ANIM_RIGHT => "right",
        7..=13 => "hold",
        14..=20 => "attack",
        ANIM_PAIN => "pain",
        ANIM_JUMP => "jump",
        ANIM_SINK => "sink",
        ANIM_SWIM => "swim",
        ANIM_EDIT => "edit",
        ANIM_LAG => "lag",
        ANIM_TAUNT => "taunt",
        ANIM_WIN => "win",
        ANIM_LOSE => "lose",
        ANIM_GUN_IDLE => "gun_idle",
        ANIM_GUN_SHOOT => "gun_shoot",
        ANIM_VWEP_IDLE => "vwep_idle",
        ANIM_VWEP_SHOOT => "vwep_shoot",
        ANIM_SHIELD => "shield",
        ANIM_POWERUP => "powerup",
        _ => "unknown",
    }
}

/// Snapshot of everything animation selection looks at
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionState {
    /// `None` when the engine reported an unknown value
    pub client_state: Option<ClientState>,
    /// `None` when the engine reported an unknown value
    pub physical_state: Option<PhysicalState>,
    /// -1 back, 0 none, +1 forward
    pub move_intent: i32,
    /// -1 one way, 0 none, +1 the other
    pub strafe_intent: i32,
    pub velocity: Vec3,
    pub falling: Vec3,
    pub in_water: bool,
    /// Milliseconds since last touching ground
    pub time_in_air_ms: i32,
}

impl MotionState {
    /// Build from the raw integers the engine stores
    #[allow(clippy::too_many_arguments)]
    pub fn from_raw(
        client_state: i32,
        physical_state: i32,
        move_intent: i32,
        strafe_intent: i32,
        velocity: Vec3,
        falling: Vec3,
        in_water: i32,
        time_in_air_ms: i32,
    ) -> Self {
        Self {
            client_state: ClientState::from_raw(client_state),
            physical_state: PhysicalState::from_raw(physical_state),
            move_intent,
            strafe_intent,
            velocity,
            falling,
            in_water: in_water != 0,
            time_in_air_ms,
        }
    }

    fn is_moving(&self) -> bool {
        self.move_intent != 0 || self.strafe_intent != 0
    }
}

/// Select the animation to show for a character.
///
/// `action` is the base action animation (usually the stored animation of the
/// entity). Editing, spectating and lag replace it outright; otherwise an
/// overlay for swimming, jumping or walking is added as the secondary layer,
/// and promoted to primary when the action is plain idle. The result always
/// carries a secondary layer, defaulting to looping idle.
pub fn decide_animation(motion: &MotionState, action: AnimationCode) -> AnimationCode {
    let mut anim = action.bits();

    match motion.client_state {
        Some(ClientState::Editing) | Some(ClientState::Spectator) => {
            anim = ANIM_EDIT | ANIM_LOOP;
        }
        Some(ClientState::Lagged) => {
            anim = ANIM_LAG | ANIM_LOOP;
        }
        _ => {
            let unsupported = motion
                .physical_state
                .is_some_and(|state| state.is_unsupported());

            if motion.in_water && unsupported {
                let rising = motion.velocity.z + motion.falling.z > 0.0;
                let overlay = if motion.is_moving() || rising {
                    ANIM_SWIM
                } else {
                    ANIM_SINK
                };
                anim |= (overlay | ANIM_LOOP) << ANIM_SECONDARY;
            } else if motion.time_in_air_ms > JUMP_OVERLAY_AIR_TIME_MS {
                anim |= (ANIM_JUMP | ANIM_END) << ANIM_SECONDARY;
            } else if motion.is_moving() {
                if motion.move_intent > 0 {
                    anim |= (ANIM_FORWARD | ANIM_LOOP) << ANIM_SECONDARY;
                } else if motion.strafe_intent != 0 {
                    let side = if motion.strafe_intent > 0 {
                        ANIM_LEFT
                    } else {
                        ANIM_RIGHT
                    };
                    anim |= (side | ANIM_LOOP) << ANIM_SECONDARY;
                } else if motion.move_intent < 0 {
                    anim |= (ANIM_BACKWARD | ANIM_LOOP) << ANIM_SECONDARY;
                }
            }

            if anim & ANIM_INDEX == ANIM_IDLE && (anim >> ANIM_SECONDARY) & ANIM_INDEX != 0 {
                anim >>= ANIM_SECONDARY;
            }
        }
    }

    if (anim >> ANIM_SECONDARY) & ANIM_INDEX == 0 {
        anim |= (ANIM_IDLE | ANIM_LOOP) << ANIM_SECONDARY;
    }

    AnimationCode(anim)
}
