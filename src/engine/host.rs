// Native engine boundary
//
// `DynentHost` is what the scripted layer needs from the engine that owns the
// physical entities: registering a character with a native dynent, tearing it
// down, and reading back the dynent after physics ran. `LocalHost` is an
// in-memory engine used by the demo binary and tests.

use std::collections::HashMap;

use log::debug;

use crate::core::math::Vec3;

use super::entity::{ClientNumber, EntityId};
use super::replicated::{FieldChange, FieldValue, StateSync};

/// Native engine errors
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Client number {0} is already in use")]
    ClientNumberInUse(ClientNumber),

    #[error("No dynent for client {0}")]
    UnknownClient(ClientNumber),
}

/// The native dynent as physics left it this tick
#[derive(Debug, Clone, PartialEq)]
pub struct DynentState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub falling: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub move_intent: i32,
    pub strafe_intent: i32,
    pub client_state: i32,
    pub physical_state: i32,
    pub in_water: i32,
    pub time_in_air: i32,
    pub blocked: bool,
}

impl Default for DynentState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            falling: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            move_intent: 0,
            strafe_intent: 0,
            client_state: 0,
            physical_state: 4, // on the floor
            in_water: 0,
            time_in_air: 0,
            blocked: false,
        }
    }
}

/// Services the native engine provides to character entities
pub trait DynentHost {
    /// Create or connect the native dynent for `entity`. With no requested
    /// number the host connects a local client and assigns one. The returned
    /// number is stable for the rest of the session.
    fn setup_character(
        &mut self,
        entity: EntityId,
        requested: Option<ClientNumber>,
    ) -> Result<ClientNumber, HostError>;

    /// Release the native dynent for `entity`
    fn dismantle_character(&mut self, entity: EntityId);

    /// Set the intention to jump, applied on the next physics step
    fn set_jumping(&mut self, client: ClientNumber, jumping: bool) -> Result<(), HostError>;

    /// Current native state of a character's dynent
    fn dynent_state(&self, client: ClientNumber) -> Option<DynentState>;
}

/// Queue of pending entity actions
pub trait ActionSystem {
    fn is_empty(&self) -> bool;

    /// Run queued actions for `seconds`
    fn run(&mut self, seconds: f32);
}

/// Action system that never has anything queued
#[derive(Debug, Default, Clone, Copy)]
pub struct NoActions;

impl ActionSystem for NoActions {
    fn is_empty(&self) -> bool {
        true
    }

    fn run(&mut self, _seconds: f32) {}
}

const GRAVITY: f32 = 200.0;
const JUMP_VELOCITY: f32 = 125.0;
const PHYS_FALL: i32 = 1;
const PHYS_FLOOR: i32 = 4;

#[derive(Debug, Default)]
struct LocalDynent {
    entity: Option<EntityId>,
    state: DynentState,
    jumping: bool,
    max_speed: f32,
    floor_z: f32,
}

/// In-memory engine: hands out client numbers and runs a toy physics step
#[derive(Debug, Default)]
pub struct LocalHost {
    clients: HashMap<EntityId, ClientNumber>,
    dynents: HashMap<ClientNumber, LocalDynent>,
    next_client: u32,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client number bound to `entity`, if set up
    pub fn client_of(&self, entity: EntityId) -> Option<ClientNumber> {
        self.clients.get(&entity).copied()
    }

    /// Number of live dynents
    pub fn dynent_count(&self) -> usize {
        self.dynents.len()
    }

    /// Whether a jump is pending for `client`
    pub fn is_jumping(&self, client: ClientNumber) -> bool {
        self.dynents.get(&client).is_some_and(|d| d.jumping)
    }

    /// Overwrite part of a dynent directly, as the engine would
    pub fn with_dynent_mut<F: FnOnce(&mut DynentState)>(
        &mut self,
        client: ClientNumber,
        f: F,
    ) -> Result<(), HostError> {
        let dynent = self
            .dynents
            .get_mut(&client)
            .ok_or(HostError::UnknownClient(client))?;
        f(&mut dynent.state);
        Ok(())
    }

    /// Advance every dynent by `seconds`
    pub fn simulate(&mut self, seconds: f32) {
        for dynent in self.dynents.values_mut() {
            let state = &mut dynent.state;

            if dynent.jumping && state.physical_state == PHYS_FLOOR {
                state.velocity.z = JUMP_VELOCITY;
                state.physical_state = PHYS_FALL;
                dynent.floor_z = state.position.z;
            }
            dynent.jumping = false;

            let speed = dynent.max_speed;
            let yaw = state.yaw.to_radians();
            let forward = Vec3::new(-yaw.sin(), yaw.cos(), 0.0);
            let right = Vec3::new(yaw.cos(), yaw.sin(), 0.0);
            let walk = forward * state.move_intent as f32 + right * state.strafe_intent as f32;
            state.velocity.x = walk.x * speed;
            state.velocity.y = walk.y * speed;

            if state.physical_state == PHYS_FALL {
                state.velocity.z -= GRAVITY * seconds;
                state.time_in_air += (seconds * 1000.0) as i32;
            }

            state.position += state.velocity * seconds;

            if state.physical_state == PHYS_FALL && state.position.z <= dynent.floor_z {
                state.position.z = dynent.floor_z;
                state.velocity.z = 0.0;
                state.physical_state = PHYS_FLOOR;
                state.time_in_air = 0;
            }
        }
    }

    fn allocate_client(&mut self) -> ClientNumber {
        while self.dynents.contains_key(&ClientNumber(self.next_client)) {
            self.next_client += 1;
        }
        ClientNumber(self.next_client)
    }
}

impl DynentHost for LocalHost {
    fn setup_character(
        &mut self,
        entity: EntityId,
        requested: Option<ClientNumber>,
    ) -> Result<ClientNumber, HostError> {
        if let Some(&existing) = self.clients.get(&entity) {
            return Ok(existing);
        }

        let client = match requested {
            Some(client) if self.dynents.contains_key(&client) => {
                return Err(HostError::ClientNumberInUse(client));
            }
            Some(client) => client,
            None => self.allocate_client(),
        };

        debug!("Setting up dynent for {} as {}", entity, client);
        self.clients.insert(entity, client);
        self.dynents.insert(
            client,
            LocalDynent {
                entity: Some(entity),
                ..Default::default()
            },
        );
        Ok(client)
    }

    fn dismantle_character(&mut self, entity: EntityId) {
        if let Some(client) = self.clients.remove(&entity) {
            debug!("Dismantling dynent {} of {}", client, entity);
            self.dynents.remove(&client);
        }
    }

    fn set_jumping(&mut self, client: ClientNumber, jumping: bool) -> Result<(), HostError> {
        let dynent = self
            .dynents
            .get_mut(&client)
            .ok_or(HostError::UnknownClient(client))?;
        dynent.jumping = jumping;
        Ok(())
    }

    fn dynent_state(&self, client: ClientNumber) -> Option<DynentState> {
        self.dynents.get(&client).map(|d| d.state.clone())
    }
}

/// Pushed state lands in native memory
impl StateSync for LocalHost {
    fn push(&mut self, change: FieldChange) {
        let Some(&client) = self.clients.get(&change.entity) else {
            return;
        };
        let Some(dynent) = self.dynents.get_mut(&client) else {
            return;
        };
        debug_assert_eq!(dynent.entity, Some(change.entity));

        let state = &mut dynent.state;
        match (change.field, change.value) {
            ("position", FieldValue::Vector(v)) => state.position = v,
            ("velocity", FieldValue::Vector(v)) => state.velocity = v,
            ("falling", FieldValue::Vector(v)) => state.falling = v,
            ("yaw", FieldValue::Float(v)) => state.yaw = v,
            ("pitch", FieldValue::Float(v)) => state.pitch = v,
            ("move", FieldValue::Int(v)) => state.move_intent = v,
            ("strafe", FieldValue::Int(v)) => state.strafe_intent = v,
            ("client_state", FieldValue::Int(v)) => state.client_state = v,
            ("physical_state", FieldValue::Int(v)) => state.physical_state = v,
            ("in_water", FieldValue::Int(v)) => state.in_water = v,
            ("time_in_air", FieldValue::Int(v)) => state.time_in_air = v,
            ("blocked", FieldValue::Bool(v)) => state.blocked = v,
            ("movement_speed", FieldValue::Float(v)) => dynent.max_speed = v,
            _ => {}
        }
    }
}
