// Character entity
//
// A Character is either a player character or an NPC: a figure backed by a
// native dynent that can move, animate and be rendered. Physics and
// networking live in the engine; this type mirrors the dynent's state, drives
// its lifecycle and picks what to draw each frame.

use std::fmt;

use log::debug;

use crate::core::math::{clamp_intent, Vec3};
use crate::engine::entity::{ClientNumber, DynamicEntity, EntityError, EntityId, EntityParams};
use crate::engine::frame::FrameTimestamp;
use crate::engine::host::{ActionSystem, DynentHost, DynentState};
use crate::engine::render::{ModelFlags, ModelRenderer, RenderArgs, RenderContext};
use crate::engine::replicated::{ReplicatedField, StateSync};

use super::animation::{self, AnimationCode, MotionState};
use super::defaults::CharacterDefaults;
use super::render_cache::RenderArgsCache;
use super::state::{ClientState, PhysicalState};

/// Fade applied to lagged characters
pub const LAGGED_FADE: f32 = 0.3;

/// Fraction of the eye height the center sits above `position`
const CENTER_HEIGHT_RATIO: f32 = 0.75;

/// Overridable behavior of a character class
pub trait CharacterHooks: fmt::Debug {
    /// Activity when no action is queued
    fn default_action(&mut self, _fields: &mut CharacterFields, _seconds: f32) {}

    /// Base action animation, before water/jump/movement overlays
    fn decide_action_animation(&self, fields: &CharacterFields) -> AnimationCode {
        fields.animation.read()
    }

    /// Full animation selection. Usually only `decide_action_animation` is
    /// overridden.
    fn decide_animation(&self, motion: &MotionState, action: AnimationCode) -> AnimationCode {
        animation::decide_animation(motion, action)
    }

    /// Point others aim at
    fn center(&self, fields: &CharacterFields) -> Vec3 {
        let mut center = fields.position.read();
        center.z += fields.eye_height.read() * CENTER_HEIGHT_RATIO;
        center
    }
}

/// Hooks with stock behavior
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl CharacterHooks for DefaultHooks {}

/// Replicated state of a character
#[derive(Debug, Clone)]
pub struct CharacterFields {
    /// Shown on the scoreboard, in messages, etc.
    pub name: ReplicatedField<String>,
    /// Degrees/second
    pub facing_speed: ReplicatedField<i32>,
    pub movement_speed: ReplicatedField<f32>,
    pub yaw: ReplicatedField<f32>,
    pub pitch: ReplicatedField<f32>,
    /// -1 back, 0 none, +1 forward
    pub move_intent: ReplicatedField<i32>,
    /// -1, 0 or +1
    pub strafe_intent: ReplicatedField<i32>,
    pub position: ReplicatedField<Vec3>,
    pub velocity: ReplicatedField<Vec3>,
    pub falling: ReplicatedField<Vec3>,
    pub radius: ReplicatedField<f32>,
    pub above_eye: ReplicatedField<f32>,
    pub eye_height: ReplicatedField<f32>,
    /// Physics had the character collide with an obstacle last step
    pub blocked: ReplicatedField<bool>,
    pub can_move: ReplicatedField<bool>,
    /// Map-specific position protocol data
    pub map_defined_position_data: ReplicatedField<i32>,
    pub client_state: ReplicatedField<i32>,
    pub physical_state: ReplicatedField<i32>,
    pub in_water: ReplicatedField<i32>,
    /// Milliseconds
    pub time_in_air: ReplicatedField<i32>,
    pub model_name: ReplicatedField<String>,
    pub hud_model_name: ReplicatedField<String>,
    pub animation: ReplicatedField<AnimationCode>,
    /// When `animation` was last set
    pub animation_start: FrameTimestamp,
}

impl Default for CharacterFields {
    fn default() -> Self {
        Self {
            name: ReplicatedField::scheduled("name", String::new()),
            facing_speed: ReplicatedField::scheduled("facing_speed", 0),
            movement_speed: ReplicatedField::scheduled("movement_speed", 0.0),
            yaw: ReplicatedField::custom("yaw", 0.0),
            pitch: ReplicatedField::custom("pitch", 0.0),
            move_intent: ReplicatedField::custom("move", 0),
            strafe_intent: ReplicatedField::custom("strafe", 0),
            position: ReplicatedField::custom("position", Vec3::ZERO),
            velocity: ReplicatedField::custom("velocity", Vec3::ZERO),
            falling: ReplicatedField::custom("falling", Vec3::ZERO),
            radius: ReplicatedField::scheduled("radius", 0.0),
            above_eye: ReplicatedField::scheduled("above_eye", 0.0),
            eye_height: ReplicatedField::scheduled("eye_height", 0.0),
            blocked: ReplicatedField::scheduled("blocked", false),
            can_move: ReplicatedField::client_only("can_move", true),
            map_defined_position_data: ReplicatedField::custom("map_defined_position_data", 0),
            client_state: ReplicatedField::custom("client_state", ClientState::Alive.as_raw()),
            physical_state: ReplicatedField::custom(
                "physical_state",
                PhysicalState::Floor.as_raw(),
            ),
            in_water: ReplicatedField::custom("in_water", 0),
            time_in_air: ReplicatedField::custom("time_in_air", 0),
            model_name: ReplicatedField::scheduled("model_name", String::new()),
            hud_model_name: ReplicatedField::scheduled("hud_model_name", String::new()),
            animation: ReplicatedField::scheduled("animation", AnimationCode::default()),
            animation_start: FrameTimestamp::default(),
        }
    }
}

impl CharacterFields {
    /// Write spawn defaults. The writes are queued for replication.
    pub fn apply_defaults(&mut self, defaults: &CharacterDefaults) {
        self.name.write(defaults.name.to_string());
        self.model_name.write(defaults.model_name.to_string());
        self.eye_height.write(defaults.eye_height);
        self.above_eye.write(defaults.above_eye);
        self.movement_speed.write(defaults.movement_speed);
        self.facing_speed.write(defaults.facing_speed);
        self.position.write(defaults.position);
        self.radius.write(defaults.radius);
        self.can_move.write(defaults.can_move);
    }

    /// Mirror a native dynent snapshot without queueing anything
    pub fn store_native(&mut self, state: &DynentState) {
        self.position.store_native(state.position);
        self.velocity.store_native(state.velocity);
        self.falling.store_native(state.falling);
        self.yaw.store_native(state.yaw);
        self.pitch.store_native(state.pitch);
        self.move_intent.store_native(state.move_intent);
        self.strafe_intent.store_native(state.strafe_intent);
        self.client_state.store_native(state.client_state);
        self.physical_state.store_native(state.physical_state);
        self.in_water.store_native(state.in_water);
        self.time_in_air.store_native(state.time_in_air);
        self.blocked.store_native(state.blocked);
    }

    /// Set the intention to move, clamped to -1..=1
    pub fn set_move(&mut self, intent: i32) {
        self.move_intent.write(clamp_intent(intent));
    }

    /// Set the intention to strafe, clamped to -1..=1
    pub fn set_strafe(&mut self, intent: i32) {
        self.strafe_intent.write(clamp_intent(intent));
    }

    /// Inputs for animation selection
    pub fn motion_state(&self) -> MotionState {
        MotionState::from_raw(
            self.client_state.read(),
            self.physical_state.read(),
            self.move_intent.read(),
            self.strafe_intent.read(),
            self.velocity.read(),
            self.falling.read(),
            self.in_water.read(),
            self.time_in_air.read(),
        )
    }

    /// Push dirty fields. With `custom_only`, only fields that need
    /// explicit sync are sent. Returns the number of changes pushed.
    fn flush(&mut self, entity: EntityId, sink: &mut dyn StateSync, custom_only: bool) -> usize {
        let mut sent = 0;

        macro_rules! flush_fields {
            ($($field:ident),* $(,)?) => {
                $(
                    if (!custom_only || self.$field.needs_explicit_sync())
                        && self.$field.flush_to(entity, sink)
                    {
                        sent += 1;
                    }
                )*
            };
        }

        flush_fields!(
            name,
            facing_speed,
            movement_speed,
            yaw,
            pitch,
            move_intent,
            strafe_intent,
            position,
            velocity,
            falling,
            radius,
            above_eye,
            eye_height,
            blocked,
            can_move,
            map_defined_position_data,
            client_state,
            physical_state,
            in_water,
            time_in_air,
            model_name,
            hud_model_name,
            animation,
        );

        sent
    }
}

/// A player character or NPC
#[derive(Debug)]
pub struct Character {
    id: Option<EntityId>,
    client_number: Option<ClientNumber>,
    initialized: bool,
    fields: CharacterFields,
    hooks: Box<dyn CharacterHooks>,
    defaults: CharacterDefaults,
    render_cache: RenderArgsCache,
}

impl Default for Character {
    fn default() -> Self {
        Self::new()
    }
}

impl Character {
    pub const CLASS_NAME: &'static str = "Character";

    pub fn new() -> Self {
        Self::with_hooks(Box::new(DefaultHooks))
    }

    /// Character with custom behavior
    pub fn with_hooks(hooks: Box<dyn CharacterHooks>) -> Self {
        Self {
            id: None,
            client_number: None,
            initialized: false,
            fields: CharacterFields::default(),
            hooks,
            defaults: CharacterDefaults::standard(),
            render_cache: RenderArgsCache::new(),
        }
    }

    /// Use different spawn defaults (applied in `init`)
    pub fn with_defaults(mut self, defaults: CharacterDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub fn client_number(&self) -> Option<ClientNumber> {
        self.client_number
    }

    /// Activated and bound to a native dynent
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn fields(&self) -> &CharacterFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut CharacterFields {
        &mut self.fields
    }

    fn require_id(&self) -> Result<EntityId, EntityError> {
        self.id.ok_or(EntityError::NotInitialized)
    }

    /// Creation-time setup: spawn defaults and optional client number
    pub fn init(&mut self, id: EntityId, params: &EntityParams) {
        debug!("Initializing character {}", id);

        self.id = Some(id);
        self.client_number = params.valid_client_number();
        self.fields.apply_defaults(&self.defaults);
    }

    /// Server-side activation. The character must already have a client
    /// number; NPCs get one from the engine before activation.
    pub fn activate(
        &mut self,
        params: &EntityParams,
        host: &mut dyn DynentHost,
        sync: &mut dyn StateSync,
    ) -> Result<(), EntityError> {
        let id = self.require_id()?;
        debug!("Activating character {}", id);

        let requested = params
            .valid_client_number()
            .ok_or(EntityError::MissingClientNumber {
                entity: id,
                raw: params.client_number,
            })?;

        self.client_number = Some(host.setup_character(id, Some(requested))?);
        self.initialized = true;

        let flushed = self.flush_queued_changes(sync);
        debug!(
            "Character {} active as {:?} ({} queued changes sent)",
            id, self.client_number, flushed
        );
        Ok(())
    }

    /// Client-side activation. Without a client number the engine connects
    /// the character locally and assigns one.
    pub fn client_activate(
        &mut self,
        params: &EntityParams,
        host: &mut dyn DynentHost,
    ) -> Result<(), EntityError> {
        let id = self.require_id()?;
        debug!("Activating character {} on client", id);

        let requested = params.valid_client_number();
        self.client_number = Some(host.setup_character(id, requested)?);
        self.initialized = true;
        self.render_cache.invalidate();
        Ok(())
    }

    /// Release the native dynent
    pub fn deactivate(&mut self, host: &mut dyn DynentHost) {
        if let Some(id) = self.id {
            debug!("Deactivating character {}", id);
            host.dismantle_character(id);
        }
        self.initialized = false;
        self.render_cache.invalidate();
    }

    /// Think and act for `seconds`. Queued actions run if there are any,
    /// otherwise the class's default action.
    pub fn act(&mut self, seconds: f32, actions: &mut dyn ActionSystem) {
        if actions.is_empty() {
            self.hooks.default_action(&mut self.fields, seconds);
        } else {
            actions.run(seconds);
        }
    }

    /// Ask the engine to jump on the next physics step
    pub fn jump(&self, host: &mut dyn DynentHost) -> Result<(), EntityError> {
        let client = self.client_number.ok_or(EntityError::NotInitialized)?;
        host.set_jumping(client, true)?;
        Ok(())
    }

    /// Roughly the center of gravity; what others aim at
    pub fn center(&self) -> Vec3 {
        self.hooks.center(&self.fields)
    }

    /// Set the action animation, starting it at `now`
    pub fn set_animation(&mut self, animation: AnimationCode, now: FrameTimestamp) {
        self.fields.animation.write(animation);
        self.fields.animation_start = now;
    }

    /// Copy the native dynent's state into the mirrored fields. Returns false
    /// if the engine has no dynent for this character.
    pub fn sync_from_host(&mut self, host: &dyn DynentHost) -> bool {
        let Some(state) = self.client_number.and_then(|cn| host.dynent_state(cn)) else {
            return false;
        };
        self.fields.store_native(&state);
        true
    }

    /// Push changes to fields that need explicit sync
    pub fn flush_custom_sync(&mut self, sink: &mut dyn StateSync) -> usize {
        match self.id {
            Some(id) => self.fields.flush(id, sink, true),
            None => 0,
        }
    }

    /// Push every queued change
    pub fn flush_queued_changes(&mut self, sink: &mut dyn StateSync) -> usize {
        match self.id {
            Some(id) => self.fields.flush(id, sink, false),
            None => 0,
        }
    }

    /// Animation to show, given the current state
    pub fn decide_animation(&self) -> AnimationCode {
        let action = self.hooks.decide_action_animation(&self.fields);
        self.hooks
            .decide_animation(&self.fields.motion_state(), action)
    }

    /// Render arguments for the frame in `ctx`, computed at most once per
    /// frame. `None` means nothing should be drawn.
    pub fn render_args(&mut self, ctx: &RenderContext) -> Option<&RenderArgs> {
        if !self.initialized {
            return None;
        }
        let id = self.id?;

        if ctx.hud_pass != ctx.need_hud {
            return None;
        }

        if !self.render_cache.is_fresh(ctx.now) {
            let client_state = ClientState::from_raw(self.fields.client_state.read());
            if client_state.is_some_and(|state| state.is_hidden()) {
                return None;
            }

            let args = self.build_render_args(id, client_state, ctx);
            self.render_cache.store(ctx.now, args);
        }

        self.render_cache.get(ctx.now)
    }

    /// Draw this character for the frame in `ctx`
    pub fn render_dynamic(&mut self, ctx: &RenderContext, renderer: &mut dyn ModelRenderer) {
        if let Some(args) = self.render_args(ctx) {
            renderer.render_model(args);
        }
    }

    fn build_render_args(
        &self,
        id: EntityId,
        client_state: Option<ClientState>,
        ctx: &RenderContext,
    ) -> RenderArgs {
        let model_name = if ctx.hud_pass && ctx.need_hud {
            self.fields.hud_model_name.read()
        } else {
            self.fields.model_name.read()
        };

        let mut flags = ModelFlags::LIGHT;
        if !ctx.is_local_player(id) {
            flags |= ModelFlags::CULL_VFC | ModelFlags::CULL_OCCLUDED | ModelFlags::CULL_QUERY;
        }
        flags |= ModelFlags::FULLBRIGHT;

        let fade = if client_state == Some(ClientState::Lagged) {
            LAGGED_FADE
        } else {
            flags |= ModelFlags::DYNSHADOW;
            1.0
        };

        RenderArgs {
            entity: id,
            model_name,
            animation: self.decide_animation(),
            position: self.fields.position.read(),
            yaw: self.fields.yaw.read() + 90.0,
            pitch: self.fields.pitch.read(),
            flags,
            base_time: self.fields.animation_start,
            fade,
        }
    }
}

impl DynamicEntity for Character {
    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn unique_id(&self) -> Option<EntityId> {
        self.id
    }

    fn init(&mut self, id: EntityId, params: &EntityParams) {
        Character::init(self, id, params);
    }

    fn activate(
        &mut self,
        params: &EntityParams,
        host: &mut dyn DynentHost,
        sync: &mut dyn StateSync,
    ) -> Result<(), EntityError> {
        Character::activate(self, params, host, sync)
    }

    fn client_activate(
        &mut self,
        params: &EntityParams,
        host: &mut dyn DynentHost,
    ) -> Result<(), EntityError> {
        Character::client_activate(self, params, host)
    }

    fn deactivate(&mut self, host: &mut dyn DynentHost) {
        Character::deactivate(self, host);
    }

    fn client_deactivate(&mut self, host: &mut dyn DynentHost) {
        Character::deactivate(self, host);
    }

    fn act(&mut self, seconds: f32, actions: &mut dyn ActionSystem) {
        Character::act(self, seconds, actions);
    }

    fn render_dynamic(&mut self, ctx: &RenderContext, renderer: &mut dyn ModelRenderer) {
        Character::render_dynamic(self, ctx, renderer);
    }
}
