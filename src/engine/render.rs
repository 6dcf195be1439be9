// Model rendering boundary

use log::trace;

use crate::core::math::Vec3;
use crate::game::characters::animation::AnimationCode;

use super::entity::EntityId;
use super::frame::FrameTimestamp;

bitflags::bitflags! {
    /// Per-model render flags understood by the model renderer
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModelFlags: u32 {
        const CULL_VFC      = 1 << 0;
        const CULL_DIST     = 1 << 1;
        const CULL_OCCLUDED = 1 << 2;
        const CULL_QUERY    = 1 << 3;
        const SHADOW        = 1 << 4;
        const DYNSHADOW     = 1 << 5;
        const LIGHT         = 1 << 6;
        const DYNLIGHT      = 1 << 7;
        const FULLBRIGHT    = 1 << 8;
        const NORENDER      = 1 << 9;
        const LIGHT_FAST    = 1 << 10;
        const HUD           = 1 << 11;
        const GHOST         = 1 << 12;
    }
}

/// Everything the model renderer needs to draw one entity
#[derive(Debug, Clone, PartialEq)]
pub struct RenderArgs {
    pub entity: EntityId,
    pub model_name: String,
    pub animation: AnimationCode,
    pub position: Vec3,
    /// Model yaw in degrees (entity yaw + 90)
    pub yaw: f32,
    pub pitch: f32,
    pub flags: ModelFlags,
    /// Timestamp the current animation started at
    pub base_time: FrameTimestamp,
    /// 1.0 opaque
    pub fade: f32,
}

/// Per-pass render context, passed explicitly by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    /// Timestamp of the frame being drawn
    pub now: FrameTimestamp,
    /// Entity the local viewpoint belongs to
    pub local_player: Option<EntityId>,
    /// Whether this is the HUD pass
    pub hud_pass: bool,
    /// Whether the entity being drawn should show as a HUD model (it is the
    /// local player in first person)
    pub need_hud: bool,
}

impl RenderContext {
    /// Regular world pass
    pub fn world(now: FrameTimestamp, local_player: Option<EntityId>) -> Self {
        Self {
            now,
            local_player,
            hud_pass: false,
            need_hud: false,
        }
    }

    /// Same context with HUD settings changed
    pub fn with_hud(self, hud_pass: bool, need_hud: bool) -> Self {
        Self {
            hud_pass,
            need_hud,
            ..self
        }
    }

    /// Whether `entity` is the locally controlled viewpoint
    pub fn is_local_player(&self, entity: EntityId) -> bool {
        self.local_player == Some(entity)
    }
}

/// Model rendering service
pub trait ModelRenderer {
    fn render_model(&mut self, args: &RenderArgs);
}

/// Collects render calls, for recording and inspection
impl ModelRenderer for Vec<RenderArgs> {
    fn render_model(&mut self, args: &RenderArgs) {
        self.push(args.clone());
    }
}

/// Renderer that only logs what it would draw
#[derive(Debug, Default)]
pub struct LogRenderer {
    draw_calls: u64,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }
}

impl ModelRenderer for LogRenderer {
    fn render_model(&mut self, args: &RenderArgs) {
        self.draw_calls += 1;
        trace!(
            "draw {} '{}' anim={} at ({:.1}, {:.1}, {:.1}) yaw={:.1} flags={:?} fade={}",
            args.entity,
            args.model_name,
            args.animation,
            args.position.x,
            args.position.y,
            args.position.z,
            args.yaw,
            args.flags,
            args.fade
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_args() -> RenderArgs {
        RenderArgs {
            entity: EntityId(1),
            model_name: String::from("stromar"),
            animation: AnimationCode::default(),
            position: Vec3::ZERO,
            yaw: 90.0,
            pitch: 0.0,
            flags: ModelFlags::LIGHT,
            base_time: FrameTimestamp::default(),
            fade: 1.0,
        }
    }

    #[test]
    fn test_flag_values() {
        assert_eq!(ModelFlags::CULL_VFC.bits(), 1);
        assert_eq!(ModelFlags::DYNSHADOW.bits(), 32);
        assert_eq!(ModelFlags::LIGHT.bits(), 64);
        assert_eq!(ModelFlags::FULLBRIGHT.bits(), 256);
    }

    #[test]
    fn test_local_player_query() {
        let ctx = RenderContext::world(FrameTimestamp::from_millis(5), Some(EntityId(2)));
        assert!(ctx.is_local_player(EntityId(2)));
        assert!(!ctx.is_local_player(EntityId(3)));

        let nobody = RenderContext::world(FrameTimestamp::from_millis(5), None);
        assert!(!nobody.is_local_player(EntityId(2)));
    }

    #[test]
    fn test_with_hud_keeps_frame() {
        let ctx = RenderContext::world(FrameTimestamp::from_millis(9), None).with_hud(true, true);
        assert_eq!(ctx.now, FrameTimestamp::from_millis(9));
        assert!(ctx.hud_pass);
        assert!(ctx.need_hud);
    }

    #[test]
    fn test_recording_renderer() {
        let mut calls: Vec<RenderArgs> = Vec::new();
        calls.render_model(&sample_args());
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model_name, "stromar");
    }

    #[test]
    fn test_log_renderer_counts() {
        let mut renderer = LogRenderer::new();
        renderer.render_model(&sample_args());
        renderer.render_model(&sample_args());
        assert_eq!(renderer.draw_calls(), 2);
    }
}
