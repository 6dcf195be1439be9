use anyhow::{Context, Result};
use log::info;

use dynent_character::engine::entity::{DynamicEntity, EntityId, EntityParams};
use dynent_character::engine::frame::FrameClock;
use dynent_character::engine::host::{LocalHost, NoActions};
use dynent_character::engine::registry::EntityRegistry;
use dynent_character::engine::render::{LogRenderer, RenderContext};
use dynent_character::game::characters::animation::{AnimationCode, ANIM_IDLE, ANIM_LOOP};
use dynent_character::game::characters::{register_character_classes, Character, Player};

/// Simulated frame length
const FRAME_MILLIS: i64 = 16;
const FRAMES: i64 = 90;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting dynent character demo...");

    let mut registry = EntityRegistry::new();
    register_character_classes(&mut registry)?;
    info!("Registered entity classes: {:?}", registry);

    let mut host = LocalHost::new();
    let mut clock = FrameClock::new();
    let mut renderer = LogRenderer::new();

    // The local player, created through the registry like any other class
    let player_id = EntityId(1);
    let mut player = registry.create(Player::CLASS_NAME)?;
    player.init(player_id, &EntityParams::default());
    player
        .client_activate(&EntityParams::default(), &mut host)
        .context("activating player")?;

    // An NPC, connected locally by the host
    let npc_id = EntityId(2);
    let mut npc = Character::new();
    npc.init(npc_id, &EntityParams::default());
    npc.client_activate(&EntityParams::default(), &mut host)
        .context("activating NPC")?;
    npc.set_animation(AnimationCode::new(ANIM_IDLE | ANIM_LOOP), clock.now());

    // Send spawn defaults and intents to the native engine
    npc.fields_mut().set_move(1);
    npc.flush_queued_changes(&mut host);

    for frame in 0..FRAMES {
        let now = clock.begin_frame_at(frame * FRAME_MILLIS);
        let seconds = FRAME_MILLIS as f32 / 1000.0;

        if frame == 30 {
            npc.jump(&mut host)?;
            info!("NPC jumps at {}", now);
        }

        host.simulate(seconds);
        npc.sync_from_host(&host);
        npc.act(seconds, &mut NoActions);
        player.act(seconds, &mut NoActions);
        npc.flush_custom_sync(&mut host);

        // Two passes per frame; the second reuses cached arguments
        let ctx = RenderContext::world(now, Some(player_id));
        for _pass in 0..2 {
            player.render_dynamic(&ctx, &mut renderer);
            npc.render_dynamic(&ctx, &mut renderer);
        }

        if frame % 15 == 0 {
            let fields = npc.fields();
            info!(
                "{} NPC at ({:.1}, {:.1}, {:.1}) showing {}",
                now,
                fields.position.get().x,
                fields.position.get().y,
                fields.position.get().z,
                npc.decide_animation()
            );
        }
    }

    info!(
        "Ran {} frames, {} draw calls, {} live dynents",
        clock.frame_count(),
        renderer.draw_calls(),
        host.dynent_count()
    );

    npc.deactivate(&mut host);
    player.client_deactivate(&mut host);
    info!("Shut down, {} live dynents", host.dynent_count());

    Ok(())
}
