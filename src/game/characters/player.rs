// Player character
//
// The class used for player characters unless the application picks another.
// Same as a Character, plus the server-granted edit permission.

use log::debug;

use crate::engine::entity::{DynamicEntity, EntityError, EntityId, EntityParams};
use crate::engine::host::{ActionSystem, DynentHost};
use crate::engine::render::{ModelRenderer, RenderContext};
use crate::engine::replicated::{ReplicatedField, StateSync};

use super::character::{Character, CharacterHooks};

#[derive(Debug)]
pub struct Player {
    character: Character,
    /// Set by the server when this player may edit the map
    can_edit: ReplicatedField<bool>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub const CLASS_NAME: &'static str = "Player";

    pub fn new() -> Self {
        Self::from_character(Character::new())
    }

    /// Player with custom behavior
    pub fn with_hooks(hooks: Box<dyn CharacterHooks>) -> Self {
        Self::from_character(Character::with_hooks(hooks))
    }

    fn from_character(character: Character) -> Self {
        Self {
            character,
            can_edit: ReplicatedField::scheduled("can_edit", false),
        }
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    pub fn can_edit(&self) -> bool {
        self.can_edit.read()
    }

    /// Grant or revoke edit permission (server side)
    pub fn set_can_edit(&mut self, can_edit: bool) {
        self.can_edit.write(can_edit);
    }

    fn flush_can_edit(&mut self, sync: &mut dyn StateSync) {
        if let Some(id) = self.character.id() {
            self.can_edit.flush_to(id, sync);
        }
    }

    /// Push every queued change, edit permission included
    pub fn flush_queued_changes(&mut self, sync: &mut dyn StateSync) -> usize {
        let mut sent = self.character.flush_queued_changes(sync);
        if let Some(id) = self.character.id() {
            if self.can_edit.flush_to(id, sync) {
                sent += 1;
            }
        }
        sent
    }
}

impl DynamicEntity for Player {
    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn unique_id(&self) -> Option<EntityId> {
        self.character.id()
    }

    fn init(&mut self, id: EntityId, params: &EntityParams) {
        debug!("Initializing player {}", id);
        self.character.init(id, params);
        self.can_edit.write(false);
    }

    fn activate(
        &mut self,
        params: &EntityParams,
        host: &mut dyn DynentHost,
        sync: &mut dyn StateSync,
    ) -> Result<(), EntityError> {
        self.character.activate(params, host, sync)?;
        self.flush_can_edit(sync);
        Ok(())
    }

    fn client_activate(
        &mut self,
        params: &EntityParams,
        host: &mut dyn DynentHost,
    ) -> Result<(), EntityError> {
        self.character.client_activate(params, host)
    }

    fn deactivate(&mut self, host: &mut dyn DynentHost) {
        self.character.deactivate(host);
    }

    fn client_deactivate(&mut self, host: &mut dyn DynentHost) {
        self.character.deactivate(host);
    }

    fn act(&mut self, seconds: f32, actions: &mut dyn ActionSystem) {
        self.character.act(seconds, actions);
    }

    fn render_dynamic(&mut self, ctx: &RenderContext, renderer: &mut dyn ModelRenderer) {
        self.character.render_dynamic(ctx, renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::entity::ClientNumber;
    use crate::engine::frame::FrameTimestamp;
    use crate::engine::host::LocalHost;
    use crate::engine::render::RenderArgs;
    use crate::engine::replicated::{FieldChange, FieldValue};

    const ID: EntityId = EntityId(3);

    #[test]
    fn test_player_class() {
        let player = Player::new();
        assert_eq!(player.class_name(), "Player");
        assert_eq!(player.unique_id(), None);
    }

    #[test]
    fn test_init_denies_editing() {
        let mut player = Player::new();
        player.init(ID, &EntityParams::default());
        assert!(!player.can_edit());
        assert_eq!(player.character().fields().name.read(), "-?-");
        assert_eq!(player.unique_id(), Some(ID));
    }

    #[test]
    fn test_activate_sends_can_edit() {
        let mut host = LocalHost::new();
        let mut sink: Vec<FieldChange> = Vec::new();
        let mut player = Player::new();
        player.init(ID, &EntityParams::default());
        player
            .activate(&EntityParams::with_client_number(0), &mut host, &mut sink)
            .unwrap();

        assert_eq!(player.character().client_number(), Some(ClientNumber(0)));
        let can_edit = sink.iter().find(|c| c.field == "can_edit").unwrap();
        assert_eq!(can_edit.value, FieldValue::Bool(false));
    }

    #[test]
    fn test_grant_edit() {
        let mut host = LocalHost::new();
        let mut sink: Vec<FieldChange> = Vec::new();
        let mut player = Player::new();
        player.init(ID, &EntityParams::default());
        player
            .activate(&EntityParams::with_client_number(0), &mut host, &mut sink)
            .unwrap();

        sink.clear();
        player.set_can_edit(true);
        assert!(player.can_edit());
        assert_eq!(player.flush_queued_changes(&mut sink), 1);
        assert_eq!(sink[0].value, FieldValue::Bool(true));
    }

    #[test]
    fn test_activate_failure_propagates() {
        let mut host = LocalHost::new();
        let mut sink: Vec<FieldChange> = Vec::new();
        let mut player = Player::new();
        player.init(ID, &EntityParams::default());
        let result = player.activate(&EntityParams::default(), &mut host, &mut sink);
        assert!(matches!(
            result,
            Err(EntityError::MissingClientNumber { raw: None, .. })
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_player_renders_like_character() {
        let mut host = LocalHost::new();
        let mut player = Player::new();
        player.init(ID, &EntityParams::default());
        player
            .client_activate(&EntityParams::default(), &mut host)
            .unwrap();

        let mut renderer: Vec<RenderArgs> = Vec::new();
        let ctx = RenderContext::world(FrameTimestamp::from_millis(1), Some(ID));
        player.render_dynamic(&ctx, &mut renderer);
        assert_eq!(renderer.len(), 1);
        assert_eq!(renderer[0].entity, ID);

        player.client_deactivate(&mut host);
        assert_eq!(host.dynent_count(), 0);
    }
}
