// Scripted entity interface
//
// Every entity class registered with the engine implements `DynamicEntity`.
// The engine drives it: init on creation, activate/deactivate around its
// lifetime in the world, act once per logic tick, render_dynamic once or more
// per frame.

use std::fmt;

use super::host::{ActionSystem, DynentHost, HostError};
use super::render::{ModelRenderer, RenderContext};
use super::replicated::StateSync;

/// Unique, persistent identifier of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-session client number handed out by the native engine. Smaller and
/// cheaper to send than an `EntityId`, but changes between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientNumber(pub u32);

impl fmt::Display for ClientNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cn{}", self.0)
    }
}

/// Parameters passed on creation and activation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityParams {
    /// Raw client number; negative or absent means "not logged in yet"
    pub client_number: Option<i32>,
}

impl EntityParams {
    pub fn with_client_number(client_number: i32) -> Self {
        Self {
            client_number: Some(client_number),
        }
    }

    /// The client number, if present and valid
    pub fn valid_client_number(&self) -> Option<ClientNumber> {
        self.client_number
            .and_then(|raw| u32::try_from(raw).ok())
            .map(ClientNumber)
    }
}

/// Lifecycle errors raised by entities
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    #[error("Entity {entity} activated without a valid client number (got {raw:?})")]
    MissingClientNumber { entity: EntityId, raw: Option<i32> },

    #[error("Entity used before init or activation")]
    NotInitialized,

    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

/// An entity class the engine can create, drive and render
pub trait DynamicEntity: fmt::Debug {
    /// Registered class name
    fn class_name(&self) -> &'static str;

    /// Unique id assigned in `init`
    fn unique_id(&self) -> Option<EntityId>;

    /// Called once after construction
    fn init(&mut self, id: EntityId, params: &EntityParams);

    /// Server-side activation
    fn activate(
        &mut self,
        params: &EntityParams,
        host: &mut dyn DynentHost,
        sync: &mut dyn StateSync,
    ) -> Result<(), EntityError>;

    /// Client-side activation
    fn client_activate(
        &mut self,
        params: &EntityParams,
        host: &mut dyn DynentHost,
    ) -> Result<(), EntityError>;

    /// Server-side teardown
    fn deactivate(&mut self, host: &mut dyn DynentHost);

    /// Client-side teardown
    fn client_deactivate(&mut self, host: &mut dyn DynentHost);

    /// Think and act for `seconds`
    fn act(&mut self, seconds: f32, actions: &mut dyn ActionSystem);

    /// Draw the entity for the current frame
    fn render_dynamic(&mut self, ctx: &RenderContext, renderer: &mut dyn ModelRenderer);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_client_number() {
        assert_eq!(
            EntityParams::with_client_number(3).valid_client_number(),
            Some(ClientNumber(3))
        );
        assert_eq!(
            EntityParams::with_client_number(-1).valid_client_number(),
            None
        );
        assert_eq!(EntityParams::default().valid_client_number(), None);
    }

    #[test]
    fn test_error_display() {
        let err = EntityError::MissingClientNumber {
            entity: EntityId(4),
            raw: Some(-1),
        };
        assert_eq!(
            err.to_string(),
            "Entity #4 activated without a valid client number (got Some(-1))"
        );
    }
}
