// Replicated entity state
//
// A `ReplicatedField` mirrors one value that lives in native engine memory
// and is shared with other clients. Local writes mark the field dirty; the
// owner decides when to push dirty fields through a `StateSync` sink.

use crate::core::math::Vec3;

use super::entity::EntityId;

/// How changes to a field reach other clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncMode {
    /// Sent on the regular state-variable schedule
    Scheduled,
    /// Must be pushed explicitly by the owner (positions, intents, ...)
    Custom,
    /// Applied locally only, never sent
    ClientOnly,
}

/// Value carried by a state change
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i32),
    Float(f32),
    Bool(bool),
    Vector(Vec3),
    Text(String),
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec3> for FieldValue {
    fn from(value: Vec3) -> Self {
        Self::Vector(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One pending change, ready for transport
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub entity: EntityId,
    pub field: &'static str,
    pub value: FieldValue,
}

/// Destination for state changes (network layer, recorder, ...)
pub trait StateSync {
    fn push(&mut self, change: FieldChange);
}

impl StateSync for Vec<FieldChange> {
    fn push(&mut self, change: FieldChange) {
        Vec::push(self, change);
    }
}

/// A value mirrored from native memory and replicated to peers
#[derive(Debug, Clone)]
pub struct ReplicatedField<T> {
    name: &'static str,
    value: T,
    mode: SyncMode,
    dirty: bool,
}

impl<T: Clone + Into<FieldValue>> ReplicatedField<T> {
    pub fn new(name: &'static str, value: T, mode: SyncMode) -> Self {
        Self {
            name,
            value,
            mode,
            dirty: false,
        }
    }

    pub fn scheduled(name: &'static str, value: T) -> Self {
        Self::new(name, value, SyncMode::Scheduled)
    }

    pub fn custom(name: &'static str, value: T) -> Self {
        Self::new(name, value, SyncMode::Custom)
    }

    pub fn client_only(name: &'static str, value: T) -> Self {
        Self::new(name, value, SyncMode::ClientOnly)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Current value
    pub fn read(&self) -> T {
        self.value.clone()
    }

    /// Borrow the current value
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Write a new value and queue it for replication
    pub fn write(&mut self, value: T) {
        self.value = value;
        if self.mode != SyncMode::ClientOnly {
            self.dirty = true;
        }
    }

    /// Store a value that came from the native engine. Not queued, since the
    /// engine already owns it.
    pub fn store_native(&mut self, value: T) {
        self.value = value;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether changes must be pushed explicitly by the owner
    pub fn needs_explicit_sync(&self) -> bool {
        self.mode == SyncMode::Custom
    }

    /// Take the pending change, clearing the dirty flag
    pub fn take_change(&mut self, entity: EntityId) -> Option<FieldChange> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(FieldChange {
            entity,
            field: self.name,
            value: self.value.clone().into(),
        })
    }

    /// Push the pending change, if any, to `sink`. Returns whether one was sent.
    pub fn flush_to(&mut self, entity: EntityId, sink: &mut dyn StateSync) -> bool {
        match self.take_change(entity) {
            Some(change) => {
                sink.push(change);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTITY: EntityId = EntityId(7);

    #[test]
    fn test_new_field_is_clean() {
        let field = ReplicatedField::custom("yaw", 0.0f32);
        assert!(!field.is_dirty());
        assert!(field.needs_explicit_sync());
        assert_eq!(field.read(), 0.0);
    }

    #[test]
    fn test_write_marks_dirty() {
        let mut field = ReplicatedField::scheduled("radius", 3.0f32);
        field.write(4.5);
        assert!(field.is_dirty());
        assert_eq!(field.read(), 4.5);
        assert!(!field.needs_explicit_sync());
    }

    #[test]
    fn test_native_store_is_not_queued() {
        let mut field = ReplicatedField::custom("position", Vec3::ZERO);
        field.store_native(Vec3::new(1.0, 2.0, 3.0));
        assert!(!field.is_dirty());
        assert_eq!(field.read(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_client_only_never_dirty() {
        let mut field = ReplicatedField::client_only("can_move", true);
        field.write(false);
        assert!(!field.is_dirty());
        assert!(!field.read());
        assert_eq!(field.take_change(ENTITY), None);
    }

    #[test]
    fn test_take_change_clears_dirty() {
        let mut field = ReplicatedField::custom("move", 0i32);
        field.write(1);
        let change = field.take_change(ENTITY).unwrap();
        assert_eq!(change.entity, ENTITY);
        assert_eq!(change.field, "move");
        assert_eq!(change.value, FieldValue::Int(1));
        assert!(!field.is_dirty());
        assert_eq!(field.take_change(ENTITY), None);
    }

    #[test]
    fn test_flush_to_sink() {
        let mut sink: Vec<FieldChange> = Vec::new();
        let mut field = ReplicatedField::scheduled("name", String::from("-?-"));
        assert!(!field.flush_to(ENTITY, &mut sink));

        field.write(String::from("stromar"));
        assert!(field.flush_to(ENTITY, &mut sink));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].value, FieldValue::Text(String::from("stromar")));
    }
}
