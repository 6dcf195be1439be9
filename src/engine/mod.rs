// Engine boundary: frame timing, native dynent host, replication, rendering
// and entity registration

pub mod entity;
pub mod frame;
pub mod host;
pub mod registry;
pub mod render;
pub mod replicated;
