// Scripted character entities layered over a native dynamic-entity engine

pub mod core;
pub mod engine;
pub mod game;
