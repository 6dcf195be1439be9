// Game-side entity classes

pub mod characters;
