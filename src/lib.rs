//! Demesne - Territorial & Diplomatic State Engine

pub mod core;
pub mod entity;
pub mod events;
pub mod runtime;
pub mod snapshot;
pub mod spatial;
pub mod systems;
pub mod timer;
pub mod world;

pub use crate::core::config::EngineConfig;
pub use crate::world::World;
