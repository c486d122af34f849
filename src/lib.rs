// Library exports for testing
pub use config::{GameConfig, Tuning};
pub use entities::{Enemy, Entity, EntityId, EntityKind, GameState, Missile, Player};
pub use geometry::Point;
pub use input::{Action, ActionSource, HeldActions};
pub use surface::{DrawList, DrawSurface};
pub use world::{Viewport, World, WorldEvent};

pub mod app;
pub mod collision;
pub mod config;
pub mod entities;
pub mod geometry;
pub mod input;
pub mod renderer;
pub mod shape;
pub mod surface;
pub mod world;
