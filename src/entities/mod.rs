mod enemy;
mod player;
mod projectile;

use std::borrow::Cow;
use std::time::Instant;

use rand::rngs::StdRng;

use crate::config::Tuning;
use crate::geometry::Point;
use crate::input::ActionSource;
use crate::surface::DrawSurface;
use crate::world::{CommandQueue, Viewport};

// Re-export all public types
pub use enemy::{ENEMY_PALETTE, Enemy};
pub use player::{Player, SHIP_OUTLINE};
pub use projectile::Missile;

/// Shell-level state of the running game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Paused,
}

/// Stable handle for an entity owned by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Variant tag used to partition entities for collision checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Enemy,
    Missile,
}

/// Everything an entity may touch while it updates or resolves a collision.
///
/// Entities never mutate the entity list directly: spawns, removals and score
/// changes go through `commands` and are applied by the world between phases.
pub struct EntityContext<'a> {
    pub id: EntityId,
    pub now: Instant,
    pub viewport: Viewport,
    pub tuning: &'a Tuning,
    pub input: &'a dyn ActionSource,
    pub rng: &'a mut StdRng,
    pub commands: &'a mut CommandQueue,
}

#[derive(Debug, Clone)]
pub enum Entity {
    Player(Player),
    Enemy(Enemy),
    Missile(Missile),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Player(_) => EntityKind::Player,
            Entity::Enemy(_) => EntityKind::Enemy,
            Entity::Missile(_) => EntityKind::Missile,
        }
    }

    pub fn center(&self) -> Point {
        match self {
            Entity::Player(player) => player.center,
            Entity::Enemy(enemy) => enemy.center,
            Entity::Missile(missile) => missile.center,
        }
    }

    pub fn angle(&self) -> f64 {
        match self {
            Entity::Player(player) => player.angle,
            Entity::Enemy(enemy) => enemy.angle,
            Entity::Missile(missile) => missile.angle,
        }
    }

    pub fn size(&self) -> f64 {
        match self {
            Entity::Player(player) => player.size,
            Entity::Enemy(enemy) => enemy.size,
            Entity::Missile(missile) => missile.size,
        }
    }

    /// Stored world-space polyline.
    pub fn points(&self) -> &[Point] {
        match self {
            Entity::Player(player) => &player.points,
            Entity::Enemy(enemy) => &enemy.points,
            Entity::Missile(missile) => &missile.points,
        }
    }

    /// Polyline tested for collisions; segments are the pairs at even offsets.
    pub fn collision_points(&self) -> Cow<'_, [Point]> {
        match self {
            Entity::Player(player) => Cow::Borrowed(&player.points),
            Entity::Enemy(enemy) => Cow::Borrowed(&enemy.points),
            Entity::Missile(missile) => Cow::Owned(missile.oriented_points().to_vec()),
        }
    }

    pub fn update(&mut self, ctx: &mut EntityContext) {
        match self {
            Entity::Player(player) => player.update(ctx),
            Entity::Enemy(enemy) => enemy.update(),
            Entity::Missile(missile) => missile.update(),
        }
    }

    pub fn render(&self, surface: &mut dyn DrawSurface) {
        match self {
            Entity::Player(player) => player.render(surface),
            Entity::Enemy(enemy) => enemy.render(surface),
            Entity::Missile(missile) => missile.render(surface),
        }
    }

    /// Applies the variant's boundary policy: ships and enemies wrap around,
    /// missiles leaving the viewport remove themselves.
    pub fn check_bounds(&mut self, ctx: &mut EntityContext) {
        match self {
            Entity::Player(player) => {
                wrap_around(&mut player.center, player.size / 2.0, ctx.viewport);
            }
            Entity::Enemy(enemy) => {
                wrap_around(&mut enemy.center, enemy.size / 2.0, ctx.viewport);
            }
            Entity::Missile(missile) => missile.check_bounds(ctx),
        }
    }

    pub fn on_collision(&self, ctx: &mut EntityContext) {
        match self {
            Entity::Player(player) => player.on_collision(ctx),
            Entity::Enemy(enemy) => enemy.on_collision(ctx),
            Entity::Missile(missile) => missile.on_collision(ctx),
        }
    }
}

/// Toroidal boundary policy.
///
/// Once the `half_size` box around `center` has fully left an edge, the centre
/// is placed just outside the opposite edge so it slides back in. Returns true
/// when the centre moved.
pub fn wrap_around(center: &mut Point, half_size: f64, viewport: Viewport) -> bool {
    let before = *center;

    // Compared against the exact values assigned below so a wrapped centre
    // never trips the opposite test on the next call.
    if center.x < -half_size {
        center.x = viewport.width + half_size;
    }
    if center.x > viewport.width + half_size {
        center.x = -half_size;
    }
    if center.y < -half_size {
        center.y = viewport.height + half_size;
    }
    if center.y > viewport.height + half_size {
        center.y = -half_size;
    }

    *center != before
}

/// True once the `half_size` box around `center` lies completely outside the
/// viewport on any side.
pub fn is_outside(center: Point, half_size: f64, viewport: Viewport) -> bool {
    center.x < -half_size
        || center.x > viewport.width + half_size
        || center.y < -half_size
        || center.y > viewport.height + half_size
}
