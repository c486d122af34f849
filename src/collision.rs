//! Polyline collision detection between typed entity groups.
//!
//! Every enemy is tested against the ship and every missile. Two entities
//! collide when any segment of one crosses any segment of the other. There is
//! no broad phase; entity counts stay in the low hundreds.

use std::collections::HashSet;

use crate::entities::{Entity, EntityId, EntityKind};
use crate::geometry::{Point, is_intersecting, segments};

/// True when any segment of `a` crosses any segment of `b`.
pub fn polylines_intersect(a: &[Point], b: &[Point]) -> bool {
    segments(a).any(|(a1, a2)| segments(b).any(|(b1, b2)| is_intersecting(a1, a2, b1, b2)))
}

/// Segment test between two entities. An entity never collides with itself.
pub fn check_entity_collision(a: (EntityId, &Entity), b: (EntityId, &Entity)) -> bool {
    if a.0 == b.0 {
        return false;
    }
    polylines_intersect(&a.1.collision_points(), &b.1.collision_points())
}

/// Scans a snapshot of the world and returns every entity involved in at least
/// one collision, each listed once in the order first detected.
pub fn detect_collisions(entities: &[(EntityId, Entity)]) -> Vec<EntityId> {
    let mut player = None;
    let mut missiles = Vec::new();
    let mut enemies = Vec::new();

    for (id, entity) in entities {
        match entity.kind() {
            EntityKind::Player => player = Some((*id, entity)),
            EntityKind::Missile => missiles.push((*id, entity)),
            EntityKind::Enemy => enemies.push((*id, entity)),
        }
    }

    let mut seen = HashSet::new();
    let mut hits = Vec::new();
    let mut flag = |id: EntityId| {
        if seen.insert(id) {
            hits.push(id);
        }
    };

    for &enemy in &enemies {
        if let Some(player) = player
            && check_entity_collision(enemy, player)
        {
            flag(enemy.0);
            flag(player.0);
        }
        for &missile in &missiles {
            if check_entity_collision(enemy, missile) {
                flag(enemy.0);
                flag(missile.0);
            }
        }
    }

    hits
}
