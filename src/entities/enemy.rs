use rand::Rng;
use rand::rngs::StdRng;
use ratatui::style::Color;
use std::f64::consts::TAU;

use super::{Entity, EntityContext};
use crate::config::Tuning;
use crate::geometry::{Point, translate};
use crate::shape::generate_logo;
use crate::surface::DrawSurface;
use crate::world::WorldEvent;

/// Stroke colours an enemy can be drawn in.
pub const ENEMY_PALETTE: [Color; 6] = [
    Color::Rgb(0xFF, 0xC1, 0x07),
    Color::Rgb(0xF4, 0x43, 0x36),
    Color::Rgb(0xD6, 0x17, 0x71),
    Color::Rgb(0x18, 0xBE, 0xE5),
    Color::Rgb(0x1B, 0xB3, 0x7A),
    Color::Rgb(0x8B, 0xC3, 0x4A),
];

#[derive(Debug, Clone)]
pub struct Enemy {
    pub center: Point,
    pub angle: f64,
    /// Width of the logo; doubles as the enemy's mass
    pub size: f64,
    /// Radians added to `angle` every tick
    pub spin: f64,
    pub velocity: Point,
    pub color: Color,
    pub points: Vec<Point>,
}

impl Enemy {
    /// Creates an enemy with random facing, spin, colour and drift.
    ///
    /// Without an explicit `size` the enemy is between `enemy_min_size` and
    /// `enemy_min_size + enemy_size_spread`. Drift speed scales with
    /// `enemy_min_size / size`, so fragments are faster than their parent.
    pub fn new(center: Point, size: Option<f64>, tuning: &Tuning, rng: &mut StdRng) -> Self {
        let size = size
            .unwrap_or_else(|| tuning.enemy_min_size + tuning.enemy_size_spread * rng.random::<f64>());
        let angle = rng.random::<f64>() * TAU;
        let spin = (rng.random::<f64>() - 0.5) * 2.0 * tuning.enemy_max_spin;
        let max_velocity = tuning.enemy_min_size / size;
        let velocity = Point::new(
            rng.random::<f64>() * max_velocity - max_velocity / 2.0,
            rng.random::<f64>() * max_velocity - max_velocity / 2.0,
        );
        let color = ENEMY_PALETTE[rng.random_range(0..ENEMY_PALETTE.len())];

        Self::with_motion(center, size, angle, spin, velocity, color)
    }

    /// Creates an enemy with fully specified motion.
    pub fn with_motion(
        center: Point,
        size: f64,
        angle: f64,
        spin: f64,
        velocity: Point,
        color: Color,
    ) -> Self {
        Self {
            center,
            angle,
            size,
            spin,
            velocity,
            color,
            points: generate_logo(center, angle, size),
        }
    }

    /// Points awarded for destroying this enemy; smaller enemies pay more.
    pub fn kill_score(&self) -> u64 {
        ((1000.0 / self.size).round() as u64).saturating_mul(10)
    }

    pub fn update(&mut self) {
        self.angle += self.spin;
        self.center = translate(self.center, self.velocity);
        self.points = generate_logo(self.center, self.angle, self.size);
    }

    pub fn render(&self, surface: &mut dyn DrawSurface) {
        surface.begin_path();
        for (i, point) in self.points.iter().enumerate() {
            if i % 2 == 0 {
                surface.move_to(*point);
            } else {
                surface.line_to(*point);
            }
        }
        surface.set_line_width(1.0);
        surface.set_stroke_color(self.color);
        surface.stroke();
        surface.close_path();
    }

    /// Scores the kill and, above the split threshold, leaves two half-size
    /// fragments behind.
    pub fn on_collision(&self, ctx: &mut EntityContext) {
        ctx.commands.add_score(self.kill_score());

        let split = self.size > ctx.tuning.enemy_split_threshold;
        if split {
            let half = self.size / 2.0;
            for _ in 0..2 {
                let child = Enemy::new(self.center, Some(half), ctx.tuning, ctx.rng);
                ctx.commands.spawn(Entity::Enemy(child));
            }
            log::debug!("enemy of size {:.1} split at {:?}", self.size, self.center);
        } else {
            log::debug!("enemy of size {:.1} collapsed", self.size);
        }

        ctx.commands.remove(ctx.id);
        ctx.commands.emit(WorldEvent::EnemyDestroyed {
            size: self.size,
            split,
        });
    }
}
