use std::f64::consts::FRAC_PI_2;
use std::time::Instant;

use ratatui::style::Color;

use super::projectile::Missile;
use super::{Entity, EntityContext};
use crate::config::Tuning;
use crate::geometry::{Point, rotate, translate};
use crate::input::Action;
use crate::surface::DrawSurface;
use crate::world::WorldEvent;

/// Ship triangle relative to its centre: left wing, nose, right wing.
pub const SHIP_OUTLINE: [Point; 3] = [
    Point::new(-8.0, 9.0),
    Point::new(0.0, -10.0),
    Point::new(8.0, 9.0),
];

#[derive(Debug, Clone)]
pub struct Player {
    pub center: Point,
    /// Facing in radians; 0 points up the screen
    pub angle: f64,
    pub size: f64,
    /// Accumulated thrust. Never decays, so the ship drifts until countered.
    pub heading: Point,
    pub thrust_accel: f64,
    pub velocity: Point,
    pub last_shot: Option<Instant>,
    /// Unrotated outline; the facing is applied only when drawing
    pub points: Vec<Point>,
}

impl Player {
    pub fn new(center: Point, tuning: &Tuning) -> Self {
        Self {
            center,
            angle: 0.0,
            size: tuning.player_size,
            heading: Point::default(),
            thrust_accel: tuning.player_thrust,
            velocity: Point::default(),
            last_shot: None,
            points: outline_at(center),
        }
    }

    /// Unit vector the nose points along.
    pub fn facing(&self) -> Point {
        let (sin, cos) = (self.angle - FRAC_PI_2).sin_cos();
        Point::new(cos, sin)
    }

    pub fn can_fire(&self, now: Instant, tuning: &Tuning) -> bool {
        self.last_shot
            .is_none_or(|shot| now.duration_since(shot) > tuning.shot_cooldown())
    }

    pub fn update(&mut self, ctx: &mut EntityContext) {
        let tuning = ctx.tuning;

        if ctx.input.is_action_held(Action::TurnLeft) {
            self.angle -= tuning.player_turn_rate;
        } else if ctx.input.is_action_held(Action::TurnRight) {
            self.angle += tuning.player_turn_rate;
        }

        if ctx.input.is_action_held(Action::Fire) && self.can_fire(ctx.now, tuning) {
            let facing = self.facing();
            let velocity = Point::new(
                facing.x * tuning.missile_speed,
                facing.y * tuning.missile_speed,
            );
            self.last_shot = Some(ctx.now);
            ctx.commands.spawn(Entity::Missile(Missile::new(
                self.center,
                self.angle,
                velocity,
                tuning,
            )));
            ctx.commands.emit(WorldEvent::MissileFired);
        }

        if ctx.input.is_action_held(Action::Thrust) {
            let facing = self.facing();
            self.heading.x += facing.x * self.thrust_accel;
            self.heading.y += facing.y * self.thrust_accel;
        }

        self.velocity = self.heading;
        self.center = translate(self.center, self.velocity);
        self.points = outline_at(self.center);
    }

    pub fn render(&self, surface: &mut dyn DrawSurface) {
        surface.begin_path();
        for (i, point) in self.points.iter().enumerate() {
            let turned = rotate(*point, self.center, self.angle);
            if i == 0 {
                surface.move_to(turned);
            } else {
                surface.line_to(turned);
            }
        }
        surface.set_line_width(1.0);
        surface.set_stroke_color(Color::White);
        surface.stroke();
        surface.close_path();
    }

    /// The ship is lost: score resets and a fresh ship appears at the centre.
    pub fn on_collision(&self, ctx: &mut EntityContext) {
        ctx.commands.remove(ctx.id);
        ctx.commands.emit(WorldEvent::PlayerDestroyed {
            position: self.center,
        });
        ctx.commands.reset_score();
        ctx.commands.spawn(Entity::Player(Player::new(
            ctx.viewport.center(),
            ctx.tuning,
        )));
    }
}

fn outline_at(center: Point) -> Vec<Point> {
    SHIP_OUTLINE
        .iter()
        .map(|offset| translate(center, *offset))
        .collect()
}
