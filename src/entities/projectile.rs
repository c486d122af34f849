use ratatui::style::Color;

use super::{EntityContext, is_outside};
use crate::config::Tuning;
use crate::geometry::{Point, rotate, translate};
use crate::surface::DrawSurface;

#[derive(Debug, Clone)]
pub struct Missile {
    pub center: Point,
    /// Firing angle; orients the trail, never changes after launch
    pub angle: f64,
    pub size: f64,
    pub velocity: Point,
    pub length: f64,
    /// Head and unrotated tail
    pub points: Vec<Point>,
}

impl Missile {
    pub fn new(center: Point, angle: f64, velocity: Point, tuning: &Tuning) -> Self {
        let length = tuning.missile_length;
        Self {
            center,
            angle,
            size: tuning.missile_size,
            velocity,
            length,
            points: trail_at(center, length),
        }
    }

    /// The 2-point line turned to the firing angle.
    pub fn oriented_points(&self) -> [Point; 2] {
        [
            rotate(self.points[0], self.center, self.angle),
            rotate(self.points[1], self.center, self.angle),
        ]
    }

    pub fn update(&mut self) {
        self.center = translate(self.center, self.velocity);
        self.points = trail_at(self.center, self.length);
    }

    pub fn render(&self, surface: &mut dyn DrawSurface) {
        let [head, tail] = self.oriented_points();
        surface.begin_path();
        surface.move_to(head);
        surface.line_to(tail);
        surface.set_line_width(1.0);
        surface.set_stroke_color(Color::White);
        surface.stroke();
        surface.close_path();
    }

    /// Missiles do not wrap; once off screen they are gone.
    pub fn check_bounds(&self, ctx: &mut EntityContext) {
        if is_outside(self.center, self.size / 2.0, ctx.viewport) {
            ctx.commands.remove(ctx.id);
        }
    }

    pub fn on_collision(&self, ctx: &mut EntityContext) {
        ctx.commands.remove(ctx.id);
    }
}

fn trail_at(center: Point, length: f64) -> Vec<Point> {
    vec![center, Point::new(center.x, center.y + length)]
}
