//! Drawing surface the simulation renders into.
//!
//! Entities speak a small path-drawing vocabulary (begin, move, line, stroke)
//! and never read anything back. [`DrawList`] implements it by recording the
//! stroked segments and text so a backend can paint them later.

use ratatui::style::Color;

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    /// The anchor is the top edge of the text
    Hanging,
    Middle,
    Bottom,
}

pub trait DrawSurface {
    /// Wipes everything drawn so far.
    fn clear(&mut self);
    /// Discards the current path and starts a new one.
    fn begin_path(&mut self);
    fn move_to(&mut self, point: Point);
    fn line_to(&mut self, point: Point);
    fn set_stroke_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f64);
    /// Draws the current path with the current stroke style.
    fn stroke(&mut self);
    /// Joins the current point back to the start of its subpath.
    fn close_path(&mut self);
    fn draw_text(&mut self, text: &str, at: Point, align: TextAlign, baseline: TextBaseline);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokedLine {
    pub from: Point,
    pub to: Point,
    pub color: Color,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub at: Point,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub color: Color,
}

/// Records stroked geometry for later painting.
#[derive(Debug, Clone)]
pub struct DrawList {
    lines: Vec<StrokedLine>,
    texts: Vec<TextItem>,
    path: Vec<(Point, Point)>,
    cursor: Option<Point>,
    subpath_start: Option<Point>,
    color: Color,
    width: f64,
}

impl Default for DrawList {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            texts: Vec::new(),
            path: Vec::new(),
            cursor: None,
            subpath_start: None,
            color: Color::White,
            width: 1.0,
        }
    }
}

impl DrawList {
    pub fn lines(&self) -> &[StrokedLine] {
        &self.lines
    }

    pub fn texts(&self) -> &[TextItem] {
        &self.texts
    }
}

impl DrawSurface for DrawList {
    fn clear(&mut self) {
        self.lines.clear();
        self.texts.clear();
        self.begin_path();
    }

    fn begin_path(&mut self) {
        self.path.clear();
        self.cursor = None;
        self.subpath_start = None;
    }

    fn move_to(&mut self, point: Point) {
        self.cursor = Some(point);
        self.subpath_start = Some(point);
    }

    fn line_to(&mut self, point: Point) {
        match self.cursor {
            Some(from) => self.path.push((from, point)),
            // A line with no current point behaves like a move.
            None => self.subpath_start = Some(point),
        }
        self.cursor = Some(point);
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.width = width;
    }

    fn stroke(&mut self) {
        let (color, width) = (self.color, self.width);
        self.lines
            .extend(self.path.iter().map(|&(from, to)| StrokedLine {
                from,
                to,
                color,
                width,
            }));
    }

    fn close_path(&mut self) {
        if let (Some(from), Some(start)) = (self.cursor, self.subpath_start)
            && from != start
        {
            self.path.push((from, start));
            self.cursor = Some(start);
        }
    }

    fn draw_text(&mut self, text: &str, at: Point, align: TextAlign, baseline: TextBaseline) {
        self.texts.push(TextItem {
            text: text.to_string(),
            at,
            align,
            baseline,
            color: self.color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_records_path_segments() {
        let mut list = DrawList::default();
        list.begin_path();
        list.move_to(Point::new(0.0, 0.0));
        list.line_to(Point::new(1.0, 0.0));
        list.line_to(Point::new(1.0, 1.0));
        list.set_stroke_color(Color::Red);
        list.stroke();

        assert_eq!(list.lines().len(), 2);
        assert_eq!(list.lines()[1].from, Point::new(1.0, 0.0));
        assert_eq!(list.lines()[1].color, Color::Red);
    }

    #[test]
    fn test_move_to_breaks_the_path() {
        let mut list = DrawList::default();
        list.begin_path();
        list.move_to(Point::new(0.0, 0.0));
        list.line_to(Point::new(1.0, 0.0));
        list.move_to(Point::new(5.0, 5.0));
        list.line_to(Point::new(6.0, 5.0));
        list.stroke();

        let froms: Vec<_> = list.lines().iter().map(|l| l.from).collect();
        assert_eq!(froms, vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)]);
    }

    #[test]
    fn test_close_after_stroke_is_not_drawn() {
        let mut list = DrawList::default();
        list.begin_path();
        list.move_to(Point::new(0.0, 0.0));
        list.line_to(Point::new(1.0, 0.0));
        list.line_to(Point::new(1.0, 1.0));
        list.stroke();
        list.close_path();
        list.begin_path();
        list.stroke();

        assert_eq!(list.lines().len(), 2);
    }

    #[test]
    fn test_close_before_stroke_is_drawn() {
        let mut list = DrawList::default();
        list.begin_path();
        list.move_to(Point::new(0.0, 0.0));
        list.line_to(Point::new(1.0, 0.0));
        list.line_to(Point::new(1.0, 1.0));
        list.close_path();
        list.stroke();

        assert_eq!(list.lines().len(), 3);
        assert_eq!(list.lines()[2].to, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut list = DrawList::default();
        list.begin_path();
        list.move_to(Point::new(0.0, 0.0));
        list.line_to(Point::new(1.0, 0.0));
        list.stroke();
        list.draw_text("42", Point::default(), TextAlign::Center, TextBaseline::Hanging);
        list.clear();
        assert!(list.lines().is_empty());
        assert!(list.texts().is_empty());
    }
}
