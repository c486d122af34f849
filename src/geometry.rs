//! Point math shared by every entity: translation, rotation about a pivot and
//! the orientation-based segment intersection test used for collisions.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Adds `offset` to `point`.
pub fn translate(point: Point, offset: Point) -> Point {
    Point::new(point.x + offset.x, point.y + offset.y)
}

/// Rotates `point` about `pivot` by `angle` radians.
///
/// Screen coordinates grow downwards, so a positive angle turns clockwise as
/// seen on screen.
pub fn rotate(point: Point, pivot: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let dx = point.x - pivot.x;
    let dy = point.y - pivot.y;
    Point::new(dx * cos - dy * sin + pivot.x, dx * sin + dy * cos + pivot.y)
}

/// Strict orientation test for the triangle `a`, `b`, `c`.
fn ccw(a: Point, b: Point, c: Point) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// Returns true when segment `p1`-`p2` crosses segment `p3`-`p4`.
///
/// Collinear and touching segments are not special-cased: the answer then
/// depends on how the strict orientation test breaks the tie. A zero-length
/// segment never intersects anything.
pub fn is_intersecting(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    ccw(p1, p3, p4) != ccw(p2, p3, p4) && ccw(p1, p2, p3) != ccw(p1, p2, p4)
}

/// Splits a polyline into the segments formed by the pairs at even offsets.
/// A trailing unpaired point is ignored.
pub fn segments(points: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    points.chunks_exact(2).map(|pair| (pair[0], pair[1]))
}
