use crate::geometry::{Point, rotate};

/// Logo silhouette as six chevron strokes `[ax, ay, bx, by, cx, cy]`, 100
/// units wide and centred on the origin.
pub const LOGO_STROKES: [[f64; 6]; 6] = [
    [-50.0, 46.59, -23.28, -46.59, 3.43, 46.59],
    [-42.55, 46.59, -15.83, -46.59, 10.88, 46.59],
    [-35.1, 46.59, -8.38, -46.59, 18.33, 46.59],
    [-18.33, 46.59, 8.38, -46.59, 35.1, 46.59],
    [-10.88, 46.59, 15.83, -46.59, 42.55, 46.59],
    [-3.43, 46.59, 23.28, -46.59, 50.0, 46.59],
];

/// Points emitted per stroke: `a, b, b, c`.
pub const POINTS_PER_STROKE: usize = 4;

/// Total points in a generated logo polyline.
pub const LOGO_POINT_COUNT: usize = LOGO_STROKES.len() * POINTS_PER_STROKE;

/// Builds the world-space polyline for a logo of the given `size` centred at
/// `center` and turned by `angle`.
///
/// The middle vertex of each stroke is emitted twice so that the pairs at even
/// offsets are exactly the stroke's two visible edges.
pub fn generate_logo(center: Point, angle: f64, size: f64) -> Vec<Point> {
    let scale = size / 100.0;
    let place = |x: f64, y: f64| {
        let scaled = Point::new(x * scale + center.x, y * scale + center.y);
        rotate(scaled, center, angle)
    };

    let mut points = Vec::with_capacity(LOGO_POINT_COUNT);
    for [ax, ay, bx, by, cx, cy] in LOGO_STROKES {
        let apex = place(bx, by);
        points.push(place(ax, ay));
        points.push(apex);
        points.push(apex);
        points.push(place(cx, cy));
    }
    points
}
