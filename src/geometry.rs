//! Point/segment/polygon primitives shared by graph construction and every solver.

use serde::{Deserialize, Serialize};

/// Tolerance governing every orientation/containment comparison in this module.
pub const EPS: f64 = 1e-10;

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance_to(&self, other: &Point) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}

	/// `atan2(dy, dx)` from `self` towards `point`.
	pub fn polar_angle(&self, point: &Point) -> f64 {
		(point.y - self.y).atan2(point.x - self.x)
	}
}

impl std::ops::Sub for Point {
	type Output = Point;
	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

/// `-1`, `0`, `+1` for clockwise, collinear, counterclockwise turns `p -> q -> r`.
pub fn orientation(p: &Point, q: &Point, r: &Point) -> i32 {
	let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
	if val.abs() < EPS {
		0
	} else if val > 0.0 {
		1
	} else {
		-1
	}
}

fn on_segment(p: &Point, q: &Point, r: &Point) -> bool {
	q.x <= p.x.max(r.x) + EPS
		&& q.x >= p.x.min(r.x) - EPS
		&& q.y <= p.y.max(r.y) + EPS
		&& q.y >= p.y.min(r.y) - EPS
}

/// Four-orientation segment intersection test with the standard collinear sub-cases.
pub fn segments_intersect(p1: &Point, q1: &Point, p2: &Point, q2: &Point) -> bool {
	let o1 = orientation(p1, q1, p2);
	let o2 = orientation(p1, q1, q2);
	let o3 = orientation(p2, q2, p1);
	let o4 = orientation(p2, q2, q1);

	if o1 != o2 && o3 != o4 {
		return true;
	}
	if o1 == 0 && on_segment(p1, p2, q1) {
		return true;
	}
	if o2 == 0 && on_segment(p1, q2, q1) {
		return true;
	}
	if o3 == 0 && on_segment(p2, p1, q2) {
		return true;
	}
	if o4 == 0 && on_segment(p2, q1, q2) {
		return true;
	}
	false
}

/// Projects `p` onto segment `a-b`, clamping to the segment; falls back to endpoint
/// distance for a degenerate zero-length segment.
pub fn point_to_segment_distance(p: &Point, a: &Point, b: &Point) -> f64 {
	let ab = *b - *a;
	let len_sq = ab.x * ab.x + ab.y * ab.y;
	if len_sq < EPS {
		return p.distance_to(a);
	}
	let ap = *p - *a;
	let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
	let proj = Point::new(a.x + t * ab.x, a.y + t * ab.y);
	p.distance_to(&proj)
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Polygon {
	pub vertices: Vec<Point>,
}

impl Polygon {
	pub fn new(vertices: Vec<Point>) -> Self {
		Self { vertices }
	}

	/// Consecutive vertex pairs, wrapping from the last vertex back to the first.
	pub fn edges(&self) -> impl Iterator<Item = (&Point, &Point)> {
		let n = self.vertices.len();
		(0..n).map(move |i| (&self.vertices[i], &self.vertices[(i + 1) % n]))
	}

	/// Horizontal ray-casting to `x = +inf`; a point collinear with an edge counts as inside.
	pub fn contains(&self, p: &Point) -> bool {
		let far = Point::new(f64::MAX / 2.0, p.y);
		let mut inside = false;
		for (a, b) in self.edges() {
			if orientation(a, b, p) == 0 && on_segment(a, p, b) {
				return true;
			}
			if segments_intersect(a, b, p, &far) {
				inside = !inside;
			}
		}
		inside
	}
}

/// `true` if the segment crosses any polygon edge, or either endpoint lies inside the polygon.
pub fn segment_intersects_polygon(a: &Point, b: &Point, poly: &Polygon) -> bool {
	if poly.contains(a) || poly.contains(b) {
		return true;
	}
	poly.edges().any(|(u, v)| segments_intersect(a, b, u, v))
}

/// Zero if the segment intersects the polygon; otherwise the minimum over
/// endpoint-to-edge and vertex-to-segment distances.
pub fn segment_to_polygon_distance(a: &Point, b: &Point, poly: &Polygon) -> f64 {
	if segment_intersects_polygon(a, b, poly) {
		return 0.0;
	}
	let mut best = f64::INFINITY;
	for (u, v) in poly.edges() {
		best = best.min(point_to_segment_distance(a, u, v));
		best = best.min(point_to_segment_distance(b, u, v));
	}
	for v in &poly.vertices {
		best = best.min(point_to_segment_distance(v, a, b));
	}
	best
}

/// Andrew's monotone chain. Lexicographic sort by `(x, y)`, lower then upper hull
/// discarding non-left turns, final duplicate endpoint removed.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
	let mut pts = points.to_vec();
	pts.sort_by(|a, b| {
		a.x.partial_cmp(&b.x)
			.unwrap()
			.then(a.y.partial_cmp(&b.y).unwrap())
	});
	pts.dedup_by(|a, b| (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS);
	let n = pts.len();
	if n < 3 {
		return pts;
	}

	let mut lower: Vec<Point> = Vec::new();
	for p in &pts {
		while lower.len() >= 2
			&& orientation(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0
		{
			lower.pop();
		}
		lower.push(*p);
	}

	let mut upper: Vec<Point> = Vec::new();
	for p in pts.iter().rev() {
		while upper.len() >= 2
			&& orientation(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0
		{
			upper.pop();
		}
		upper.push(*p);
	}

	lower.pop();
	upper.pop();
	lower.extend(upper);
	lower
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn orientation_collinear() {
		let p = Point::new(0.0, 0.0);
		let q = Point::new(1.0, 1.0);
		let r = Point::new(2.0, 2.0);
		assert_eq!(orientation(&p, &q, &r), 0);
	}

	#[test]
	fn segments_intersect_crossing() {
		let a = Point::new(0.0, 0.0);
		let b = Point::new(4.0, 4.0);
		let c = Point::new(0.0, 4.0);
		let d = Point::new(4.0, 0.0);
		assert!(segments_intersect(&a, &b, &c, &d));
	}

	#[test]
	fn segments_parallel_no_intersection() {
		let a = Point::new(0.0, 0.0);
		let b = Point::new(1.0, 0.0);
		let c = Point::new(0.0, 1.0);
		let d = Point::new(1.0, 1.0);
		assert!(!segments_intersect(&a, &b, &c, &d));
	}

	fn square() -> Polygon {
		Polygon::new(vec![
			Point::new(40.0, 40.0),
			Point::new(60.0, 40.0),
			Point::new(60.0, 60.0),
			Point::new(40.0, 60.0),
		])
	}

	#[test]
	fn point_in_polygon_inside_and_outside() {
		let poly = square();
		assert!(poly.contains(&Point::new(50.0, 50.0)));
		assert!(!poly.contains(&Point::new(0.0, 0.0)));
	}

	#[test]
	fn segment_through_square_invalid() {
		let poly = square();
		let a = Point::new(20.0, 50.0);
		let b = Point::new(80.0, 50.0);
		assert!(segment_intersects_polygon(&a, &b, &poly));
		assert_eq!(segment_to_polygon_distance(&a, &b, &poly), 0.0);
	}

	#[test]
	fn point_to_segment_distance_clamped() {
		let a = Point::new(0.0, 0.0);
		let b = Point::new(10.0, 0.0);
		let p = Point::new(-5.0, 0.0);
		assert!((point_to_segment_distance(&p, &a, &b) - 5.0).abs() < 1e-9);
	}

	#[test]
	fn convex_hull_of_square_with_interior_point() {
		let pts = vec![
			Point::new(0.0, 0.0),
			Point::new(10.0, 0.0),
			Point::new(10.0, 10.0),
			Point::new(0.0, 10.0),
			Point::new(5.0, 5.0),
		];
		let hull = convex_hull(&pts);
		assert_eq!(hull.len(), 4);
		assert!(!hull.iter().any(|p| (p.x - 5.0).abs() < EPS && (p.y - 5.0).abs() < EPS));
	}
}
