//! Random instance generation (collaborator, not core): seeded and deterministic,
//! producing convex no-fly zones and nodes with guaranteed clearance.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::geometry::{self, Point, Polygon};
use crate::instance::{InstanceFile, NodeSpec, PolygonSpec};

const HUB_CLEARANCE: f64 = 5.0;
const DELIVERY_CLEARANCE: f64 = 3.0;
const CHARGING_FRACTION: f64 = 0.15;
const MAX_PLACEMENT_ATTEMPTS: u32 = 200;

fn point_clearance(p: &Point, poly: &Polygon) -> f64 {
	geometry::segment_to_polygon_distance(p, p, poly)
}

fn clears_all(p: &Point, polygons: &[Polygon], min_clearance: f64) -> bool {
	polygons.iter().all(|poly| point_clearance(p, poly) >= min_clearance)
}

fn random_polygon(rng: &mut ChaCha8Rng, map_size: f64) -> Polygon {
	loop {
		let cx = rng.gen_range(map_size * 0.1..map_size * 0.9);
		let cy = rng.gen_range(map_size * 0.1..map_size * 0.9);
		let radius = rng.gen_range(map_size * 0.02..map_size * 0.08);
		let vertex_count = rng.gen_range(4..=7);
		let raw: Vec<Point> = (0..vertex_count)
			.map(|_| {
				let angle = rng.gen_range(0.0..std::f64::consts::TAU);
				let r = radius * rng.gen_range(0.5..1.0);
				Point::new(cx + r * angle.cos(), cy + r * angle.sin())
			})
			.collect();
		let hull = geometry::convex_hull(&raw);
		if (4..=7).contains(&hull.len()) {
			return Polygon::new(hull);
		}
	}
}

fn place_point(rng: &mut ChaCha8Rng, map_size: f64, polygons: &[Polygon], clearance: f64, near: Option<Point>) -> Point {
	for _ in 0..MAX_PLACEMENT_ATTEMPTS {
		let p = match near {
			Some(center) => {
				let jitter = map_size * 0.05;
				Point::new(
					(center.x + rng.gen_range(-jitter..jitter)).clamp(0.0, map_size),
					(center.y + rng.gen_range(-jitter..jitter)).clamp(0.0, map_size),
				)
			}
			None => Point::new(rng.gen_range(0.0..map_size), rng.gen_range(0.0..map_size)),
		};
		if clears_all(&p, polygons, clearance) {
			return p;
		}
	}
	log::warn!("generator: exhausted placement attempts, accepting closest candidate");
	near.unwrap_or_else(|| Point::new(map_size / 2.0, map_size / 2.0))
}

/// Deterministic given `seed`: same (node_count, polygon_count, map_size, seed)
/// always yields the same instance.
pub fn generate(node_count: usize, polygon_count: usize, map_size: f64, seed: u64) -> InstanceFile {
	let mut rng = crate::solvers::seeded_rng(seed);

	let polygons: Vec<Polygon> = (0..polygon_count).map(|_| random_polygon(&mut rng, map_size)).collect();

	let hub_position = place_point(&mut rng, map_size, &polygons, HUB_CLEARANCE, Some(Point::new(map_size / 2.0, map_size / 2.0)));

	let mut positions = vec![hub_position];
	for _ in 1..node_count {
		positions.push(place_point(&mut rng, map_size, &polygons, DELIVERY_CLEARANCE, None));
	}

	let charging_count = ((node_count as f64 - 1.0) * CHARGING_FRACTION).round().max(1.0) as usize;
	let non_hub_ids: Vec<usize> = (1..node_count).collect();
	let mut shuffled = non_hub_ids.clone();
	shuffled.shuffle(&mut rng);
	let charging_ids: std::collections::HashSet<usize> =
		shuffled.into_iter().take(charging_count.min(non_hub_ids.len())).collect();

	let nodes = positions
		.iter()
		.enumerate()
		.map(|(id, p)| NodeSpec {
			id: id as u32,
			x: p.x,
			y: p.y,
			is_hub: id == 0,
			is_charging: charging_ids.contains(&id),
		})
		.collect();

	let no_fly_zones = polygons
		.iter()
		.map(|poly| PolygonSpec { vertices: poly.vertices.iter().map(|v| [v.x, v.y]).collect() })
		.collect();

	InstanceFile { nodes, no_fly_zones, map_size }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generate_is_deterministic_for_fixed_seed() {
		let a = generate(10, 2, 100.0, 7);
		let b = generate(10, 2, 100.0, 7);
		assert_eq!(a.nodes.len(), b.nodes.len());
		for (na, nb) in a.nodes.iter().zip(b.nodes.iter()) {
			assert_eq!(na.x, nb.x);
			assert_eq!(na.y, nb.y);
			assert_eq!(na.is_charging, nb.is_charging);
		}
	}

	#[test]
	fn generated_instance_passes_validation() {
		let instance = generate(20, 3, 100.0, 1);
		assert!(instance.validate().is_ok());
	}

	#[test]
	fn generated_instance_has_at_least_one_charging_station() {
		let instance = generate(10, 1, 100.0, 3);
		assert!(instance.nodes.iter().any(|n| n.is_charging));
	}

	#[test]
	fn generated_polygons_have_between_four_and_seven_vertices() {
		let instance = generate(10, 5, 100.0, 9);
		for zone in &instance.no_fly_zones {
			assert!((4..=7).contains(&zone.vertices.len()));
		}
	}
}
