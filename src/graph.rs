//! Dense weighted directed graph over delivery nodes, built once per instance and
//! shared read-only by every solver. Route evaluation (battery/recharge simulation)
//! lives here so no solver re-derives it independently.

use serde::{Deserialize, Serialize};

use crate::geometry::{self, Point, Polygon};
use crate::instance::InstanceFile;
use crate::objectives::Objectives;

#[derive(Clone, Copy, Debug)]
pub struct Node {
	pub id: usize,
	pub position: Point,
	pub is_hub: bool,
	pub is_charging: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct EdgeWeight {
	pub distance: f64,
	pub risk: f64,
	pub battery: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct Edge {
	pub weight: EdgeWeight,
	pub valid: bool,
}

pub struct Graph {
	pub nodes: Vec<Node>,
	edges: Vec<Edge>,
	pub polygons: Vec<Polygon>,
	pub map_size: f64,
}

/// Battery falls below this after a leg triggers an implicit mid-flight recharge.
pub(crate) const LOW_BATTERY_THRESHOLD: f64 = 20.0;
/// Arrival at a charging station below this triggers a free top-up (not a recharge).
pub(crate) const CHARGING_TOPUP_THRESHOLD: f64 = 80.0;
pub(crate) const FULL_BATTERY: f64 = 100.0;
/// Edge risk is 1.0 within this clearance of the nearest polygon.
const RISK_NEAR: f64 = 1.0;
/// Edge risk is 0.0 beyond this clearance of the nearest polygon.
const RISK_FAR: f64 = 20.0;

impl Graph {
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	fn index(&self, from: usize, to: usize) -> usize {
		from * self.nodes.len() + to
	}

	pub fn edge(&self, from: usize, to: usize) -> &Edge {
		&self.edges[self.index(from, to)]
	}

	pub fn hub(&self) -> usize {
		self.nodes.iter().find(|n| n.is_hub).map(|n| n.id).unwrap_or(0)
	}

	/// Builds the dense adjacency for every ordered pair `i != j`, scoring risk from
	/// clearance to the nearest no-fly polygon and validity from segment intersection.
	pub fn build(nodes: Vec<Node>, polygons: Vec<Polygon>, map_size: f64) -> Self {
		let n = nodes.len();
		let mut edges = vec![
			Edge {
				weight: EdgeWeight { distance: 0.0, risk: 0.0, battery: 0.0 },
				valid: true,
			};
			n * n
		];
		for i in 0..n {
			for j in 0..n {
				if i == j {
					continue;
				}
				let a = nodes[i].position;
				let b = nodes[j].position;
				let distance = a.distance_to(&b);
				let valid = !polygons
					.iter()
					.any(|poly| geometry::segment_intersects_polygon(&a, &b, poly));
				let clearance = polygons
					.iter()
					.map(|poly| geometry::segment_to_polygon_distance(&a, &b, poly))
					.fold(f64::INFINITY, f64::min);
				let risk = if polygons.is_empty() {
					0.0
				} else if clearance < RISK_NEAR {
					1.0
				} else if clearance > RISK_FAR {
					0.0
				} else {
					1.0 - (clearance - RISK_NEAR) / (RISK_FAR - RISK_NEAR)
				};
				edges[i * n + j] = Edge {
					weight: EdgeWeight { distance, risk, battery: distance / 100.0 },
					valid,
				};
			}
		}
		Self { nodes, edges, polygons, map_size }
	}

	pub fn from_instance(instance: &InstanceFile) -> Self {
		let nodes = instance
			.nodes
			.iter()
			.map(|n| Node {
				id: n.id as usize,
				position: Point::new(n.x, n.y),
				is_hub: n.is_hub,
				is_charging: n.is_charging,
			})
			.collect();
		let polygons = instance
			.no_fly_zones
			.iter()
			.map(|z| Polygon::new(z.vertices.iter().map(|v| Point::new(v[0], v[1])).collect()))
			.collect();
		Self::build(nodes, polygons, instance.map_size)
	}

	/// Simulates battery depletion/recharge along `route` (which must start and end
	/// at the hub) and returns the resulting objectives plus feasibility.
	///
	/// Mirrors the BnB per-step update exactly: missing/invalid edges mark the route
	/// infeasible but scalar objectives still accumulate from whatever edges exist.
	pub fn evaluate_route(&self, route: &[usize]) -> (Objectives, bool) {
		let mut distance = 0.0;
		let mut risk = 0.0;
		let mut recharges = 0u32;
		let mut battery = FULL_BATTERY;
		let mut feasible = true;

		for pair in route.windows(2) {
			let (from, to) = (pair[0], pair[1]);
			let edge = self.edge(from, to);
			if !edge.valid {
				feasible = false;
			}
			distance += edge.weight.distance;
			risk += edge.weight.risk;
			battery -= edge.weight.battery;
			if battery < LOW_BATTERY_THRESHOLD {
				recharges += 1;
				battery = FULL_BATTERY;
			}
			if self.nodes[to].is_charging && battery < CHARGING_TOPUP_THRESHOLD {
				battery = FULL_BATTERY;
			}
		}

		(Objectives { distance, risk, recharges }, feasible)
	}
}
