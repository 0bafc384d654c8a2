//! Constructive seeds (nearest-neighbor, cheapest insertion, angular sweep,
//! convex-hull insertion) polished with 2-opt; every survivor feeds one front.

use std::collections::HashSet;

use itertools::Itertools;

use crate::geometry::{self, Point};
use crate::graph::Graph;
use crate::pareto::{ParetoFront, Solution};

/// `(w_d, w_r)` pairs from `{0.0, 0.2, ..., 1.0}` with `w_d + w_r <= 1.0` (~21 pairs).
fn weight_grid() -> Vec<(f64, f64)> {
	let steps = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
	steps
		.iter()
		.cartesian_product(steps.iter())
		.map(|(&wd, &wr)| (wd, wr))
		.filter(|&(wd, wr)| wd + wr <= 1.0 + 1e-9)
		.collect()
}

/// Greedily extends the path by argmin weighted `(distance, risk)` over unvisited
/// nodes with a valid edge; falls through to the lowest-id unvisited node otherwise.
fn nearest_neighbor(graph: &Graph, wd: f64, wr: f64) -> Vec<usize> {
	let n = graph.node_count();
	let mut visited = vec![false; n];
	visited[0] = true;
	let mut route = vec![0usize];
	let mut current = 0usize;

	for _ in 1..n {
		let candidates: Vec<usize> = (0..n).filter(|&i| !visited[i]).collect();
		let valid: Vec<usize> =
			candidates.iter().copied().filter(|&i| graph.edge(current, i).valid).collect();
		let next = if !valid.is_empty() {
			valid
				.into_iter()
				.min_by(|&a, &b| {
					let cost = |x: usize| {
						let e = graph.edge(current, x).weight;
						wd * e.distance + wr * e.risk
					};
					cost(a).partial_cmp(&cost(b)).unwrap()
				})
				.unwrap()
		} else {
			*candidates.iter().min().unwrap()
		};
		visited[next] = true;
		route.push(next);
		current = next;
	}
	route.push(0);
	route
}

fn seed_triangle(graph: &Graph) -> Vec<usize> {
	let n = graph.node_count();
	let mut others: Vec<usize> = (1..n).collect();
	others.sort_by(|&a, &b| {
		graph.edge(0, b).weight.distance.partial_cmp(&graph.edge(0, a).weight.distance).unwrap()
	});
	let mut route = vec![0];
	if let Some(&farthest) = others.first() {
		route.push(farthest);
	}
	if let Some(&second) = others.get(1) {
		route.push(second);
	}
	route.push(0);
	route
}

/// Inserts the (node, position) minimizing weighted insertion cost, skipping any
/// position with an invalid incident edge. Nodes with no feasible position anywhere
/// are left out (the resulting route is then scored as incomplete/infeasible).
fn cheapest_insertion(graph: &Graph, wd: f64, wr: f64) -> Vec<usize> {
	let n = graph.node_count();
	let mut route = seed_triangle(graph);
	let mut inserted: HashSet<usize> = route.iter().copied().collect();
	let mut to_insert: Vec<usize> = (1..n).filter(|i| !inserted.contains(i)).collect();

	while !to_insert.is_empty() {
		let mut best: Option<(usize, usize, f64)> = None;
		for &node in &to_insert {
			for pos in 1..route.len() {
				let prev = route[pos - 1];
				let next = route[pos];
				let e_prev_new = graph.edge(prev, node);
				let e_new_next = graph.edge(node, next);
				if !e_prev_new.valid || !e_new_next.valid {
					continue;
				}
				let e_prev_next = graph.edge(prev, next);
				let delta_d =
					e_prev_new.weight.distance + e_new_next.weight.distance - e_prev_next.weight.distance;
				let delta_r =
					e_prev_new.weight.risk + e_new_next.weight.risk - e_prev_next.weight.risk;
				let cost = wd * delta_d + wr * delta_r;
				if best.map_or(true, |(_, _, bc)| cost < bc) {
					best = Some((node, pos, cost));
				}
			}
		}
		match best {
			Some((node, pos, _)) => {
				route.insert(pos, node);
				inserted.insert(node);
				to_insert.retain(|&x| x != node);
			}
			None => break,
		}
	}
	route
}

/// Orders non-hub nodes by polar angle relative to the hub, offset by `start_deg`,
/// mod 2*pi; `clockwise` picks the sort direction.
fn angular_sweep(graph: &Graph, start_deg: f64, clockwise: bool) -> Vec<usize> {
	let n = graph.node_count();
	let hub_pos = graph.nodes[0].position;
	let two_pi = std::f64::consts::PI * 2.0;
	let offset = start_deg.to_radians();

	let mut angles: Vec<(usize, f64)> = (1..n)
		.map(|i| {
			let raw = hub_pos.polar_angle(&graph.nodes[i].position) - offset;
			(i, ((raw % two_pi) + two_pi) % two_pi)
		})
		.collect();
	angles.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
	if !clockwise {
		angles.reverse();
	}

	let mut route = vec![0];
	route.extend(angles.into_iter().map(|(i, _)| i));
	route.push(0);
	route
}

/// Initial tour = hull vertices in order (hub prepended if absent); interior nodes
/// inserted one by one at the cheapest position by distance only.
fn convex_hull_insertion(graph: &Graph) -> Vec<usize> {
	let n = graph.node_count();
	let points: Vec<Point> = graph.nodes.iter().map(|nd| nd.position).collect();
	let hull_points = geometry::convex_hull(&points);

	let mut hull_ids: Vec<usize> = hull_points
		.iter()
		.filter_map(|hp| {
			graph
				.nodes
				.iter()
				.find(|nd| {
					(nd.position.x - hp.x).abs() < geometry::EPS
						&& (nd.position.y - hp.y).abs() < geometry::EPS
				})
				.map(|nd| nd.id)
		})
		.collect();

	if let Some(pos) = hull_ids.iter().position(|&x| x == 0) {
		hull_ids.rotate_left(pos);
	} else {
		hull_ids.insert(0, 0);
	}

	let mut route = hull_ids.clone();
	route.push(0);

	let on_hull: HashSet<usize> = hull_ids.into_iter().collect();
	for node in (0..n).filter(|i| !on_hull.contains(i)) {
		let mut best: Option<(usize, f64)> = None;
		for pos in 1..route.len() {
			let prev = route[pos - 1];
			let next = route[pos];
			let delta = graph.edge(prev, node).weight.distance + graph.edge(node, next).weight.distance
				- graph.edge(prev, next).weight.distance;
			if best.map_or(true, |(_, bd)| delta < bd) {
				best = Some((pos, delta));
			}
		}
		if let Some((pos, _)) = best {
			route.insert(pos, node);
		}
	}
	route
}

fn route_valid(graph: &Graph, route: &[usize]) -> bool {
	route.windows(2).all(|w| graph.edge(w[0], w[1]).valid)
}

/// Repeatedly reverses internal segments `route[i..=j]` (never touching the closing
/// hub), accepting the first reversal that keeps every edge valid and strictly
/// improves distance by more than 0.01.
fn two_opt(graph: &Graph, mut route: Vec<usize>) -> Vec<usize> {
	let n = graph.node_count();
	if n < 4 || route.len() != n + 1 {
		return route;
	}
	loop {
		let mut improved = false;
		'search: for i in 1..n - 1 {
			for j in (i + 1)..n {
				let mut candidate = route.clone();
				candidate[i..=j].reverse();
				if route_valid(graph, &candidate) {
					let (old_obj, _) = graph.evaluate_route(&route);
					let (new_obj, _) = graph.evaluate_route(&candidate);
					if old_obj.distance - new_obj.distance > 0.01 {
						route = candidate;
						improved = true;
						break 'search;
					}
				}
			}
		}
		if !improved {
			break;
		}
	}
	route
}

pub fn solve(graph: &Graph) -> ParetoFront {
	let n = graph.node_count();
	let mut front = ParetoFront::new();
	if n <= 1 {
		front.add(Solution::new(vec![0], crate::objectives::Objectives::ZERO, true));
		return front;
	}

	let mut candidates: Vec<Vec<usize>> = Vec::new();
	for &(wd, wr) in &weight_grid() {
		candidates.push(nearest_neighbor(graph, wd, wr));
	}
	for d in [0, 2, 4, 6, 8, 10] {
		let wd = d as f64 / 10.0;
		let wr = (10 - d) as f64 / 10.0;
		candidates.push(cheapest_insertion(graph, wd, wr));
	}
	for angle_step in 0..12 {
		let angle = angle_step as f64 * 30.0;
		candidates.push(angular_sweep(graph, angle, true));
		candidates.push(angular_sweep(graph, angle, false));
	}
	candidates.push(convex_hull_insertion(graph));

	log::info!("heuristic: generated {} constructive seeds", candidates.len());
	for route in candidates {
		if route.len() != n + 1 {
			continue;
		}
		let polished = two_opt(graph, route);
		let (objectives, feasible) = graph.evaluate_route(&polished);
		front.add(Solution::new(polished, objectives, feasible));
	}
	log::info!("heuristic: front size {}", front.len());
	front
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::Node;

	fn square_graph() -> Graph {
		let nodes = vec![
			Node { id: 0, position: Point::new(50.0, 50.0), is_hub: true, is_charging: false },
			Node { id: 1, position: Point::new(0.0, 0.0), is_hub: false, is_charging: false },
			Node { id: 2, position: Point::new(100.0, 0.0), is_hub: false, is_charging: false },
			Node { id: 3, position: Point::new(100.0, 100.0), is_hub: false, is_charging: false },
			Node { id: 4, position: Point::new(0.0, 100.0), is_hub: false, is_charging: false },
		];
		Graph::build(nodes, vec![], 100.0)
	}

	#[test]
	fn weight_grid_has_twenty_one_pairs() {
		assert_eq!(weight_grid().len(), 21);
	}

	#[test]
	fn nearest_neighbor_breaks_ties_by_lowest_id() {
		let g = square_graph();
		let route = nearest_neighbor(&g, 1.0, 0.0);
		assert_eq!(route[1], 1);
	}

	#[test]
	fn heuristic_solver_finds_square_tour() {
		let g = square_graph();
		let front = solve(&g);
		assert!(!front.is_empty());
		let best = front
			.members()
			.iter()
			.min_by(|a, b| a.objectives.distance.partial_cmp(&b.objectives.distance).unwrap())
			.unwrap();
		assert!((best.objectives.distance - 341.42).abs() < 1.0);
	}

	#[test]
	fn convex_hull_insertion_includes_every_node() {
		let g = square_graph();
		let route = convex_hull_insertion(&g);
		let mut ids: Vec<usize> = route[..route.len() - 1].to_vec();
		ids.sort_unstable();
		assert_eq!(ids, vec![0, 1, 2, 3, 4]);
	}
}
