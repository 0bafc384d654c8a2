//! NSGA-II: fast non-dominated sort, crowding distance, tournament selection,
//! order crossover, mutation, and permutation repair.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::graph::Graph;
use crate::objectives::{Axis, Objectives};
use crate::pareto::{ParetoFront, Solution};

#[derive(Clone, Copy, Debug)]
pub struct Params {
	pub population: usize,
	pub generations: usize,
	pub crossover_rate: f64,
	pub mutation_rate: f64,
	pub seed: u64,
}

impl Default for Params {
	fn default() -> Self {
		Self { population: 100, generations: 200, crossover_rate: 0.9, mutation_rate: 0.1, seed: 0 }
	}
}

fn full_route(interior: &[usize]) -> Vec<usize> {
	let mut route = vec![0];
	route.extend_from_slice(interior);
	route.push(0);
	route
}

/// Front 0 = zero-counter individuals; peel by decrementing counters of whatever
/// each front member dominates, assigning `rank` as each new zero-counter front forms.
fn fast_non_dominated_sort(population: &mut [Solution]) -> Vec<Vec<usize>> {
	let n = population.len();
	let mut dominates: Vec<Vec<usize>> = vec![Vec::new(); n];
	let mut dominated_by_count: Vec<usize> = vec![0; n];
	let mut fronts: Vec<Vec<usize>> = vec![Vec::new()];

	for i in 0..n {
		for j in 0..n {
			if i == j {
				continue;
			}
			if population[i].dominates(&population[j]) {
				dominates[i].push(j);
			} else if population[j].dominates(&population[i]) {
				dominated_by_count[i] += 1;
			}
		}
		if dominated_by_count[i] == 0 {
			population[i].rank = 0;
			fronts[0].push(i);
		}
	}

	let mut k = 0;
	while !fronts[k].is_empty() {
		let mut next_front = Vec::new();
		for &i in &fronts[k] {
			for &j in &dominates[i] {
				dominated_by_count[j] -= 1;
				if dominated_by_count[j] == 0 {
					population[j].rank = k + 1;
					next_front.push(j);
				}
			}
		}
		k += 1;
		fronts.push(next_front);
	}
	fronts.pop();
	fronts
}

/// Size <= 2 classes get `+inf` for every member; otherwise each of the three
/// objectives contributes `(next - prev) / range` to interior members, `+inf` to
/// the endpoints, skipped entirely when that objective's range is zero.
fn assign_crowding_distance(population: &mut [Solution], front: &[usize]) {
	let len = front.len();
	if len == 0 {
		return;
	}
	if len <= 2 {
		for &i in front {
			population[i].crowding_distance = f64::INFINITY;
		}
		return;
	}
	for &i in front {
		population[i].crowding_distance = 0.0;
	}
	for axis in [Axis::Distance, Axis::Risk, Axis::Recharges] {
		let mut sorted = front.to_vec();
		sorted.sort_by(|&a, &b| {
			population[a].objectives.project(axis).partial_cmp(&population[b].objectives.project(axis)).unwrap()
		});
		let min_v = population[sorted[0]].objectives.project(axis);
		let max_v = population[sorted[len - 1]].objectives.project(axis);
		let range = max_v - min_v;
		population[sorted[0]].crowding_distance = f64::INFINITY;
		population[sorted[len - 1]].crowding_distance = f64::INFINITY;
		if range <= 0.0 {
			continue;
		}
		for idx in 1..len - 1 {
			let prev = population[sorted[idx - 1]].objectives.project(axis);
			let next = population[sorted[idx + 1]].objectives.project(axis);
			let i = sorted[idx];
			if population[i].crowding_distance.is_finite() {
				population[i].crowding_distance += (next - prev) / range;
			}
		}
	}
}

fn tournament_select(population: &[Solution], rng: &mut ChaCha8Rng) -> usize {
	let n = population.len();
	let a = rng.gen_range(0..n);
	let b = rng.gen_range(0..n);
	if population[a].rank != population[b].rank {
		if population[a].rank < population[b].rank {
			a
		} else {
			b
		}
	} else if population[a].crowding_distance >= population[b].crowding_distance {
		a
	} else {
		b
	}
}

/// Copies `parent1[c1..=c2]` into place; remaining positions, wrapping from `c2+1`,
/// are filled with parent2's items in order, skipping anything already copied.
fn order_crossover(parent1: &[usize], parent2: &[usize], rng: &mut ChaCha8Rng) -> Vec<usize> {
	let n = parent1.len();
	if n < 2 {
		return parent1.to_vec();
	}
	let mut c1 = rng.gen_range(0..n);
	let mut c2 = rng.gen_range(0..n);
	if c1 > c2 {
		std::mem::swap(&mut c1, &mut c2);
	}

	let mut child: Vec<Option<usize>> = vec![None; n];
	let mut copied: HashSet<usize> = HashSet::new();
	for i in c1..=c2 {
		child[i] = Some(parent1[i]);
		copied.insert(parent1[i]);
	}

	let mut fill = parent2.iter().copied().filter(|v| !copied.contains(v));
	let positions = ((c2 + 1)..n).chain(0..c1);
	for pos in positions {
		child[pos] = fill.next();
	}
	child.into_iter().map(|x| x.expect("order crossover leaves no empty slot")).collect()
}

/// Uniformly chooses among swap, sub-segment reversal, and remove-and-reinsert.
fn mutate(interior: &mut Vec<usize>, rng: &mut ChaCha8Rng) {
	let n = interior.len();
	if n < 2 {
		return;
	}
	match rng.gen_range(0..3) {
		0 => {
			let i = rng.gen_range(0..n);
			let j = rng.gen_range(0..n);
			interior.swap(i, j);
		}
		1 => {
			let mut i = rng.gen_range(0..n);
			let mut j = rng.gen_range(0..n);
			if i > j {
				std::mem::swap(&mut i, &mut j);
			}
			interior[i..=j].reverse();
		}
		_ => {
			let i = rng.gen_range(0..n);
			let val = interior.remove(i);
			let j = rng.gen_range(0..=interior.len());
			interior.insert(j, val);
		}
	}
}

/// Restores the interior to a permutation of `{1, ..., n}`: duplicates/out-of-range
/// entries are overwritten in place with missing ids, any still-missing are appended,
/// and the result is truncated to length `n`.
fn repair(interior: &mut Vec<usize>, n: usize) {
	let mut seen = vec![false; n + 1];
	let mut fix_positions: Vec<usize> = Vec::new();
	for (idx, &v) in interior.iter().enumerate() {
		if v >= 1 && v <= n && !seen[v] {
			seen[v] = true;
		} else {
			fix_positions.push(idx);
		}
	}
	let mut missing = (1..=n).filter(|v| !seen[*v]);
	for pos in fix_positions {
		if let Some(m) = missing.next() {
			interior[pos] = m;
		}
	}
	for m in missing {
		interior.push(m);
	}
	interior.truncate(n);
}

fn evaluate(graph: &Graph, interior: Vec<usize>) -> Solution {
	let route = full_route(&interior);
	let (objectives, feasible) = graph.evaluate_route(&route);
	Solution::new(route, objectives, feasible)
}

pub fn solve(graph: &Graph, params: Params) -> ParetoFront {
	let n = graph.node_count();
	let mut front = ParetoFront::new();
	if n <= 1 {
		front.add(Solution::new(vec![0], Objectives::ZERO, true));
		return front;
	}
	let interior_len = n - 1;
	let mut rng = crate::solvers::seeded_rng(params.seed);

	let mut population: Vec<Solution> = (0..params.population)
		.map(|_| {
			let mut interior: Vec<usize> = (1..n).collect();
			interior.shuffle(&mut rng);
			evaluate(graph, interior)
		})
		.collect();

	let fronts = fast_non_dominated_sort(&mut population);
	for f in &fronts {
		assign_crowding_distance(&mut population, f);
	}

	log::info!("nsga2: starting with population={} generations={}", params.population, params.generations);
	for generation in 0..params.generations {
		let mut offspring: Vec<Solution> = Vec::with_capacity(params.population);
		while offspring.len() < params.population {
			let p1 = tournament_select(&population, &mut rng);
			let p2 = tournament_select(&population, &mut rng);
			let parent1_interior = population[p1].route[1..n].to_vec();
			let parent2_interior = population[p2].route[1..n].to_vec();

			let mut child_interior = if rng.gen::<f64>() < params.crossover_rate {
				order_crossover(&parent1_interior, &parent2_interior, &mut rng)
			} else {
				parent1_interior
			};
			if rng.gen::<f64>() < params.mutation_rate {
				mutate(&mut child_interior, &mut rng);
			}
			repair(&mut child_interior, interior_len);
			offspring.push(evaluate(graph, child_interior));
		}

		let mut merged = population;
		merged.extend(offspring);
		let fronts = fast_non_dominated_sort(&mut merged);
		for f in &fronts {
			assign_crowding_distance(&mut merged, f);
		}

		let mut next_population: Vec<Solution> = Vec::with_capacity(params.population);
		for f in &fronts {
			if next_population.len() + f.len() <= params.population {
				next_population.extend(f.iter().map(|&i| merged[i].clone()));
			} else {
				let mut ranked = f.clone();
				ranked.sort_by(|&a, &b| {
					merged[b].crowding_distance.partial_cmp(&merged[a].crowding_distance).unwrap()
				});
				let need = params.population - next_population.len();
				next_population.extend(ranked.into_iter().take(need).map(|i| merged[i].clone()));
				break;
			}
		}
		population = next_population;
		log::trace!("nsga2: generation {} front-0 size {}", generation, fronts[0].len());
	}

	let rank0_feasible: Vec<&Solution> = population.iter().filter(|s| s.rank == 0 && s.feasible).collect();
	if !rank0_feasible.is_empty() {
		for s in rank0_feasible {
			front.add(s.clone());
		}
	} else {
		for s in population.iter().filter(|s| s.feasible) {
			front.add(s.clone());
		}
	}
	log::info!("nsga2: final front size {}", front.len());
	front
}

#[cfg(test)]
mod tests {
	use super::*;

	fn is_permutation(interior: &[usize], n: usize) -> bool {
		let mut seen = vec![false; n + 1];
		if interior.len() != n {
			return false;
		}
		for &v in interior {
			if v < 1 || v > n || seen[v] {
				return false;
			}
			seen[v] = true;
		}
		true
	}

	#[test]
	fn order_crossover_preserves_permutation() {
		let mut rng = crate::solvers::seeded_rng(42);
		let p1 = vec![1, 2, 3, 4, 5];
		let p2 = vec![5, 4, 3, 2, 1];
		for _ in 0..50 {
			let child = order_crossover(&p1, &p2, &mut rng);
			assert!(is_permutation(&child, 5));
		}
	}

	#[test]
	fn repair_fixes_duplicates_and_out_of_range() {
		let mut interior = vec![1, 1, 7, 0, 2];
		repair(&mut interior, 5);
		assert!(is_permutation(&interior, 5));
	}

	#[test]
	fn repair_appends_still_missing_entries() {
		let mut interior = vec![1, 1, 1];
		repair(&mut interior, 5);
		assert!(is_permutation(&interior, 5));
	}

	#[test]
	fn crowding_distance_gives_endpoints_infinity() {
		let mut pop = vec![
			Solution::new(vec![0], Objectives { distance: 1.0, risk: 0.1, recharges: 0 }, true),
			Solution::new(vec![0], Objectives { distance: 5.0, risk: 0.5, recharges: 0 }, true),
			Solution::new(vec![0], Objectives { distance: 10.0, risk: 1.0, recharges: 0 }, true),
		];
		assign_crowding_distance(&mut pop, &[0, 1, 2]);
		assert!(pop[0].crowding_distance.is_infinite());
		assert!(pop[2].crowding_distance.is_infinite());
		assert!(pop[1].crowding_distance.is_finite());
	}

	#[test]
	fn solve_small_square_instance_returns_nonempty_front() {
		use crate::geometry::Point;
		use crate::graph::{Graph, Node};
		let nodes = vec![
			Node { id: 0, position: Point::new(50.0, 50.0), is_hub: true, is_charging: false },
			Node { id: 1, position: Point::new(0.0, 0.0), is_hub: false, is_charging: false },
			Node { id: 2, position: Point::new(100.0, 0.0), is_hub: false, is_charging: false },
			Node { id: 3, position: Point::new(100.0, 100.0), is_hub: false, is_charging: false },
			Node { id: 4, position: Point::new(0.0, 100.0), is_hub: false, is_charging: false },
		];
		let g = Graph::build(nodes, vec![], 100.0);
		let params = Params { population: 20, generations: 10, ..Params::default() };
		let front = solve(&g, params);
		assert!(!front.is_empty());
	}
}
