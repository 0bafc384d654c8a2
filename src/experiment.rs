//! Benchmarking harness (collaborator, not core): times each solver and tabulates
//! results into the solution/experiment file shape.

use std::time::Instant;

use crate::graph::Graph;
use crate::instance::{AlgorithmResult, ExperimentReport, ObjectivesRecord, SolutionRecord};
use crate::pareto::ParetoFront;
use crate::solvers::{evolutionary, exact, heuristic};

/// Tunable per §4.C; not baked into `ParetoFront::hypervolume`.
const DEFAULT_HV_REF: (f64, f64) = (1000.0, 100.0);

/// Peak working set is dominated by the dense N x N edge table (see the concurrency
/// and resource model notes); this is a proxy, not a measured RSS sample.
fn estimate_memory_mb(graph: &Graph) -> f64 {
	let n = graph.node_count();
	(n * n * std::mem::size_of::<crate::graph::Edge>()) as f64 / (1024.0 * 1024.0)
}

fn to_result(graph: &Graph, front: &ParetoFront, elapsed_seconds: f64) -> AlgorithmResult {
	let pareto_front = front
		.members()
		.iter()
		.map(|s| SolutionRecord {
			route: s.route.iter().map(|&id| id as u32).collect(),
			objectives: ObjectivesRecord::from(&s.objectives),
			feasible: s.feasible,
		})
		.collect();
	AlgorithmResult {
		time: elapsed_seconds,
		memory: estimate_memory_mb(graph),
		pareto_front,
		hypervolume: front.hypervolume(DEFAULT_HV_REF.0, DEFAULT_HV_REF.1),
		diversity: front.diversity(),
	}
}

pub fn run_exact(graph: &Graph, max_nodes: Option<u64>) -> AlgorithmResult {
	let start = Instant::now();
	let (front, diagnostics) = exact::solve(graph, max_nodes);
	log::info!(
		"exact: explored={} pruned={} front={}",
		diagnostics.nodes_explored,
		diagnostics.nodes_pruned,
		diagnostics.front_size
	);
	to_result(graph, &front, start.elapsed().as_secs_f64())
}

pub fn run_heuristic(graph: &Graph) -> AlgorithmResult {
	let start = Instant::now();
	let front = heuristic::solve(graph);
	to_result(graph, &front, start.elapsed().as_secs_f64())
}

pub fn run_evolutionary(graph: &Graph, params: evolutionary::Params) -> AlgorithmResult {
	let start = Instant::now();
	let front = evolutionary::solve(graph, params);
	to_result(graph, &front, start.elapsed().as_secs_f64())
}

pub fn run_all(graph: &Graph, max_nodes: Option<u64>, params: evolutionary::Params) -> ExperimentReport {
	let mut report = ExperimentReport::new();
	report.insert("exact".to_string(), run_exact(graph, max_nodes));
	report.insert("heuristic".to_string(), run_heuristic(graph));
	report.insert("meta".to_string(), run_evolutionary(graph, params));
	report
}
