//! Categorized instance-loading failures. Everything past this boundary (infeasible
//! routes, budget exhaustion, isolated nodes, empty polygon lists) is data, not an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstanceError {
	#[error("failed to read instance file: {0}")]
	Io(#[from] std::io::Error),

	#[error("malformed instance JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("instance has no node flagged is_hub")]
	MissingHub,

	#[error("node {0} is flagged is_hub but hub must have id 0")]
	HubNotZero(u32),

	#[error("more than one node is flagged is_hub ({0} and {1})")]
	DuplicateHub(u32, u32),

	#[error("node ids must form a contiguous range 0..N, found duplicate or gap at {0}")]
	NonContiguousIds(u32),

	#[error("polygon {0} has fewer than 3 vertices")]
	DegeneratePolygon(usize),
}
