//! JSON instance/solution file shapes and the validation that gates solver entry.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::InstanceError;
use crate::objectives::Objectives;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NodeSpec {
	pub id: u32,
	pub x: f64,
	pub y: f64,
	pub is_hub: bool,
	pub is_charging: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PolygonSpec {
	pub vertices: Vec<[f64; 2]>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct InstanceFile {
	pub nodes: Vec<NodeSpec>,
	pub no_fly_zones: Vec<PolygonSpec>,
	pub map_size: f64,
}

impl InstanceFile {
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InstanceError> {
		let reader = BufReader::new(File::open(path)?);
		let instance: Self = serde_json::from_reader(reader)?;
		instance.validate()?;
		Ok(instance)
	}

	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), InstanceError> {
		let file = File::create(path)?;
		serde_json::to_writer_pretty(file, self)?;
		Ok(())
	}

	/// Exactly one `is_hub = true` at id 0; ids form `{0, ..., N-1}`; every polygon has >= 3 vertices.
	pub fn validate(&self) -> Result<(), InstanceError> {
		let mut hub_ids: Vec<u32> = self.nodes.iter().filter(|n| n.is_hub).map(|n| n.id).collect();
		if hub_ids.is_empty() {
			return Err(InstanceError::MissingHub);
		}
		if hub_ids.len() > 1 {
			hub_ids.sort_unstable();
			return Err(InstanceError::DuplicateHub(hub_ids[0], hub_ids[1]));
		}
		if hub_ids[0] != 0 {
			return Err(InstanceError::HubNotZero(hub_ids[0]));
		}

		let mut seen: HashSet<u32> = HashSet::new();
		for node in &self.nodes {
			if !seen.insert(node.id) {
				return Err(InstanceError::NonContiguousIds(node.id));
			}
		}
		for id in 0..self.nodes.len() as u32 {
			if !seen.contains(&id) {
				return Err(InstanceError::NonContiguousIds(id));
			}
		}

		for (i, zone) in self.no_fly_zones.iter().enumerate() {
			if zone.vertices.len() < 3 {
				return Err(InstanceError::DegeneratePolygon(i));
			}
		}
		Ok(())
	}
}

fn round4(v: f64) -> f64 {
	(v * 10_000.0).round() / 10_000.0
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SolutionRecord {
	pub route: Vec<u32>,
	pub objectives: ObjectivesRecord,
	pub feasible: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ObjectivesRecord {
	pub distance: f64,
	pub risk: f64,
	pub recharges: u32,
}

impl From<&Objectives> for ObjectivesRecord {
	fn from(o: &Objectives) -> Self {
		Self {
			distance: round4(o.distance),
			risk: round4(o.risk),
			recharges: o.recharges,
		}
	}
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AlgorithmResult {
	pub time: f64,
	pub memory: f64,
	pub pareto_front: Vec<SolutionRecord>,
	pub hypervolume: f64,
	pub diversity: f64,
}

pub type ExperimentReport = IndexMap<String, AlgorithmResult>;

pub fn write_report<P: AsRef<Path>>(path: P, report: &ExperimentReport) -> Result<(), InstanceError> {
	let file = File::create(path)?;
	serde_json::to_writer_pretty(file, report)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: u32, x: f64, y: f64, is_hub: bool, is_charging: bool) -> NodeSpec {
		NodeSpec { id, x, y, is_hub, is_charging }
	}

	#[test]
	fn validate_accepts_contiguous_single_hub() {
		let instance = InstanceFile {
			nodes: vec![node(0, 50.0, 50.0, true, false), node(1, 0.0, 0.0, false, false)],
			no_fly_zones: vec![],
			map_size: 100.0,
		};
		assert!(instance.validate().is_ok());
	}

	#[test]
	fn validate_rejects_missing_hub() {
		let instance = InstanceFile {
			nodes: vec![node(0, 50.0, 50.0, false, false)],
			no_fly_zones: vec![],
			map_size: 100.0,
		};
		assert!(matches!(instance.validate(), Err(InstanceError::MissingHub)));
	}

	#[test]
	fn validate_rejects_hub_not_zero() {
		let instance = InstanceFile {
			nodes: vec![node(1, 50.0, 50.0, true, false), node(0, 0.0, 0.0, false, false)],
			no_fly_zones: vec![],
			map_size: 100.0,
		};
		assert!(matches!(instance.validate(), Err(InstanceError::HubNotZero(1))));
	}

	#[test]
	fn validate_rejects_degenerate_polygon() {
		let instance = InstanceFile {
			nodes: vec![node(0, 50.0, 50.0, true, false)],
			no_fly_zones: vec![PolygonSpec { vertices: vec![[0.0, 0.0], [1.0, 1.0]] }],
			map_size: 100.0,
		};
		assert!(matches!(instance.validate(), Err(InstanceError::DegeneratePolygon(0))));
	}

	#[test]
	fn save_then_load_reproduces_nodes_zones_and_map_size() {
		let instance = InstanceFile {
			nodes: vec![
				node(0, 50.0, 50.0, true, false),
				node(1, 0.0, 0.0, false, true),
				node(2, 100.0, 0.0, false, false),
			],
			no_fly_zones: vec![PolygonSpec {
				vertices: vec![[40.0, 40.0], [60.0, 40.0], [60.0, 60.0], [40.0, 60.0]],
			}],
			map_size: 100.0,
		};

		let path = std::env::temp_dir().join(format!("drone-pareto-router-roundtrip-{}.json", std::process::id()));
		instance.save(&path).expect("save should succeed");
		let reloaded = InstanceFile::load(&path).expect("load should succeed");
		std::fs::remove_file(&path).ok();

		assert_eq!(reloaded.nodes.len(), instance.nodes.len());
		for (a, b) in instance.nodes.iter().zip(reloaded.nodes.iter()) {
			assert_eq!(a.id, b.id);
			assert_eq!(a.x, b.x);
			assert_eq!(a.y, b.y);
			assert_eq!(a.is_hub, b.is_hub);
			assert_eq!(a.is_charging, b.is_charging);
		}
		assert_eq!(reloaded.no_fly_zones.len(), instance.no_fly_zones.len());
		for (a, b) in instance.no_fly_zones.iter().zip(reloaded.no_fly_zones.iter()) {
			assert_eq!(a.vertices, b.vertices);
		}
		assert_eq!(reloaded.map_size, instance.map_size);
	}
}
