//! The three-dimensional cost triple every solver minimizes, and its dominance order.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug)]
pub enum Axis {
	Distance,
	Risk,
	Recharges,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct Objectives {
	pub distance: f64,
	pub risk: f64,
	pub recharges: u32,
}

impl Objectives {
	pub const ZERO: Self = Self {
		distance: 0.0,
		risk: 0.0,
		recharges: 0,
	};

	/// Componentwise `<=` on all three axes with strict `<` on at least one.
	pub fn dominates(&self, other: &Self) -> bool {
		let le = self.distance <= other.distance
			&& self.risk <= other.risk
			&& self.recharges <= other.recharges;
		let lt = self.distance < other.distance
			|| self.risk < other.risk
			|| self.recharges < other.recharges;
		le && lt
	}

	/// Projects onto a single axis; replaces dynamic "for each objective" attribute access.
	pub fn project(&self, axis: Axis) -> f64 {
		match axis {
			Axis::Distance => self.distance,
			Axis::Risk => self.risk,
			Axis::Recharges => self.recharges as f64,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dominance_requires_strict_improvement() {
		let a = Objectives { distance: 10.0, risk: 0.1, recharges: 0 };
		let b = Objectives { distance: 10.0, risk: 0.1, recharges: 0 };
		assert!(!a.dominates(&b));
	}

	#[test]
	fn dominance_on_single_axis() {
		let a = Objectives { distance: 9.0, risk: 0.1, recharges: 0 };
		let b = Objectives { distance: 10.0, risk: 0.1, recharges: 0 };
		assert!(a.dominates(&b));
		assert!(!b.dominates(&a));
	}

	#[test]
	fn project_recharges_as_float() {
		let o = Objectives { distance: 1.0, risk: 0.0, recharges: 3 };
		assert_eq!(o.project(Axis::Recharges), 3.0);
	}
}
