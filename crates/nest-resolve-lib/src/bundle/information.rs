use serde::*;

use super::{BundleIdentifier, DependencyInfo};
use crate::constraint::EnvironmentRequirements;

/// Metadata of a single bundle as stored in a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleInformation {
	pub identifier: BundleIdentifier,
	#[serde(default)]
	pub dependencies: DependencyInfo,
	#[serde(default)]
	pub requirements: EnvironmentRequirements,
}

impl BundleInformation {
	pub fn new(identifier: BundleIdentifier) -> Self {
		Self {
			identifier,
			dependencies: Default::default(),
			requirements: Default::default(),
		}
	}

	pub fn with_dependencies(mut self, dependencies: DependencyInfo) -> Self {
		self.dependencies = dependencies;
		self
	}

	pub fn with_requirements(mut self, requirements: EnvironmentRequirements) -> Self {
		self.requirements = requirements;
		self
	}
}
