//! Environment compatibility constraints.
//!
//! A [`ConstraintConfiguration`] describes the environment a resolution runs for,
//! [`EnvironmentRequirements`] describe what a bundle or a single dependency needs.
//! Axes left unset on either side never exclude anything.

use std::collections::{BTreeMap, BTreeSet};

use serde::*;

use crate::bundle::{BundleInformation, DependencyEntry, VersionNumber, VersionRange};

pub const META_JRE_VERSION: &str = "jre-version";
pub const META_REPOSITORY_VERSION: &str = "repository-version";
pub const META_BUILD_SYSTEM_VERSION: &str = "build-system-version";
pub const META_NATIVE_ARCHITECTURE: &str = "native-architecture";

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstraintConfiguration {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	jre_major_version: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	repository_version: Option<VersionNumber>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	build_system_version: Option<VersionNumber>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	native_architecture: Option<String>,
}

impl ConstraintConfiguration {
	pub fn jre_major_version(&self) -> Option<u32> {
		self.jre_major_version
	}
	pub fn with_jre_major_version(mut self, version: Option<u32>) -> Self {
		self.jre_major_version = version;
		self
	}

	pub fn repository_version(&self) -> Option<&VersionNumber> {
		self.repository_version.as_ref()
	}
	pub fn with_repository_version(mut self, version: Option<VersionNumber>) -> Self {
		self.repository_version = version;
		self
	}

	pub fn build_system_version(&self) -> Option<&VersionNumber> {
		self.build_system_version.as_ref()
	}
	pub fn with_build_system_version(mut self, version: Option<VersionNumber>) -> Self {
		self.build_system_version = version;
		self
	}

	pub fn native_architecture(&self) -> Option<&str> {
		self.native_architecture.as_deref()
	}
	pub fn with_native_architecture(mut self, architecture: Option<String>) -> Self {
		self.native_architecture = architecture.map(|a| a.to_ascii_lowercase());
		self
	}

	/// Fills every unset axis from `defaults`.
	pub fn with_defaults(self, defaults: &ConstraintConfiguration) -> Self {
		Self {
			jre_major_version: self.jre_major_version.or(defaults.jre_major_version),
			repository_version: self.repository_version.or_else(|| defaults.repository_version.clone()),
			build_system_version: self.build_system_version.or_else(|| defaults.build_system_version.clone()),
			native_architecture: self.native_architecture.or_else(|| defaults.native_architecture.clone()),
		}
	}

	pub fn is_unconstrained(&self) -> bool {
		*self == Self::default()
	}
}

impl std::fmt::Display for ConstraintConfiguration {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut parts = Vec::new();
		if let Some(v) = self.jre_major_version { parts.push(format!("jre={}", v)); }
		if let Some(v) = &self.repository_version { parts.push(format!("repository={}", v)); }
		if let Some(v) = &self.build_system_version { parts.push(format!("build-system={}", v)); }
		if let Some(v) = &self.native_architecture { parts.push(format!("arch={}", v)); }
		write!(f, "{{{}}}", parts.join(", "))
	}
}

/// What a bundle or a dependency declares about the environment it can be used in.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentRequirements {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub jre_versions: Option<VersionRange>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub repository_versions: Option<VersionRange>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub build_system_versions: Option<VersionRange>,
	/// Lowercase architecture names.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub native_architectures: Option<BTreeSet<String>>,
}

impl EnvironmentRequirements {
	/// Reads the requirements from dependency metadata.
	///
	/// Values that fail to parse are logged and treated as unset.
	pub fn from_metadata(metadata: &BTreeMap<String, String>) -> Self {
		fn range(metadata: &BTreeMap<String, String>, key: &str) -> Option<VersionRange> {
			let value = metadata.get(key)?;
			match VersionRange::parse(value) {
				Ok(r) => Some(r),
				Err(e) => {
					log::warn!("Ignoring unparsable `{}` metadata `{}`: {}", key, value, e);
					None
				}
			}
		}

		Self {
			jre_versions: range(metadata, META_JRE_VERSION),
			repository_versions: range(metadata, META_REPOSITORY_VERSION),
			build_system_versions: range(metadata, META_BUILD_SYSTEM_VERSION),
			native_architectures: metadata.get(META_NATIVE_ARCHITECTURE).map(|v| {
				v.split(',')
					.map(|a| a.trim().to_ascii_lowercase())
					.filter(|a| !a.is_empty())
					.collect()
			}),
		}
	}

	/// `true` if the environment described by `constraints` can't satisfy these requirements.
	pub fn excludes(&self, constraints: &ConstraintConfiguration) -> bool {
		fn outside(range: &Option<VersionRange>, version: Option<&VersionNumber>) -> bool {
			match (range, version) {
				(Some(range), Some(version)) => !range.includes(version),
				_ => false,
			}
		}

		let jre = constraints.jre_major_version.map(VersionNumber::from);
		if outside(&self.jre_versions, jre.as_ref())
			|| outside(&self.repository_versions, constraints.repository_version.as_ref())
			|| outside(&self.build_system_versions, constraints.build_system_version.as_ref())
		{
			return true;
		}
		match (&self.native_architectures, &constraints.native_architecture) {
			(Some(archs), Some(arch)) => !archs.contains(arch),
			_ => false,
		}
	}
}

/// Whether a single dependency declaration is unusable under `constraints`.
pub fn dependency_excludes(constraints: &ConstraintConfiguration, entry: &DependencyEntry) -> bool {
	EnvironmentRequirements::from_metadata(entry.metadata()).excludes(constraints)
}

/// Whether a whole bundle is unusable under `constraints`.
pub fn bundle_excludes(constraints: &ConstraintConfiguration, info: &BundleInformation) -> bool {
	info.requirements.excludes(constraints)
}
