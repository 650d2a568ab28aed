use std::path::{Path, PathBuf};

use serde::*;

use crate::bundle::BundleIdentifier;

/// What to resolve, explicitly requested bundles and/or a dependency file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolutionRequest {
	bundles: Vec<BundleIdentifier>,
	dependency_file: Option<PathBuf>,
	self_bundle: Option<BundleIdentifier>,
}

impl ResolutionRequest {
	pub fn builder() -> ResolutionRequestBuilder {
		ResolutionRequestBuilder::default()
	}

	/// Explicitly requested bundles, without duplicates in request order.
	pub fn bundles(&self) -> &[BundleIdentifier] {
		&self.bundles
	}

	pub fn dependency_file(&self) -> Option<&Path> {
		self.dependency_file.as_deref()
	}

	/// The bundle the dependency file belongs to.
	pub fn self_bundle(&self) -> Option<&BundleIdentifier> {
		self.self_bundle.as_ref()
	}
}

#[derive(Debug, Default, Clone)]
pub struct ResolutionRequestBuilder {
	bundles: Vec<BundleIdentifier>,
	dependency_file: Option<PathBuf>,
	self_bundle: Option<BundleIdentifier>,
}

impl ResolutionRequestBuilder {
	pub fn bundle(mut self, bundle: BundleIdentifier) -> Self {
		self.bundles.push(bundle);
		self
	}

	pub fn bundles(mut self, bundles: impl IntoIterator<Item = BundleIdentifier>) -> Self {
		self.bundles.extend(bundles);
		self
	}

	pub fn dependency_file(mut self, path: impl Into<PathBuf>) -> Self {
		self.dependency_file = Some(path.into());
		self
	}

	pub fn self_bundle(mut self, bundle: BundleIdentifier) -> Self {
		self.self_bundle = Some(bundle);
		self
	}

	pub fn build(self) -> ResolutionRequest {
		let mut bundles = Vec::with_capacity(self.bundles.len());
		for b in self.bundles {
			if !bundles.contains(&b) {
				bundles.push(b);
			}
		}
		ResolutionRequest {
			bundles,
			dependency_file: self.dependency_file,
			self_bundle: self.self_bundle,
		}
	}
}
