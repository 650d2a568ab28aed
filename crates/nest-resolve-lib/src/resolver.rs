//! Resolving the bundles needed for a set of requested bundles and a dependency file.
//!
//! # Usage
//! 1. Create a [`ResolverBuilder`] with [`DependencyResolver::builder()`] over the registries to use.
//! 1. Use the builder to add filters, constraints and [`ResolverOptions`].
//! 1. [`ResolverBuilder::build()`] to get a [`DependencyResolver`].
//! 1. [`DependencyResolver::resolve()`] with a [`ResolutionRequest`] for every resolution,
//! or go through a [`crate::tracking::ResolutionCache`] to skip resolutions whose inputs didn't change.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use petgraph::prelude::NodeIndex;
use rand::Rng;

use crate::bundle::*;
use crate::bundle::dependency::KIND_DEP;
use crate::config::ResolverOptions;
use crate::constraint::ConstraintConfiguration;
use crate::error::UnsatisfiedError;
use crate::filter::{self, DependencyFilter};
use crate::manifest::{JsonManifestReader, ManifestReader};
use crate::registry::StorageConfiguration;
use crate::solver::*;
use crate::tracking::{DependencyTracker, TrackedProperty, TrackedValue};

mod callbacks;
use callbacks::ResolutionCallbacks;

mod request;
pub use request::ResolutionRequest;
pub use request::ResolutionRequestBuilder;

mod output;
pub use output::ResolutionOutput;

#[derive(Debug)]
pub struct DependencyResolver {
	storage: Arc<dyn StorageConfiguration>,
	filter: DependencyFilter,
	constraints: ConstraintConfiguration,
	solver: Box<dyn Solver>,
	domain_resolution: bool,
	manifest_reader: Box<dyn ManifestReader>,
}

pub struct ResolverBuilder {
	storage: Arc<dyn StorageConfiguration>,
	filters: Vec<DependencyFilter>,
	constraints: ConstraintConfiguration,
	options: ResolverOptions,
	manifest_reader: Box<dyn ManifestReader>,
}

impl ResolverBuilder {
	/// Adds a filter, filters are applied in the order they are added.
	pub fn filter(mut self, filter: DependencyFilter) -> Self {
		self.filters.push(filter);
		self
	}

	pub fn filters(mut self, filters: impl IntoIterator<Item = DependencyFilter>) -> Self {
		self.filters.extend(filters);
		self
	}

	/// Axes left unset are taken from the default constraints of the options.
	pub fn constraints(mut self, constraints: ConstraintConfiguration) -> Self {
		self.constraints = constraints;
		self
	}

	pub fn options(mut self, options: ResolverOptions) -> Self {
		self.options = options;
		self
	}

	pub fn manifest_reader(mut self, reader: impl ManifestReader + 'static) -> Self {
		self.manifest_reader = Box::new(reader);
		self
	}

	pub fn build(self) -> DependencyResolver {
		let domain_resolution = self.options.supports_domain_resolution();
		let solver: Box<dyn Solver> = if domain_resolution {
			Box::new(DomainSolver)
		} else {
			log::debug!("Repository version {:?} predates domain resolution, using requirements solver",
				self.options.repository_version().map(ToString::to_string));
			Box::new(RequirementsSolver)
		};

		DependencyResolver {
			storage: self.storage,
			filter: DependencyFilter::chain(self.filters),
			constraints: self.constraints.with_defaults(self.options.default_constraints()),
			solver,
			domain_resolution,
			manifest_reader: self.manifest_reader,
		}
	}
}

fn random_root() -> BundleKey {
	let suffix: String = rand::thread_rng()
		.sample_iter(&rand::distributions::Alphanumeric)
		.take(16)
		.map(|c| char::from(c).to_ascii_lowercase())
		.collect();
	BundleKey::new(None, BundleIdentifier::from_parts(format!("root.{}", suffix), Default::default(), None))
}

/// Depth first, listing the direct dependencies of a bundle before descending into them.
fn collect_domain(domain: &ResolutionDomain) -> IndexSet<BundleKey> {
	let mut output = IndexSet::new();
	let mut visited = HashSet::<NodeIndex>::new();
	let mut pending = vec![domain.root()];
	while let Some(node) = pending.pop() {
		if !visited.insert(node) {
			continue;
		}
		let dependencies = domain.direct_dependencies(node);
		for d in &dependencies {
			if let Some(key) = domain.bundle_key(*d) {
				output.insert(key.clone());
			}
		}
		pending.extend(dependencies.into_iter().rev());
	}
	output
}

/// The selected bundles in output order, without the root.
fn flatten(resolution: Resolution, root: &BundleKey) -> ResolutionOutput {
	let mut output = match resolution {
		Resolution::Domain(domain) => collect_domain(&domain),
		Resolution::Declarations(declarations) => declarations.into_iter().map(|(_, key)| key).collect(),
	};
	output.shift_remove(root);
	ResolutionOutput::new(output)
}

impl DependencyResolver {
	pub fn builder(storage: Arc<dyn StorageConfiguration>) -> ResolverBuilder {
		ResolverBuilder {
			storage,
			filters: Default::default(),
			constraints: Default::default(),
			options: Default::default(),
			manifest_reader: Box::new(JsonManifestReader),
		}
	}

	pub fn storage(&self) -> &dyn StorageConfiguration {
		self.storage.as_ref()
	}

	/// The chained user filters.
	pub fn filter(&self) -> &DependencyFilter {
		&self.filter
	}

	pub fn constraints(&self) -> &ConstraintConfiguration {
		&self.constraints
	}

	pub fn uses_domain_resolution(&self) -> bool {
		self.domain_resolution
	}

	/// Reads and filters the dependency file of the request.
	fn dependency_file_information(&self, request: &ResolutionRequest, tracker: &mut dyn DependencyTracker) -> crate::Result<DependencyInfo> {
		let Some(path) = request.dependency_file() else {
			return Ok(DependencyInfo::default());
		};
		let property = TrackedProperty::DependencyFile { path: path.to_path_buf() };
		let bytes = match std::fs::read(path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				tracker.record(property, TrackedValue::Absent);
				return Err(crate::Error::DependencyFileNotFound(path.to_path_buf()));
			},
			Err(e) => return Err(e.into()),
		};
		tracker.record(property, TrackedValue::of_bytes(&bytes));

		let info = self.manifest_reader.parse(&bytes, request.self_bundle())?;
		Ok(filter::filter_with_constraints(None, &self.constraints, &self.filter, info).unwrap_or_default())
	}

	/// Dependencies of the resolution root.
	///
	/// Explicitly requested bundles come first and are not filtered, dependency file
	/// entries are only added for bundles not already requested. The last of several
	/// requested versions of a bundle is the one kept.
	fn root_dependencies(&self, request: &ResolutionRequest, file_info: DependencyInfo) -> crate::Result<DependencyInfo> {
		let mut dependencies = IndexMap::<BundleIdentifier, DependencyList>::new();
		for bundle in request.bundles() {
			let range = match bundle.version_number()? {
				Some(version) => VersionRange::Exact(version),
				None => VersionRange::Any,
			};
			let entry = DependencyEntry::new([KIND_DEP], range)?;
			dependencies.insert(bundle.without_meta_qualifiers(), DependencyList::single(entry));
		}
		for (bundle, list) in &file_info {
			if !dependencies.contains_key(bundle) {
				dependencies.insert(bundle.clone(), list.clone());
			}
		}

		if let Some(self_bundle) = request.self_bundle() {
			let self_bundle = self_bundle.without_meta_qualifiers();
			if dependencies.keys().any(|b| b.without_meta_qualifiers() == self_bundle) {
				return Err(crate::Error::SelfDependency(self_bundle));
			}
		}
		Ok(DependencyInfo::new(dependencies))
	}

	pub fn resolve(&self, request: &ResolutionRequest, tracker: &mut dyn DependencyTracker) -> crate::Result<ResolutionOutput> {
		if request.bundles().is_empty() && request.dependency_file().is_none() {
			return Err(crate::Error::MissingInput);
		}
		log::debug!("Resolving bundles: {:?} dependency file: {:?} constraints: {} filter: {}",
			request.bundles().iter().map(ToString::to_string).collect::<Vec<_>>(),
			request.dependency_file(),
			self.constraints,
			self.filter,
		);

		let file_info = self.dependency_file_information(request, tracker)?;
		let root_dependencies = self.root_dependencies(request, file_info)?;
		let root = random_root();

		let mut callbacks = ResolutionCallbacks::new(self.storage.bundle_lookup(), &self.filter, &self.constraints, tracker);
		let resolution = self.solver.solve(&root, &root_dependencies, &mut callbacks);
		let suppressed = callbacks.into_suppressed();

		let Some(resolution) = resolution else {
			log::debug!("Failed to satisfy dependencies, {} candidate(s) failed to load", suppressed.len());
			return Err(UnsatisfiedError::new(suppressed).into());
		};

		let output = flatten(resolution, &root);
		log::debug!("Resolved {}", output);
		Ok(output)
	}
}
