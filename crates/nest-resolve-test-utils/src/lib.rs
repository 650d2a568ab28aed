//! Various helper functions for testing
//!
//! functions in this module should use results and not use any panics to avoid confusion in callers

use std::io::Write;
use std::sync::Arc;

use nest_resolve::bundle::*;
use nest_resolve::registry::{MemoryRepository, MemoryStorage, StorageConfiguration};
use nest_resolve::ResolutionOutput;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error(transparent)]
	Resolve(#[from] nest_resolve::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Sets up logging for the test binary, safe to call from every test.
pub fn init_logging() {
	let _ = env_logger::builder().is_test(true).try_init();
}

pub fn id(identifier: &str) -> Result<BundleIdentifier> {
	Ok(BundleIdentifier::parse(identifier)?)
}

/// A dependency of `kinds` on versions in `range`.
pub fn dependency(kinds: &[&str], range: &str) -> Result<DependencyEntry> {
	Ok(DependencyEntry::new(kinds.iter().copied(), VersionRange::parse(range)?)?)
}

pub fn classpath(range: &str) -> Result<DependencyEntry> {
	dependency(&["classpath"], range)
}

/// Builds a [`DependencyInfo`] with one entry per target.
pub fn dependencies(entries: Vec<(&str, DependencyEntry)>) -> Result<DependencyInfo> {
	entries.into_iter()
		.map(|(target, entry)| Ok((id(target)?, DependencyList::single(entry))))
		.collect()
}

/// A registry with a single storage, keyed `test` for both the lookup and the storage.
#[derive(Debug, Clone)]
pub struct TestRepository {
	pub storage: Arc<MemoryStorage>,
	pub repository: Arc<MemoryRepository>,
}

impl TestRepository {
	pub fn configuration(&self) -> Arc<dyn StorageConfiguration> {
		self.repository.clone()
	}

	/// The key a bundle of this repository is resolved to.
	pub fn key(&self, identifier: &str) -> Result<BundleKey> {
		Ok(BundleKey::new(Some(nest_resolve::registry::StorageKey("test".to_string())), id(identifier)?))
	}

	pub fn add_bundle(&self, identifier: &str, dependencies: Vec<(&str, DependencyEntry)>) -> Result<()> {
		let info = BundleInformation::new(id(identifier)?).with_dependencies(self::dependencies(dependencies)?);
		Ok(self.storage.insert(info)?)
	}
}

#[derive(Debug, Default)]
pub struct RepositoryBuilder {
	bundles: Vec<(String, Vec<(String, DependencyEntry)>)>,
	informations: Vec<BundleInformation>,
	broken: Vec<(String, String)>,
}

impl RepositoryBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn bundle(mut self, identifier: &str, dependencies: Vec<(&str, DependencyEntry)>) -> Self {
		self.bundles.push((identifier.to_string(), dependencies.into_iter().map(|(t, e)| (t.to_string(), e)).collect()));
		self
	}

	pub fn bundle_information(mut self, info: BundleInformation) -> Self {
		self.informations.push(info);
		self
	}

	/// A bundle that is listed but fails to load.
	pub fn broken(mut self, identifier: &str, reason: &str) -> Self {
		self.broken.push((identifier.to_string(), reason.to_string()));
		self
	}

	pub fn build(self) -> Result<TestRepository> {
		let storage = Arc::new(MemoryStorage::new("test"));
		for (identifier, deps) in self.bundles {
			let deps = deps.iter().map(|(t, e)| (t.as_str(), e.clone())).collect();
			storage.insert(BundleInformation::new(id(&identifier)?).with_dependencies(dependencies(deps)?))?;
		}
		for info in self.informations {
			storage.insert(info)?;
		}
		for (identifier, reason) in self.broken {
			storage.insert_broken(id(&identifier)?, reason)?;
		}
		Ok(TestRepository {
			repository: Arc::new(MemoryRepository::new("test", vec![storage.clone()])),
			storage,
		})
	}
}

/// Writes a dependency file to a temporary location, removed when the returned value is dropped.
pub fn write_dependency_file(contents: &str) -> Result<tempfile::NamedTempFile> {
	let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
	file.write_all(contents.as_bytes())?;
	file.flush()?;
	Ok(file)
}

/// Identifiers of the resolved bundles in output order.
pub fn bundle_names(output: &ResolutionOutput) -> Vec<String> {
	output.iter().map(|k| k.bundle_identifier().to_string()).collect()
}
