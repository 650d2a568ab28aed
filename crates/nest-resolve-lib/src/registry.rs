//! Seams towards the bundle registry.
//!
//! A registry is made of lookups, which answer which versions of a bundle exist,
//! and storage views, which hold the information of concrete bundles.
//! A lookup may answer with a different lookup to use for the dependencies of the bundles it found.

use std::sync::Arc;

use serde::*;

use crate::bundle::{BundleIdentifier, BundleInformation};
use crate::error::LoadError;

pub mod memory;
pub use memory::MemoryLookup;
pub use memory::MemoryRepository;
pub use memory::MemoryStorage;

/// Identifies a storage view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(pub String);

/// Identifies a bundle lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupKey(pub String);

impl std::fmt::Display for StorageKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

impl std::fmt::Display for LookupKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

pub trait BundleStorageView: Send + Sync + std::fmt::Debug {
	fn storage_key(&self) -> &StorageKey;

	/// Loads the information of a concrete, versioned bundle.
	fn bundle_information(&self, bundle: &BundleIdentifier) -> Result<BundleInformation, LoadError>;
}

pub trait BundleLookup: Send + Sync + std::fmt::Debug {
	fn lookup_key(&self) -> &LookupKey;

	/// Lists the available versions of `bundle`, which is given without version.
	///
	/// Returns `None` if the lookup doesn't know the bundle at all.
	fn lookup_bundle_versions(&self, bundle: &BundleIdentifier) -> Option<VersionLookupResult>;
}

/// The configured set of registries a resolution runs against.
pub trait StorageConfiguration: Send + Sync + std::fmt::Debug {
	/// The lookup used for requests that don't come from an already found bundle.
	fn bundle_lookup(&self) -> Arc<dyn BundleLookup>;

	fn lookup_for_key(&self, key: &LookupKey) -> Option<Arc<dyn BundleLookup>>;

	fn storage_view_for_key(&self, key: &StorageKey) -> Option<Arc<dyn BundleStorageView>>;
}

#[derive(Debug, Clone)]
pub struct VersionLookupResult {
	/// Versioned identifiers, highest version first.
	pub bundles: Vec<BundleIdentifier>,
	pub storage_view: Arc<dyn BundleStorageView>,
	/// Lookup for the dependencies of the found bundles, `None` to keep using the same lookup.
	pub relative_lookup: Option<Arc<dyn BundleLookup>>,
}

/// Where a found bundle came from and where its dependencies should be looked up.
#[derive(Debug, Clone)]
pub struct LookupContext {
	pub storage_view: Arc<dyn BundleStorageView>,
	pub relative_lookup: Arc<dyn BundleLookup>,
}
