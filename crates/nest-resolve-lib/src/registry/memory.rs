//! A registry held entirely in memory.
//!
//! Storages can be modified while shared, which lets callers change what a
//! registry offers between two resolutions.

use std::sync::{Arc, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;

use super::*;

#[derive(Debug)]
pub struct MemoryStorage {
	key: StorageKey,
	/* Broken bundles keep the reason their information can't be loaded */
	bundles: RwLock<IndexMap<BundleIdentifier, std::result::Result<BundleInformation, String>>>,
	loads: AtomicUsize,
}

impl MemoryStorage {
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: StorageKey(key.into()),
			bundles: Default::default(),
			loads: AtomicUsize::new(0),
		}
	}

	/// Adds or replaces a bundle, its identifier must be versioned.
	pub fn insert(&self, info: BundleInformation) -> crate::Result<()> {
		if info.identifier.version_qualifier().is_none() {
			return Err(crate::Error::InvalidArgument(format!("bundle `{}` has no version", info.identifier)));
		}
		self.bundles.write().unwrap_or_else(|e| e.into_inner()).insert(info.identifier.clone(), Ok(info));
		Ok(())
	}

	/// Adds a bundle that is listed by lookups but fails to load.
	pub fn insert_broken(&self, bundle: BundleIdentifier, reason: impl Into<String>) -> crate::Result<()> {
		if bundle.version_qualifier().is_none() {
			return Err(crate::Error::InvalidArgument(format!("bundle `{}` has no version", bundle)));
		}
		self.bundles.write().unwrap_or_else(|e| e.into_inner()).insert(bundle, Err(reason.into()));
		Ok(())
	}

	pub fn remove(&self, bundle: &BundleIdentifier) -> bool {
		self.bundles.write().unwrap_or_else(|e| e.into_inner()).shift_remove(bundle).is_some()
	}

	/// Number of bundle information loads served so far.
	pub fn load_count(&self) -> usize {
		self.loads.load(Ordering::Relaxed)
	}

	/// Versions of `bundle` in insertion order.
	fn versions_of(&self, bundle: &BundleIdentifier) -> Vec<BundleIdentifier> {
		self.bundles.read().unwrap_or_else(|e| e.into_inner())
			.keys()
			.filter(|id| id.without_version() == *bundle)
			.cloned()
			.collect()
	}
}

impl BundleStorageView for MemoryStorage {
	fn storage_key(&self) -> &StorageKey {
		&self.key
	}

	fn bundle_information(&self, bundle: &BundleIdentifier) -> std::result::Result<BundleInformation, LoadError> {
		self.loads.fetch_add(1, Ordering::Relaxed);
		match self.bundles.read().unwrap_or_else(|e| e.into_inner()).get(bundle) {
			Some(Ok(info)) => Ok(info.clone()),
			Some(Err(reason)) => Err(LoadError::new(bundle.clone(), reason.clone())),
			None => Err(LoadError::new(bundle.clone(), format!("bundle not found in storage `{}`", self.key))),
		}
	}
}

/// Looks bundles up in an ordered list of storages, the first storage that has
/// any version of a bundle provides all of its versions.
#[derive(Debug)]
pub struct MemoryLookup {
	key: LookupKey,
	storages: Vec<Arc<MemoryStorage>>,
	/* Where dependencies of the bundles found here are looked up, this lookup if `None` */
	relative_lookup: Option<Arc<MemoryLookup>>,
	queries: AtomicUsize,
}

impl MemoryLookup {
	pub fn new(key: impl Into<String>, storages: Vec<Arc<MemoryStorage>>) -> Self {
		Self {
			key: LookupKey(key.into()),
			storages,
			relative_lookup: None,
			queries: AtomicUsize::new(0),
		}
	}

	/// Makes the dependencies of the bundles found by this lookup resolve through `relative_lookup`.
	pub fn with_relative_lookup(mut self, relative_lookup: Arc<MemoryLookup>) -> Self {
		self.relative_lookup = Some(relative_lookup);
		self
	}

	pub fn relative_lookup(&self) -> Option<&Arc<MemoryLookup>> {
		self.relative_lookup.as_ref()
	}

	pub fn query_count(&self) -> usize {
		self.queries.load(Ordering::Relaxed)
	}
}

impl BundleLookup for MemoryLookup {
	fn lookup_key(&self) -> &LookupKey {
		&self.key
	}

	fn lookup_bundle_versions(&self, bundle: &BundleIdentifier) -> Option<VersionLookupResult> {
		self.queries.fetch_add(1, Ordering::Relaxed);
		let bundle = bundle.without_version();
		self.storages.iter().find_map(|storage| {
			let mut bundles = storage.versions_of(&bundle);
			if bundles.is_empty() {
				return None;
			}
			/* Stable, so equal versions keep insertion order. Unparsable versions go last */
			bundles.sort_by_cached_key(|id| std::cmp::Reverse(id.version_number().ok().flatten()));
			log::trace!("Lookup `{}` found {} version(s) of `{}` in `{}`", self.key, bundles.len(), bundle, storage.key);
			Some(VersionLookupResult {
				bundles,
				storage_view: storage.clone(),
				relative_lookup: self.relative_lookup.clone().map(|l| l as Arc<dyn BundleLookup>),
			})
		})
	}
}

/// A [`StorageConfiguration`] over a [`MemoryLookup`] and the lookups it is relative to.
#[derive(Debug, Clone)]
pub struct MemoryRepository {
	lookup: Arc<MemoryLookup>,
}

impl MemoryRepository {
	pub fn new(key: impl Into<String>, storages: Vec<Arc<MemoryStorage>>) -> Self {
		Self::from_lookup(Arc::new(MemoryLookup::new(key, storages)))
	}

	pub fn from_lookup(lookup: Arc<MemoryLookup>) -> Self {
		Self { lookup }
	}

	pub fn lookup(&self) -> &Arc<MemoryLookup> {
		&self.lookup
	}

	/// The root lookup followed by the chain of its relative lookups.
	fn lookups(&self) -> impl Iterator<Item = &Arc<MemoryLookup>> {
		std::iter::successors(Some(&self.lookup), |l| l.relative_lookup.as_ref())
	}

	fn storages(&self) -> impl Iterator<Item = &Arc<MemoryStorage>> {
		self.lookups().flat_map(|l| l.storages.iter())
	}

	pub fn storage(&self, key: &str) -> Option<&Arc<MemoryStorage>> {
		self.storages().find(|s| s.key.0 == key)
	}

	/// Number of version lookups and bundle information loads served so far.
	pub fn query_count(&self) -> usize {
		let mut seen = Vec::<&StorageKey>::new();
		let loads: usize = self.storages()
			.filter(|s| if seen.contains(&&s.key) { false } else { seen.push(&s.key); true })
			.map(|s| s.load_count())
			.sum();
		self.lookups().map(|l| l.query_count()).sum::<usize>() + loads
	}
}

impl StorageConfiguration for MemoryRepository {
	fn bundle_lookup(&self) -> Arc<dyn BundleLookup> {
		self.lookup.clone()
	}

	fn lookup_for_key(&self, key: &LookupKey) -> Option<Arc<dyn BundleLookup>> {
		self.lookups()
			.find(|l| l.key == *key)
			.map(|l| l.clone() as Arc<dyn BundleLookup>)
	}

	fn storage_view_for_key(&self, key: &StorageKey) -> Option<Arc<dyn BundleStorageView>> {
		self.storages()
			.find(|s| s.key == *key)
			.map(|s| s.clone() as Arc<dyn BundleStorageView>)
	}
}
