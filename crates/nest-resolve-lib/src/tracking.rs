//! Recording the external state a resolution depends on.
//!
//! Every registry answer and file a resolution reads is reported to a [`DependencyTracker`]
//! as a [`TrackedProperty`] with a fingerprint of what was seen. A later run can compare
//! the fingerprints with [`TrackedProperty::current_value`] to know if anything relevant changed.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::*;

use crate::bundle::{BundleIdentifier, BundleInformation};
use crate::error::LoadError;
use crate::registry::{LookupKey, StorageConfiguration, StorageKey, VersionLookupResult};

mod cache;
pub use cache::ResolutionCache;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackedProperty {
	/// The lookup used for the bundles requested directly.
	RootLookupKey,
	/// The versions a lookup offers for a bundle.
	BundleVersions { lookup: LookupKey, bundle: BundleIdentifier },
	/// The information a storage holds for a concrete bundle.
	BundleInformation { storage: StorageKey, bundle: BundleIdentifier },
	/// The contents of a dependency file.
	DependencyFile { path: PathBuf },
}

impl std::fmt::Display for TrackedProperty {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::RootLookupKey => write!(f, "root lookup"),
			Self::BundleVersions { lookup, bundle } => write!(f, "versions of `{}` in lookup `{}`", bundle, lookup),
			Self::BundleInformation { storage, bundle } => write!(f, "information of `{}` in storage `{}`", bundle, storage),
			Self::DependencyFile { path } => write!(f, "dependency file `{}`", path.display()),
		}
	}
}

/// Fingerprint of an observed property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackedValue {
	Absent,
	/// SHA-256 of the bincode encoded value.
	Present(String),
	/// Could not be observed, never equal to a later observation.
	Unknown,
}

/* What a version lookup answered, without the trait objects */
#[derive(Serialize)]
struct VersionsFingerprint<'a> {
	bundles: &'a [BundleIdentifier],
	storage: &'a StorageKey,
	relative_lookup: Option<&'a LookupKey>,
}

impl TrackedValue {
	pub fn observe<T: Serialize + ?Sized>(value: Option<&T>) -> Self {
		match value {
			None => Self::Absent,
			Some(v) => match bincode::serialize(v) {
				Ok(bytes) => Self::of_bytes(&bytes),
				Err(e) => {
					log::warn!("Failed to fingerprint tracked value: {}", e);
					Self::Unknown
				}
			},
		}
	}

	pub fn of_bytes(bytes: &[u8]) -> Self {
		Self::Present(sha256::digest(bytes))
	}

	pub fn of_lookup_key(key: &LookupKey) -> Self {
		Self::observe(Some(key))
	}

	pub fn of_versions(result: Option<&VersionLookupResult>) -> Self {
		Self::observe(result.map(|r| VersionsFingerprint {
			bundles: &r.bundles,
			storage: r.storage_view.storage_key(),
			relative_lookup: r.relative_lookup.as_ref().map(|l| l.lookup_key()),
		}).as_ref())
	}

	pub fn of_information(result: &Result<BundleInformation, LoadError>) -> Self {
		let result: Result<&BundleInformation, &str> = result.as_ref().map_err(|e| e.reason.as_str());
		Self::observe(Some(&result))
	}

	/// `true` if `current` is the same observation, [`TrackedValue::Unknown`] is never unchanged.
	pub fn is_unchanged(&self, current: &TrackedValue) -> bool {
		!matches!(self, Self::Unknown) && self == current
	}
}

impl TrackedProperty {
	/// Observes the property again against `storage`.
	pub fn current_value(&self, storage: &dyn StorageConfiguration) -> TrackedValue {
		match self {
			Self::RootLookupKey => TrackedValue::of_lookup_key(storage.bundle_lookup().lookup_key()),
			Self::BundleVersions { lookup, bundle } => match storage.lookup_for_key(lookup) {
				Some(lookup) => TrackedValue::of_versions(lookup.lookup_bundle_versions(bundle).as_ref()),
				None => TrackedValue::Unknown,
			},
			Self::BundleInformation { storage: key, bundle } => match storage.storage_view_for_key(key) {
				Some(view) => TrackedValue::of_information(&view.bundle_information(bundle)),
				None => TrackedValue::Unknown,
			},
			Self::DependencyFile { path } => match std::fs::read(path) {
				Ok(bytes) => TrackedValue::of_bytes(&bytes),
				Err(e) if e.kind() == std::io::ErrorKind::NotFound => TrackedValue::Absent,
				Err(e) => {
					log::warn!("Failed to read `{}`: {}", path.display(), e);
					TrackedValue::Unknown
				}
			},
		}
	}
}

/// Receives the external state a resolution observed.
pub trait DependencyTracker {
	fn record(&mut self, property: TrackedProperty, value: TrackedValue);
}

/// Keeps the first value recorded for each property.
#[derive(Debug, Default, Clone)]
pub struct RecordingTracker {
	properties: IndexMap<TrackedProperty, TrackedValue>,
}

impl RecordingTracker {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn properties(&self) -> &IndexMap<TrackedProperty, TrackedValue> {
		&self.properties
	}

	pub fn into_properties(self) -> IndexMap<TrackedProperty, TrackedValue> {
		self.properties
	}

	pub fn get(&self, property: &TrackedProperty) -> Option<&TrackedValue> {
		self.properties.get(property)
	}
}

impl DependencyTracker for RecordingTracker {
	fn record(&mut self, property: TrackedProperty, value: TrackedValue) {
		log::trace!("Recorded {}", property);
		self.properties.entry(property).or_insert(value);
	}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracker;

impl DependencyTracker for NoopTracker {
	fn record(&mut self, _: TrackedProperty, _: TrackedValue) {}
}
