use serde::*;

use super::BundleIdentifier;
use crate::registry::StorageKey;

/// A concrete bundle as found in a specific storage view.
///
/// Two registries may expose the same identifier, the storage key keeps them apart.
/// The synthetic resolution root is the only key without a storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BundleKey {
	storage: Option<StorageKey>,
	identifier: BundleIdentifier,
}

impl BundleKey {
	pub fn new(storage: Option<StorageKey>, identifier: BundleIdentifier) -> Self {
		Self { storage, identifier }
	}

	pub fn storage(&self) -> Option<&StorageKey> {
		self.storage.as_ref()
	}

	pub fn bundle_identifier(&self) -> &BundleIdentifier {
		&self.identifier
	}
}

impl std::fmt::Display for BundleKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.storage {
			Some(storage) if f.alternate() => write!(f, "{}@{}", self.identifier, storage),
			_ => write!(f, "{}", self.identifier),
		}
	}
}
