use indexmap::IndexSet;
use serde::*;

use crate::bundle::BundleKey;

/// The bundles a resolution selected, in the order they were discovered.
///
/// Equality and hashing take the order into account.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolutionOutput {
	bundles: IndexSet<BundleKey>,
}

impl ResolutionOutput {
	pub(crate) fn new(bundles: IndexSet<BundleKey>) -> Self {
		Self { bundles }
	}

	pub fn bundles(&self) -> &IndexSet<BundleKey> {
		&self.bundles
	}

	pub fn iter(&self) -> indexmap::set::Iter<'_, BundleKey> {
		self.bundles.iter()
	}

	pub fn contains(&self, bundle: &BundleKey) -> bool {
		self.bundles.contains(bundle)
	}

	pub fn len(&self) -> usize {
		self.bundles.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bundles.is_empty()
	}
}

impl PartialEq for ResolutionOutput {
	fn eq(&self, other: &Self) -> bool {
		self.bundles.iter().eq(other.bundles.iter())
	}
}

impl Eq for ResolutionOutput {}

impl std::hash::Hash for ResolutionOutput {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		state.write_usize(self.bundles.len());
		for b in &self.bundles {
			b.hash(state);
		}
	}
}

impl<'a> IntoIterator for &'a ResolutionOutput {
	type Item = &'a BundleKey;
	type IntoIter = indexmap::set::Iter<'a, BundleKey>;
	fn into_iter(self) -> Self::IntoIter { self.bundles.iter() }
}

impl std::fmt::Display for ResolutionOutput {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "[")?;
		for (i, b) in self.bundles.iter().enumerate() {
			if i > 0 { write!(f, ", ")?; }
			write!(f, "{}", b)?;
		}
		write!(f, "]")
	}
}
