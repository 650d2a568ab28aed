//! Declared dependencies of a bundle.
//!
//! All types here are immutable once built, filtering always produces new values.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::*;

use super::{BundleIdentifier, VersionRange};

/// Kind assigned to dependencies added from explicitly requested bundles.
pub const KIND_DEP: &str = "dep";
pub const KIND_CLASSPATH: &str = "classpath";

pub const META_COMPILE_TRANSITIVE: &str = "compile-transitive";
pub const META_PRIVATE: &str = "private";

/// A single declared dependency edge towards a target bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDependencyEntry")]
pub struct DependencyEntry {
	kinds: BTreeSet<String>,
	range: VersionRange,
	/// `None` when the declaration predates the native private flag.
	#[serde(skip_serializing_if = "Option::is_none")]
	private: Option<bool>,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	metadata: BTreeMap<String, String>,
}

/// Deserialized form of [`DependencyEntry`] before its kinds are checked.
#[derive(Deserialize)]
struct RawDependencyEntry {
	kinds: BTreeSet<String>,
	#[serde(default)]
	range: VersionRange,
	#[serde(default)]
	private: Option<bool>,
	#[serde(default)]
	metadata: BTreeMap<String, String>,
}

impl TryFrom<RawDependencyEntry> for DependencyEntry {
	type Error = crate::Error;

	fn try_from(raw: RawDependencyEntry) -> crate::Result<Self> {
		let entry = Self::new(raw.kinds, raw.range)?;
		Ok(Self { private: raw.private, metadata: raw.metadata, ..entry })
	}
}

impl DependencyEntry {
	/// `kinds` must contain at least one kind.
	pub fn new<S: Into<String>>(kinds: impl IntoIterator<Item = S>, range: VersionRange) -> crate::Result<Self> {
		let kinds: BTreeSet<String> = kinds.into_iter().map(Into::into).collect();
		if kinds.is_empty() {
			return Err(crate::Error::InvalidArgument("dependency declared without any kind".to_string()));
		}
		Ok(Self { kinds, range, private: None, metadata: Default::default() })
	}

	pub fn with_private(mut self, private: bool) -> Self {
		self.private = Some(private);
		self
	}

	pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.metadata.insert(key.into(), value.into());
		self
	}

	/// Returns a copy with `kinds` replaced, `None` if `kinds` is empty.
	pub fn with_kinds(&self, kinds: BTreeSet<String>) -> Option<Self> {
		if kinds.is_empty() {
			return None;
		}
		Some(Self { kinds, ..self.clone() })
	}

	pub fn kinds(&self) -> &BTreeSet<String> {
		&self.kinds
	}

	pub fn range(&self) -> &VersionRange {
		&self.range
	}

	pub fn metadata(&self) -> &BTreeMap<String, String> {
		&self.metadata
	}

	pub fn metadata_value(&self, key: &str) -> Option<&str> {
		self.metadata.get(key).map(String::as_str)
	}

	/// Whether the dependency is private to the declaring bundle.
	///
	/// Declarations without the native flag fall back to the `private` metadata entry.
	pub fn is_private(&self) -> bool {
		match self.private {
			Some(p) => p,
			None => self.metadata_value(META_PRIVATE).map_or(false, |v| v.eq_ignore_ascii_case("true")),
		}
	}

	/// `compile-transitive: false`, compared case-insensitively.
	pub fn is_compile_non_transitive(&self) -> bool {
		self.metadata_value(META_COMPILE_TRANSITIVE).map_or(false, |v| v.eq_ignore_ascii_case("false"))
	}
}

/// Every declared edge towards one target bundle, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyList {
	entries: Vec<DependencyEntry>,
}

impl DependencyList {
	pub fn new(entries: Vec<DependencyEntry>) -> Self {
		Self { entries }
	}

	pub fn single(entry: DependencyEntry) -> Self {
		Self { entries: vec![entry] }
	}

	pub fn entries(&self) -> &[DependencyEntry] {
		&self.entries
	}

	pub fn iter(&self) -> std::slice::Iter<'_, DependencyEntry> {
		self.entries.iter()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Maps every entry, dropping those mapped to `None`.
	///
	/// Returns `None` if no entry remains.
	pub fn filter(&self, mut f: impl FnMut(&DependencyEntry) -> Option<DependencyEntry>) -> Option<Self> {
		let entries: Vec<_> = self.entries.iter().filter_map(|e| f(e)).collect();
		if entries.is_empty() {
			None
		} else {
			Some(Self { entries })
		}
	}

	/// Intersection of every entry's range, `None` if the entries can't all be satisfied at once.
	pub fn combined_range(&self) -> Option<VersionRange> {
		self.entries.iter()
			.try_fold(VersionRange::Any, |acc, e| acc.intersection(e.range()))
	}
}

impl<'a> IntoIterator for &'a DependencyList {
	type Item = &'a DependencyEntry;
	type IntoIter = std::slice::Iter<'a, DependencyEntry>;
	fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}

/// The dependencies of a bundle keyed by target identifier without version.
///
/// Keeps declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyInfo {
	dependencies: IndexMap<BundleIdentifier, DependencyList>,
}

impl DependencyInfo {
	pub fn new(dependencies: IndexMap<BundleIdentifier, DependencyList>) -> Self {
		Self { dependencies }
	}

	pub fn dependency_list(&self, bundle: &BundleIdentifier) -> Option<&DependencyList> {
		self.dependencies.get(bundle)
	}

	pub fn dependencies(&self) -> &IndexMap<BundleIdentifier, DependencyList> {
		&self.dependencies
	}

	pub fn iter(&self) -> indexmap::map::Iter<'_, BundleIdentifier, DependencyList> {
		self.dependencies.iter()
	}

	pub fn len(&self) -> usize {
		self.dependencies.len()
	}

	pub fn is_empty(&self) -> bool {
		self.dependencies.is_empty()
	}

	/// Builds a new instance from the lists `f` keeps.
	pub fn filter(&self, mut f: impl FnMut(&BundleIdentifier, &DependencyList) -> Option<DependencyList>) -> Self {
		Self {
			dependencies: self.dependencies.iter()
				.filter_map(|(id, list)| f(id, list).map(|l| (id.clone(), l)))
				.collect()
		}
	}

	/// Maps every entry of every list, see [`DependencyList::filter`].
	pub fn filter_entries(&self, mut f: impl FnMut(&BundleIdentifier, &DependencyEntry) -> Option<DependencyEntry>) -> Self {
		self.filter(|id, list| list.filter(|entry| f(id, entry)))
	}
}

impl FromIterator<(BundleIdentifier, DependencyList)> for DependencyInfo {
	fn from_iter<T: IntoIterator<Item = (BundleIdentifier, DependencyList)>>(iter: T) -> Self {
		Self { dependencies: iter.into_iter().collect() }
	}
}

impl<'a> IntoIterator for &'a DependencyInfo {
	type Item = (&'a BundleIdentifier, &'a DependencyList);
	type IntoIter = indexmap::map::Iter<'a, BundleIdentifier, DependencyList>;
	fn into_iter(self) -> Self::IntoIter { self.dependencies.iter() }
}
