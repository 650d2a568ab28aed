//! Strategies for selecting which declared dependencies take part in a resolution.
//!
//! A filter receives the dependencies of an owner bundle and returns what's left of them.
//! The owner is `None` for the dependencies requested by the caller directly.
//! Filters are pure values, two equal filters always filter the same way
//! which lets resolution results be reused for equal filters.

use std::collections::BTreeSet;

use serde::*;

use crate::bundle::{BundleKey, DependencyInfo};
use crate::constraint::{self, ConstraintConfiguration};

mod kind;
mod transitive;

/// Dependency kinds compile filters select when none are given.
pub const DEFAULT_COMPILE_KINDS: &[&str] = &["classpath"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DependencyFilter {
	/// Leaves the dependencies unchanged.
	Identity,
	/// Removes every dependency.
	None,
	/// Applies each filter to the output of the previous, stopping if one rejects the owner.
	Chain { filters: Vec<DependencyFilter> },
	/// Keeps the entries declared with any of `kinds`, narrowing their kinds to those.
	Kind { kinds: BTreeSet<String> },
	/// [`DependencyFilter::Kind`], then drops private entries of bundles.
	/// If not `compile_transitive` also drops entries of bundles marked `compile-transitive: false`.
	Compile { kinds: BTreeSet<String>, compile_transitive: bool },
	/// [`DependencyFilter::Kind`], then drops entries of bundles marked `compile-transitive: false`.
	Classpath { kinds: BTreeSet<String> },
	/// Drops entries whose environment requirements the constraints don't satisfy.
	Constraint { constraints: ConstraintConfiguration },
}

fn kind_set<S: Into<String>>(kinds: impl IntoIterator<Item = S>) -> BTreeSet<String> {
	kinds.into_iter().map(Into::into).collect()
}

impl DependencyFilter {
	pub fn identity() -> Self {
		Self::Identity
	}

	pub fn none() -> Self {
		Self::None
	}

	/// An empty chain is [`DependencyFilter::Identity`] and a single filter is returned as is.
	pub fn chain(filters: impl IntoIterator<Item = DependencyFilter>) -> Self {
		let mut filters: Vec<_> = filters.into_iter().collect();
		match filters.len() {
			0 => Self::Identity,
			1 => filters.remove(0),
			_ => Self::Chain { filters },
		}
	}

	/// Like [`DependencyFilter::chain`] but for filters assembled from optional parts.
	///
	/// Fails if any of them is missing.
	pub fn try_chain(filters: impl IntoIterator<Item = Option<DependencyFilter>>) -> crate::Result<Self> {
		let filters = filters.into_iter()
			.enumerate()
			.map(|(i, f)| f.ok_or_else(|| crate::Error::InvalidArgument(format!("missing filter at chain index {}", i))))
			.collect::<crate::Result<Vec<_>>>()?;
		Ok(Self::chain(filters))
	}

	/// An empty set of kinds gives [`DependencyFilter::None`].
	pub fn kind<S: Into<String>>(kinds: impl IntoIterator<Item = S>) -> Self {
		let kinds = kind_set(kinds);
		if kinds.is_empty() {
			Self::None
		} else {
			Self::Kind { kinds }
		}
	}

	pub fn compile<S: Into<String>>(kinds: impl IntoIterator<Item = S>, compile_transitive: bool) -> Self {
		let kinds = kind_set(kinds);
		if kinds.is_empty() {
			Self::None
		} else {
			Self::Compile { kinds, compile_transitive }
		}
	}

	pub fn compile_transitive<S: Into<String>>(kinds: impl IntoIterator<Item = S>) -> Self {
		Self::compile(kinds, true)
	}

	pub fn compile_non_transitive<S: Into<String>>(kinds: impl IntoIterator<Item = S>) -> Self {
		Self::compile(kinds, false)
	}

	/// Transitive classpath dependencies are exactly the ones of the given kinds.
	pub fn classpath_transitive<S: Into<String>>(kinds: impl IntoIterator<Item = S>) -> Self {
		Self::kind(kinds)
	}

	pub fn classpath_non_transitive<S: Into<String>>(kinds: impl IntoIterator<Item = S>) -> Self {
		let kinds = kind_set(kinds);
		if kinds.is_empty() {
			Self::None
		} else {
			Self::Classpath { kinds }
		}
	}

	pub fn constraint(constraints: ConstraintConfiguration) -> Self {
		Self::Constraint { constraints }
	}

	/// Filters the dependencies declared by `owner`, `None` for the root request.
	///
	/// Returns `None` if the dependencies of the owner are rejected as a whole.
	pub fn filter_bundle_dependency(&self, owner: Option<&BundleKey>, info: DependencyInfo) -> Option<DependencyInfo> {
		match self {
			Self::Identity => Some(info),
			Self::None => Some(DependencyInfo::default()),
			Self::Chain { filters } => {
				let mut info = info;
				for filter in filters {
					info = filter.filter_bundle_dependency(owner, info)?;
				}
				Some(info)
			},
			Self::Kind { kinds } => Some(kind::narrow(kinds, &info)),
			Self::Compile { kinds, compile_transitive } => Some(transitive::compile(kinds, *compile_transitive, owner, &info)),
			Self::Classpath { kinds } => Some(transitive::classpath(kinds, owner, &info)),
			Self::Constraint { constraints } => Some(info.filter_entries(|_, entry| {
				if constraint::dependency_excludes(constraints, entry) {
					None
				} else {
					Some(entry.clone())
				}
			})),
		}
	}
}

impl Default for DependencyFilter {
	fn default() -> Self {
		Self::Identity
	}
}

impl std::fmt::Display for DependencyFilter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		fn kinds(kinds: &BTreeSet<String>) -> String {
			kinds.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
		}

		match self {
			Self::Identity => write!(f, "identity"),
			Self::None => write!(f, "none"),
			Self::Chain { filters } => {
				write!(f, "chain[")?;
				for (i, filter) in filters.iter().enumerate() {
					if i > 0 { write!(f, ", ")?; }
					write!(f, "{}", filter)?;
				}
				write!(f, "]")
			},
			Self::Kind { kinds: k } => write!(f, "kind[{}]", kinds(k)),
			Self::Compile { kinds: k, compile_transitive: true } => write!(f, "compile[{}]", kinds(k)),
			Self::Compile { kinds: k, compile_transitive: false } => write!(f, "compile-non-transitive[{}]", kinds(k)),
			Self::Classpath { kinds: k } => write!(f, "classpath-non-transitive[{}]", kinds(k)),
			Self::Constraint { constraints } => write!(f, "constraint{}", constraints),
		}
	}
}

/// Applies the constraint filter, then `filter`.
pub fn filter_with_constraints(owner: Option<&BundleKey>, constraints: &ConstraintConfiguration, filter: &DependencyFilter, info: DependencyInfo) -> Option<DependencyInfo> {
	let info = DependencyFilter::constraint(constraints.clone()).filter_bundle_dependency(owner, info)?;
	filter.filter_bundle_dependency(owner, info)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::bundle::*;
	use crate::registry::StorageKey;

	fn id(s: &str) -> BundleIdentifier { BundleIdentifier::parse(s).unwrap() }

	fn entry(kinds: &[&str]) -> DependencyEntry {
		DependencyEntry::new(kinds.iter().copied(), VersionRange::Any).unwrap()
	}

	fn info(entries: Vec<(&str, DependencyEntry)>) -> DependencyInfo {
		entries.into_iter().map(|(name, e)| (id(name), DependencyList::single(e))).collect()
	}

	fn owner() -> BundleKey {
		BundleKey::new(Some(StorageKey("local".to_string())), id("owner.bundle-v1"))
	}

	fn sample() -> DependencyInfo {
		info(vec![
			("a", entry(&["classpath"])),
			("b", entry(&["classpath", "runtime"])),
			("c", entry(&["test"])),
		])
	}

	#[test] fn identity_is_neutral() { assert_eq!(DependencyFilter::chain([DependencyFilter::identity()]).filter_bundle_dependency(None, sample()), Some(sample())) }
	#[test] fn none_yields_empty() { assert_eq!(DependencyFilter::none().filter_bundle_dependency(Some(&owner()), sample()), Some(DependencyInfo::default())) }
	#[test] fn chain_empty_is_identity() { assert_eq!(DependencyFilter::chain(Vec::new()), DependencyFilter::Identity) }
	#[test] fn chain_single_is_unwrapped() { assert_eq!(DependencyFilter::chain([DependencyFilter::kind(["a"])]), DependencyFilter::kind(["a"])) }
	#[test] fn try_chain_rejects_missing() { assert!(DependencyFilter::try_chain([Some(DependencyFilter::identity()), None]).is_err()) }
	#[test] fn kind_empty_is_none() { assert_eq!(DependencyFilter::kind(Vec::<String>::new()), DependencyFilter::None) }

	#[test]
	fn chain_applies_in_order() {
		let f1 = DependencyFilter::kind(["classpath", "test"]);
		let f2 = DependencyFilter::kind(["test", "runtime"]);
		let chained = DependencyFilter::chain([f1.clone(), f2.clone()]).filter_bundle_dependency(None, sample());
		let manual = f1.filter_bundle_dependency(None, sample()).and_then(|i| f2.filter_bundle_dependency(None, i));
		assert_eq!(chained, manual);
		assert_eq!(chained.unwrap().iter().map(|(id, _)| id.to_string()).collect::<Vec<_>>(), vec!["c"]);
	}

	#[test]
	fn none_is_absorbing_in_chain() {
		let chain = DependencyFilter::chain([DependencyFilter::kind(["classpath"]), DependencyFilter::none(), DependencyFilter::identity()]);
		assert_eq!(chain.filter_bundle_dependency(None, sample()), Some(DependencyInfo::default()));
		assert_eq!(chain.filter_bundle_dependency(Some(&owner()), sample()), Some(DependencyInfo::default()));
	}

	#[test]
	fn kind_narrows_to_intersection() {
		let input = info(vec![("x", entry(&["a", "b", "c"]))]);
		let out = DependencyFilter::kind(["b", "c", "d"]).filter_bundle_dependency(None, input.clone()).unwrap();
		let kinds: Vec<_> = out.dependency_list(&id("x")).unwrap().entries()[0].kinds().iter().cloned().collect();
		assert_eq!(kinds, vec!["b", "c"]);
		assert!(DependencyFilter::kind(["x"]).filter_bundle_dependency(None, input).unwrap().is_empty());
	}

	#[test]
	fn kind_keeps_other_entries_of_same_target() {
		let input: DependencyInfo = vec![(id("x"), DependencyList::new(vec![entry(&["test"]), entry(&["classpath"])]))].into_iter().collect();
		let out = DependencyFilter::kind(["classpath"]).filter_bundle_dependency(None, input).unwrap();
		assert_eq!(out.dependency_list(&id("x")).unwrap().entries().len(), 1);
	}

	fn transitivity_sample() -> DependencyInfo {
		info(vec![
			("public", entry(&["classpath"])),
			("private", entry(&["classpath"]).with_private(true)),
			("legacy.private", entry(&["classpath"]).with_metadata("private", "True")),
			("non.transitive", entry(&["classpath"]).with_metadata("compile-transitive", "FALSE")),
		])
	}

	fn names(info: Option<DependencyInfo>) -> Vec<String> {
		info.unwrap().iter().map(|(id, _)| id.to_string()).collect()
	}

	#[test]
	fn compile_keeps_everything_for_root() {
		assert_eq!(names(DependencyFilter::compile_non_transitive(DEFAULT_COMPILE_KINDS.iter().copied()).filter_bundle_dependency(None, transitivity_sample())).len(), 4);
	}

	#[test]
	fn compile_transitive_drops_private() {
		let out = DependencyFilter::compile_transitive(["classpath"]).filter_bundle_dependency(Some(&owner()), transitivity_sample());
		assert_eq!(names(out), vec!["public", "non.transitive"]);
	}

	#[test]
	fn compile_non_transitive_drops_marked() {
		let out = DependencyFilter::compile_non_transitive(["classpath"]).filter_bundle_dependency(Some(&owner()), transitivity_sample());
		assert_eq!(names(out), vec!["public"]);
	}

	#[test]
	fn classpath_ignores_private() {
		let out = DependencyFilter::classpath_non_transitive(["classpath"]).filter_bundle_dependency(Some(&owner()), transitivity_sample());
		assert_eq!(names(out), vec!["public", "private", "legacy.private"]);
	}

	#[test] fn classpath_transitive_is_kind() { assert_eq!(DependencyFilter::classpath_transitive(["classpath"]), DependencyFilter::kind(["classpath"])) }

	#[test]
	fn constraint_applies_to_root() {
		let input = info(vec![
			("any", entry(&["classpath"])),
			("new.jre", entry(&["classpath"]).with_metadata("jre-version", ">=11")),
		]);
		let f = DependencyFilter::constraint(ConstraintConfiguration::default().with_jre_major_version(Some(8)));
		assert_eq!(names(f.filter_bundle_dependency(None, input)), vec!["any"]);
	}

	#[test]
	fn constraints_are_applied_before_filter() {
		let input = info(vec![("new.jre", entry(&["classpath"]).with_metadata("jre-version", "11"))]);
		let c = ConstraintConfiguration::default().with_jre_major_version(Some(8));
		assert!(filter_with_constraints(None, &c, &DependencyFilter::identity(), input.clone()).unwrap().is_empty());
		assert_eq!(filter_with_constraints(Some(&owner()), &Default::default(), &DependencyFilter::identity(), input.clone()), Some(input));
	}

	#[test]
	fn display() {
		let f = DependencyFilter::chain([DependencyFilter::kind(["classpath"]), DependencyFilter::none()]);
		assert_eq!(f.to_string(), "chain[kind[classpath], none]");
	}

	#[test]
	fn serialized_filter_is_equal() {
		let f = DependencyFilter::chain([DependencyFilter::compile_non_transitive(["classpath", "api"]), DependencyFilter::identity()]);
		let json = serde_json::to_string(&f).unwrap();
		assert_eq!(serde_json::from_str::<DependencyFilter>(&json).unwrap(), f);
	}
}
