//! Filters that decide which dependencies of a dependency are carried over to its dependents.
//!
//! The dependencies declared by the root are never dropped here, only the ones found
//! while expanding an actual bundle.

use std::collections::BTreeSet;

use crate::bundle::{BundleKey, DependencyInfo};

pub(super) fn compile(kinds: &BTreeSet<String>, compile_transitive: bool, owner: Option<&BundleKey>, info: &DependencyInfo) -> DependencyInfo {
	let info = super::kind::narrow(kinds, info);
	if owner.is_none() {
		return info;
	}
	info.filter_entries(|_, entry| {
		if entry.is_private() || (!compile_transitive && entry.is_compile_non_transitive()) {
			None
		} else {
			Some(entry.clone())
		}
	})
}

pub(super) fn classpath(kinds: &BTreeSet<String>, owner: Option<&BundleKey>, info: &DependencyInfo) -> DependencyInfo {
	let info = super::kind::narrow(kinds, info);
	if owner.is_none() {
		return info;
	}
	info.filter_entries(|_, entry| {
		if entry.is_compile_non_transitive() {
			None
		} else {
			Some(entry.clone())
		}
	})
}
