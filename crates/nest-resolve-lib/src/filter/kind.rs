use std::collections::BTreeSet;

use crate::bundle::DependencyInfo;

/// Keeps the entries sharing a kind with `kinds`, narrowing their kinds to the shared ones.
pub(super) fn narrow(kinds: &BTreeSet<String>, info: &DependencyInfo) -> DependencyInfo {
	info.filter_entries(|_, entry| {
		let common: BTreeSet<String> = kinds.iter()
			.filter(|k| entry.kinds().contains(k.as_str()))
			.cloned()
			.collect();
		entry.with_kinds(common)
	})
}
