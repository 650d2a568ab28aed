//! Reading dependency files.
//!
//! A dependency file declares the dependencies of the bundle being built, its targets
//! are bundle identifiers without version. The `this` name refers to the bundle itself
//! so `this-api` names the `api` qualified variant of the bundle being built.

use indexmap::IndexMap;
use serde::*;

use crate::bundle::{BundleIdentifier, DependencyEntry, DependencyInfo, DependencyList};

/// Name standing for the bundle a dependency file belongs to.
pub const SELF_BUNDLE_NAME: &str = "this";

pub trait ManifestReader: std::fmt::Debug + Send + Sync {
	/// Parses the dependency file contents.
	///
	/// `self_bundle` is the bundle the file belongs to, if known.
	fn parse(&self, bytes: &[u8], self_bundle: Option<&BundleIdentifier>) -> crate::Result<DependencyInfo>;
}

/// Reads dependency files of the form
/// ```json
/// {
///   "dependencies": {
///     "dep.bundle": [{ "kinds": ["classpath"], "range": ">=1.0", "private": false, "metadata": {} }]
///   }
/// }
/// ```
/// Declaration order is kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonManifestReader;

#[derive(Debug, Deserialize)]
struct ManifestDocument {
	#[serde(default)]
	dependencies: IndexMap<String, Vec<DependencyEntry>>,
}

fn resolve_target(key: &str, self_bundle: Option<&BundleIdentifier>) -> crate::Result<BundleIdentifier> {
	let target = BundleIdentifier::parse(key)?;
	if target.version_qualifier().is_some() {
		return Err(crate::Error::Parse(format!("dependency on `{}` declares a version qualifier, use a range instead", key)));
	}
	if target.name() != SELF_BUNDLE_NAME {
		return Ok(target);
	}
	match self_bundle {
		Some(self_bundle) => Ok(BundleIdentifier::from_parts(self_bundle.name().to_string(), target.qualifiers().clone(), None)),
		None => Err(crate::Error::Parse(format!("`{}` used in dependency file without a self bundle", key))),
	}
}

impl ManifestReader for JsonManifestReader {
	fn parse(&self, bytes: &[u8], self_bundle: Option<&BundleIdentifier>) -> crate::Result<DependencyInfo> {
		let document: ManifestDocument = serde_json::from_slice(bytes)?;

		let mut dependencies = IndexMap::<BundleIdentifier, Vec<DependencyEntry>>::new();
		for (key, entries) in document.dependencies {
			let target = resolve_target(&key, self_bundle)?;
			if let Some(entry) = entries.iter().find(|e| e.kinds().is_empty()) {
				return Err(crate::Error::Parse(format!("dependency on `{}` declared without kinds: {:?}", key, entry)));
			}
			/* Keys differing only in case name the same bundle */
			dependencies.entry(target).or_default().extend(entries);
		}

		Ok(dependencies.into_iter()
			.filter(|(_, entries)| !entries.is_empty())
			.map(|(id, entries)| (id, DependencyList::new(entries)))
			.collect())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::bundle::VersionRange;

	fn id(s: &str) -> BundleIdentifier { BundleIdentifier::parse(s).unwrap() }
	fn parse(json: &str, self_bundle: Option<&str>) -> crate::Result<DependencyInfo> {
		JsonManifestReader.parse(json.as_bytes(), self_bundle.map(id).as_ref())
	}

	#[test] fn empty_document() { assert!(parse("{}", None).unwrap().is_empty()) }
	#[test] fn invalid_json() { assert!(matches!(parse("{", None), Err(crate::Error::SerdeJSON(_)))) }
	#[test] fn missing_kinds() { assert!(parse(r#"{"dependencies": {"a": [{"range": "*"}]}}"#, None).is_err()) }
	#[test] fn empty_kinds() { assert!(parse(r#"{"dependencies": {"a": [{"kinds": []}]}}"#, None).is_err()) }
	#[test] fn versioned_target() { assert!(parse(r#"{"dependencies": {"a-v1": [{"kinds": ["classpath"]}]}}"#, None).is_err()) }
	#[test] fn this_without_self_bundle() { assert!(parse(r#"{"dependencies": {"this": [{"kinds": ["classpath"]}]}}"#, None).is_err()) }

	#[test]
	fn entries_keep_document_order() {
		let info = parse(r#"{"dependencies": {
			"z.bundle": [{"kinds": ["classpath"], "range": ">=1.0"}],
			"a.bundle": [{"kinds": ["classpath", "runtime"], "private": true, "metadata": {"compile-transitive": "false"}}]
		}}"#, None).unwrap();

		assert_eq!(info.iter().map(|(id, _)| id.to_string()).collect::<Vec<_>>(), vec!["z.bundle", "a.bundle"]);
		let a = &info.dependency_list(&id("a.bundle")).unwrap().entries()[0];
		assert!(a.is_private());
		assert!(a.is_compile_non_transitive());
		assert_eq!(info.dependency_list(&id("z.bundle")).unwrap().entries()[0].range(), &VersionRange::parse(">=1.0").unwrap());
	}

	#[test]
	fn this_is_replaced_by_self_name() {
		let info = parse(r#"{"dependencies": {"this-api": [{"kinds": ["classpath"]}]}}"#, Some("my.bundle-impl-v2")).unwrap();
		assert!(info.dependency_list(&id("my.bundle-api")).is_some());
	}

	#[test]
	fn keys_differing_in_case_are_merged() {
		let info = parse(r#"{"dependencies": {"a": [{"kinds": ["x"]}], "A": [{"kinds": ["y"]}]}}"#, None).unwrap();
		assert_eq!(info.len(), 1);
		assert_eq!(info.dependency_list(&id("a")).unwrap().entries().len(), 2);
	}
}
