use std::collections::BTreeSet;
use std::sync::OnceLock;

use serde::*;

use super::VersionNumber;

/// Identifies a bundle by name, qualifiers and an optional version.
///
/// The textual form is `name(-qualifier)*(-vVERSION)?`, for example
/// `simple.bundle-api-v1.0`. Identifiers are case-insensitive and are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BundleIdentifier {
	name: String,
	qualifiers: BTreeSet<String>,
	/// Version qualifier without the leading `v`, kept verbatim.
	version: Option<String>,
}

fn identifier_regex() -> &'static regex::Regex {
	static RE: OnceLock<regex::Regex> = OnceLock::new();
	RE.get_or_init(|| {
		regex::Regex::new(r"^[a-z0-9_]+(\.[a-z0-9_]+)*(-[a-z0-9_.]+)*$").expect("identifier regex should compile")
	})
}

fn is_version_qualifier(q: &str) -> bool {
	let mut chars = q.chars();
	chars.next() == Some('v') && chars.next().map_or(false, |c| c.is_ascii_digit())
}

/// Qualifiers that describe the environment a bundle was built for rather than the bundle itself.
pub fn is_meta_qualifier(q: &str) -> bool {
	q.strip_prefix("jre").map_or(false, |rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

impl BundleIdentifier {
	pub fn parse(s: &str) -> crate::Result<Self> {
		let lower = s.trim().to_ascii_lowercase();
		if !identifier_regex().is_match(&lower) {
			return Err(crate::Error::Parse(format!("invalid bundle identifier: `{}`", s)));
		}

		let mut parts = lower.split('-');
		/* The regex guarantees at least the name is present */
		let name = parts.next().unwrap_or_default().to_string();
		let mut qualifiers = BTreeSet::new();
		let mut version = None;
		for part in parts {
			if is_version_qualifier(part) {
				if version.replace(part[1..].to_string()).is_some() {
					return Err(crate::Error::Parse(format!("multiple version qualifiers in bundle identifier: `{}`", s)));
				}
			} else {
				qualifiers.insert(part.to_string());
			}
		}

		Ok(Self { name, qualifiers, version })
	}

	/// Builds an identifier from already validated parts.
	pub(crate) fn from_parts(name: String, qualifiers: BTreeSet<String>, version: Option<String>) -> Self {
		Self { name, qualifiers, version }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn qualifiers(&self) -> &BTreeSet<String> {
		&self.qualifiers
	}

	/// The raw version qualifier without the `v` prefix.
	pub fn version_qualifier(&self) -> Option<&str> {
		self.version.as_deref()
	}

	/// Parses the version qualifier.
	///
	/// `Ok(None)` if the identifier is not versioned.
	pub fn version_number(&self) -> crate::Result<Option<VersionNumber>> {
		self.version.as_deref().map(VersionNumber::new).transpose()
	}

	pub fn without_version(&self) -> Self {
		Self { name: self.name.clone(), qualifiers: self.qualifiers.clone(), version: None }
	}

	/// Strips the version and every meta qualifier, leaving what identifies the bundle itself.
	pub fn without_meta_qualifiers(&self) -> Self {
		Self {
			name: self.name.clone(),
			qualifiers: self.qualifiers.iter().filter(|q| !is_meta_qualifier(q)).cloned().collect(),
			version: None,
		}
	}

	pub fn with_version(&self, version: &VersionNumber) -> Self {
		Self { name: self.name.clone(), qualifiers: self.qualifiers.clone(), version: Some(version.to_string()) }
	}
}

impl std::str::FromStr for BundleIdentifier {
	type Err = crate::Error;
	fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl TryFrom<String> for BundleIdentifier {
	type Error = crate::Error;
	fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(&value) }
}

impl From<BundleIdentifier> for String {
	fn from(value: BundleIdentifier) -> Self { value.to_string() }
}

impl std::fmt::Display for BundleIdentifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.name)?;
		for q in &self.qualifiers {
			write!(f, "-{}", q)?;
		}
		if let Some(v) = &self.version {
			write!(f, "-v{}", v)?;
		}
		Ok(())
	}
}
