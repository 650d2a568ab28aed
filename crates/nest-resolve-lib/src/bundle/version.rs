use serde::*;

/// A numeric, dot separated version number such as `1.0.2`.
///
/// Segments are compared numerically left to right, when one version is a prefix
/// of the other the shorter one is lower.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionNumber {
	segments: Vec<u64>,
}

impl VersionNumber {
	pub fn new(version: &str) -> crate::Result<Self> {
		if version.is_empty() {
			return Err(crate::Error::Parse("empty version number".to_string()));
		}
		let segments = version.split('.')
			.map(|s| {
				if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
					return Err(crate::Error::Parse(format!("invalid version number: `{}`", version)));
				}
				s.parse::<u64>().map_err(|_| crate::Error::Parse(format!("version segment out of range: `{}`", version)))
			})
			.collect::<crate::Result<Vec<_>>>()?;
		Ok(Self { segments })
	}

	pub fn segments(&self) -> &[u64] {
		&self.segments
	}

	/// The first segment, `1` for `1.2.3`.
	pub fn major(&self) -> u64 {
		self.segments[0]
	}
}

impl From<u32> for VersionNumber {
	fn from(major: u32) -> Self {
		Self { segments: vec![major as u64] }
	}
}

impl std::str::FromStr for VersionNumber {
	type Err = crate::Error;
	fn from_str(s: &str) -> Result<Self, Self::Err> { Self::new(s) }
}

impl TryFrom<String> for VersionNumber {
	type Error = crate::Error;
	fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(&value) }
}

impl From<VersionNumber> for String {
	fn from(value: VersionNumber) -> Self { value.to_string() }
}

impl Ord for VersionNumber {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		for (lhs, rhs) in self.segments.iter().zip(other.segments.iter()) {
			match lhs.cmp(rhs) {
				std::cmp::Ordering::Equal => {},
				ord => return ord
			}
		}
		self.segments.len().cmp(&other.segments.len())
	}
}

impl PartialOrd for VersionNumber {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl std::fmt::Display for VersionNumber {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut first = true;
		for s in &self.segments {
			if !first { f.write_str(".")?; }
			write!(f, "{}", s)?;
			first = false;
		}
		Ok(())
	}
}

/// A range of acceptable versions for a dependency.
///
/// Textual forms: `*` (or empty), `1.0`, `>=1.0`, `<=2.0` and `>=1.0 <=2.0`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VersionRange {
	#[default] Any,
	Exact(VersionNumber),
	Min(VersionNumber),
	Max(VersionNumber),
	MinMax(VersionNumber, VersionNumber),
}

impl VersionRange {
	/// When all arguments are `None` will return `Any`
	pub fn new(exact: Option<VersionNumber>, min: Option<VersionNumber>, max: Option<VersionNumber>) -> crate::Result<Self> {
		match (exact, min, max) {
			(None, None, None) => Ok(VersionRange::Any),
			(None, None, Some(max)) => Ok(VersionRange::Max(max)),
			(None, Some(min), None) => Ok(VersionRange::Min(min)),
			(None, Some(min), Some(max)) => if min <= max {
				Ok(VersionRange::MinMax(min, max))
			} else {
				Err(crate::Error::Parse(format!("empty version range: >={} <={}", min, max)))
			},
			(Some(e), None, None) => Ok(VersionRange::Exact(e)),
			_ => Err(crate::Error::Parse("Attempted to create a range with both exact and min or max version constraint".to_string()))
		}
	}

	pub fn parse(s: &str) -> crate::Result<Self> {
		let s = s.trim();
		if s.is_empty() || s == "*" {
			return Ok(VersionRange::Any);
		}

		let mut min = None;
		let mut max = None;
		let mut exact = None;
		for part in s.split_whitespace() {
			if let Some(v) = part.strip_prefix(">=") {
				if min.replace(VersionNumber::new(v)?).is_some() {
					return Err(crate::Error::Parse(format!("duplicate minimum in version range `{}`", s)));
				}
			} else if let Some(v) = part.strip_prefix("<=") {
				if max.replace(VersionNumber::new(v)?).is_some() {
					return Err(crate::Error::Parse(format!("duplicate maximum in version range `{}`", s)));
				}
			} else if exact.replace(VersionNumber::new(part.strip_prefix('=').unwrap_or(part))?).is_some() {
				return Err(crate::Error::Parse(format!("duplicate version in version range `{}`", s)));
			}
		}
		Self::new(exact, min, max)
	}

	pub fn includes(&self, version: &VersionNumber) -> bool {
		match self {
			VersionRange::Any => true,
			VersionRange::Exact(v) => version == v,
			VersionRange::Min(min) => version >= min,
			VersionRange::Max(max) => version <= max,
			VersionRange::MinMax(min, max) => min <= version && version <= max,
		}
	}

	/// Gets the intersection between the ranges, if no intersection exists returns `None`
	pub fn intersection(&self, other: &Self) -> Option<Self> {
		use VersionRange::*;

		match (self.clone(), other.clone()) {
			(Any, r) => Some(r),
			(l, Any) => Some(l),

			(Exact(a), b) => if b.includes(&a) { Some(Exact(a)) } else { None },
			(a, Exact(b)) => if a.includes(&b) { Some(Exact(b)) } else { None },

			(Min(a), Min(b)) => Some(Min(std::cmp::max(a, b))),
			(Max(a), Max(b)) => Some(Max(std::cmp::min(a, b))),

			(Min(a), Max(b)) | (Max(b), Min(a)) => bounded(a, b),
			(Min(a), MinMax(b, c)) | (MinMax(b, c), Min(a)) => bounded(std::cmp::max(a, b), c),
			(Max(a), MinMax(b, c)) | (MinMax(b, c), Max(a)) => bounded(b, std::cmp::min(a, c)),
			(MinMax(a, b), MinMax(c, d)) => bounded(std::cmp::max(a, c), std::cmp::min(b, d)),
		}
	}
}

fn bounded(min: VersionNumber, max: VersionNumber) -> Option<VersionRange> {
	match min.cmp(&max) {
		std::cmp::Ordering::Less => Some(VersionRange::MinMax(min, max)),
		std::cmp::Ordering::Equal => Some(VersionRange::Exact(min)),
		std::cmp::Ordering::Greater => None,
	}
}

impl std::str::FromStr for VersionRange {
	type Err = crate::Error;
	fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl TryFrom<String> for VersionRange {
	type Error = crate::Error;
	fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(&value) }
}

impl From<VersionRange> for String {
	fn from(value: VersionRange) -> Self { value.to_string() }
}

impl std::fmt::Display for VersionRange {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			VersionRange::Any => write!(f, "*"),
			VersionRange::Exact(v) => write!(f, "{}", v),
			VersionRange::Min(v) => write!(f, ">={}", v),
			VersionRange::Max(v) => write!(f, "<={}", v),
			VersionRange::MinMax(min, max) => write!(f, ">={} <={}", min, max),
		}
	}
}
