//! Library error type.

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

use crate::bundle::BundleIdentifier;

#[derive(Debug, Error)]
pub enum Error {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("bincode error: {0}")]
	Bincode(#[from] bincode::Error),
	#[error("parsing error: {0}")]
	Parse(String),
	#[error("invalid argument: {0}")]
	InvalidArgument(String),
	#[error("bundles or dependency file missing from the resolution request")]
	MissingInput,
	#[error("dependency file not found: {}", .0.display())]
	DependencyFileNotFound(std::path::PathBuf),
	#[error("self bundle dependency declaration found: {0}")]
	SelfDependency(BundleIdentifier),
	#[error(transparent)]
	Unsatisfied(#[from] UnsatisfiedError),
}

/// A candidate bundle whose information could not be loaded.
///
/// These never abort a resolution on their own, they are collected and
/// attached to [`UnsatisfiedError`] if no assignment is found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load bundle `{bundle}`: {reason}")]
pub struct LoadError {
	pub bundle: BundleIdentifier,
	pub reason: String,
}

impl LoadError {
	pub fn new(bundle: BundleIdentifier, reason: impl Into<String>) -> Self {
		Self { bundle, reason: reason.into() }
	}
}

/// The solver exhausted every candidate without finding a satisfying assignment.
#[derive(Debug, Error)]
#[error("failed to satisfy dependencies{}", suppressed_summary(.suppressed))]
pub struct UnsatisfiedError {
	suppressed: Vec<LoadError>,
}

impl UnsatisfiedError {
	pub fn new(suppressed: Vec<LoadError>) -> Self {
		Self { suppressed }
	}

	/// Candidate failures encountered during the search.
	pub fn suppressed(&self) -> &[LoadError] {
		&self.suppressed
	}
}

fn suppressed_summary(suppressed: &[LoadError]) -> String {
	if suppressed.is_empty() {
		String::new()
	} else {
		format!(" ({} candidate(s) failed to load)", suppressed.len())
	}
}
