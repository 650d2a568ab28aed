use std::collections::HashMap;

use indexmap::IndexMap;

use super::*;
use crate::constraint::ConstraintConfiguration;
use crate::filter::DependencyFilter;
use crate::resolver::{DependencyResolver, ResolutionOutput, ResolutionRequest};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
	request: ResolutionRequest,
	filter: DependencyFilter,
	constraints: ConstraintConfiguration,
	domain_resolution: bool,
}

#[derive(Debug, Clone)]
struct CacheEntry {
	output: ResolutionOutput,
	dependencies: IndexMap<TrackedProperty, TrackedValue>,
}

/// Reuses the output of a previous resolution while nothing it observed has changed.
///
/// Entries are keyed by the request together with the filter and constraints of the resolver,
/// failed resolutions are not kept.
#[derive(Debug, Default)]
pub struct ResolutionCache {
	entries: HashMap<CacheKey, CacheEntry>,
	hits: usize,
	misses: usize,
}

impl ResolutionCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn resolve(&mut self, resolver: &DependencyResolver, request: &ResolutionRequest) -> crate::Result<ResolutionOutput> {
		let key = CacheKey {
			request: request.clone(),
			filter: resolver.filter().clone(),
			constraints: resolver.constraints().clone(),
			domain_resolution: resolver.uses_domain_resolution(),
		};

		if let Some(entry) = self.entries.get(&key) {
			let changed = entry.dependencies.iter()
				.find(|(property, value)| !value.is_unchanged(&property.current_value(resolver.storage())));
			match changed {
				None => {
					log::debug!("Reusing resolution of {} bundle(s), {} dependencies unchanged", entry.output.len(), entry.dependencies.len());
					self.hits += 1;
					return Ok(entry.output.clone());
				},
				Some((property, _)) => log::debug!("Resolution outdated, {} changed", property),
			}
		}

		self.misses += 1;
		self.entries.remove(&key);
		let mut tracker = RecordingTracker::new();
		let output = resolver.resolve(request, &mut tracker)?;
		self.entries.insert(key, CacheEntry {
			output: output.clone(),
			dependencies: tracker.into_properties(),
		});
		Ok(output)
	}

	/// Number of resolutions answered from the cache.
	pub fn hits(&self) -> usize {
		self.hits
	}

	/// Number of resolutions that had to run.
	pub fn misses(&self) -> usize {
		self.misses
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}
}
