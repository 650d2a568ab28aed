use std::collections::HashSet;
use std::sync::Arc;

use crate::bundle::{BundleIdentifier, BundleKey, DependencyInfo};
use crate::constraint::{self, ConstraintConfiguration};
use crate::error::LoadError;
use crate::filter::{self, DependencyFilter};
use crate::registry::{BundleLookup, LookupContext, LookupKey};
use crate::solver::DependencyLookup;
use crate::tracking::{DependencyTracker, TrackedProperty, TrackedValue};

/// Answers the solver for a single resolution, reporting everything it reads to the tracker.
pub(super) struct ResolutionCallbacks<'r> {
	root_lookup: Arc<dyn BundleLookup>,
	filter: &'r DependencyFilter,
	constraints: &'r ConstraintConfiguration,
	tracker: &'r mut dyn DependencyTracker,
	root_reported: bool,
	reported: HashSet<TrackedProperty>,
	suppressed: Vec<LoadError>,
}

impl<'r> ResolutionCallbacks<'r> {
	pub(super) fn new(root_lookup: Arc<dyn BundleLookup>, filter: &'r DependencyFilter, constraints: &'r ConstraintConfiguration, tracker: &'r mut dyn DependencyTracker) -> Self {
		Self {
			root_lookup,
			filter,
			constraints,
			tracker,
			root_reported: false,
			reported: Default::default(),
			suppressed: Default::default(),
		}
	}

	/// Candidates that failed to load so far.
	pub(super) fn into_suppressed(self) -> Vec<LoadError> {
		self.suppressed
	}

	fn report(&mut self, property: TrackedProperty, value: TrackedValue) {
		if self.reported.insert(property.clone()) {
			self.tracker.record(property, value);
		}
	}
}

impl<'r> DependencyLookup for ResolutionCallbacks<'r> {
	fn root_lookup_key(&self) -> LookupKey {
		self.root_lookup.lookup_key().clone()
	}

	fn lookup_versions(&mut self, bundle: &BundleIdentifier, context: Option<&LookupContext>) -> Option<Vec<(BundleKey, LookupContext)>> {
		let lookup = match context {
			Some(context) => context.relative_lookup.clone(),
			None => {
				if !self.root_reported {
					self.root_reported = true;
					let value = TrackedValue::of_lookup_key(self.root_lookup.lookup_key());
					self.tracker.record(TrackedProperty::RootLookupKey, value);
				}
				self.root_lookup.clone()
			},
		};

		let bundle = bundle.without_version();
		let result = lookup.lookup_bundle_versions(&bundle);
		self.report(
			TrackedProperty::BundleVersions { lookup: lookup.lookup_key().clone(), bundle: bundle.clone() },
			TrackedValue::of_versions(result.as_ref()),
		);

		let Some(result) = result else {
			log::debug!("`{}` not found in lookup `{}`", bundle, lookup.lookup_key());
			return None;
		};
		let context = LookupContext {
			storage_view: result.storage_view.clone(),
			relative_lookup: result.relative_lookup.clone().unwrap_or(lookup),
		};
		let storage = result.storage_view.storage_key().clone();
		Some(result.bundles.into_iter()
			.map(|b| (BundleKey::new(Some(storage.clone()), b), context.clone()))
			.collect())
	}

	fn dependency_information(&mut self, bundle: &BundleKey, context: &LookupContext) -> Option<DependencyInfo> {
		let identifier = bundle.bundle_identifier();
		let result = context.storage_view.bundle_information(identifier);
		self.report(
			TrackedProperty::BundleInformation { storage: context.storage_view.storage_key().clone(), bundle: identifier.clone() },
			TrackedValue::of_information(&result),
		);

		let information = match result {
			Ok(information) => information,
			Err(e) => {
				log::debug!("{}", e);
				self.suppressed.push(e);
				return None;
			}
		};
		if constraint::bundle_excludes(self.constraints, &information) {
			log::debug!("`{}` is not usable with constraints {}", identifier, self.constraints);
			return None;
		}
		filter::filter_with_constraints(Some(bundle), self.constraints, self.filter, information.dependencies)
	}
}
