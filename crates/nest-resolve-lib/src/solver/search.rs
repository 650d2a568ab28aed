//! First fit backtracking search shared by every solver.
//!
//! Requirements are handled in the order they are discovered, the dependencies of a
//! selected bundle are appended to the end of the queue. When a requirement can't be
//! met the most recent selection that still has untried candidates is revisited.
//!
//! Selections are scoped by the lookup a requirement is resolved through, the same
//! bundle name can be selected once per lookup.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::DependencyLookup;
use crate::bundle::{BundleIdentifier, BundleKey, DependencyInfo, VersionRange};
use crate::registry::{LookupContext, LookupKey};

/// Lookup a requirement is resolved through and the target without version.
type Scope = (LookupKey, BundleIdentifier);

#[derive(Debug, Clone)]
struct Requirement {
	owner: BundleKey,
	/// Context of the owner, `None` for the root.
	context: Option<LookupContext>,
	target: BundleIdentifier,
	range: VersionRange,
	scope: Scope,
}

/// A requirement with candidates left to try and the state to restore before trying the next one.
struct ChoicePoint {
	cursor: usize,
	requirement: Requirement,
	candidates: std::vec::IntoIter<(BundleKey, LookupContext)>,
	requirements_len: usize,
	edges_len: usize,
}

/// A satisfied requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Edge {
	pub owner: BundleKey,
	pub declared: BundleIdentifier,
	pub target: BundleKey,
}

pub(super) struct Search<'l> {
	lookup: &'l mut dyn DependencyLookup,
	root_scope: LookupKey,
	dependencies: HashMap<BundleKey, Option<DependencyInfo>>,
	requirements: Vec<Requirement>,
	assigned: IndexMap<Scope, BundleKey>,
	edges: Vec<Edge>,
}

fn satisfies(key: &BundleKey, range: &VersionRange) -> bool {
	if *range == VersionRange::Any {
		return true;
	}
	match key.bundle_identifier().version_number() {
		Ok(Some(version)) => range.includes(&version),
		_ => false,
	}
}

impl<'l> Search<'l> {
	pub(super) fn new(lookup: &'l mut dyn DependencyLookup) -> Self {
		Self {
			root_scope: lookup.root_lookup_key(),
			lookup,
			dependencies: Default::default(),
			requirements: Default::default(),
			assigned: Default::default(),
			edges: Default::default(),
		}
	}

	/// Runs the search, returns the satisfied requirements in the order they were handled.
	pub(super) fn run(mut self, root: &BundleKey, root_dependencies: &DependencyInfo) -> Option<Vec<Edge>> {
		if !self.enqueue(root, None, root_dependencies) {
			log::debug!("Conflicting version ranges declared by the root");
			return None;
		}
		if self.search() {
			Some(self.edges)
		} else {
			None
		}
	}

	/// Appends the requirements declared in `dependencies`.
	///
	/// Returns `false` if a target is declared with ranges that have no common version.
	fn enqueue(&mut self, owner: &BundleKey, context: Option<&LookupContext>, dependencies: &DependencyInfo) -> bool {
		let lookup = match context {
			Some(context) => context.relative_lookup.lookup_key().clone(),
			None => self.root_scope.clone(),
		};
		for (target, list) in dependencies {
			let Some(range) = list.combined_range() else {
				log::trace!("`{}` declares conflicting ranges for `{}`", owner, target);
				return false;
			};
			let target = target.without_version();
			self.requirements.push(Requirement {
				owner: owner.clone(),
				context: context.cloned(),
				scope: (lookup.clone(), target.clone()),
				target,
				range,
			});
		}
		true
	}

	fn dependencies_of(&mut self, key: &BundleKey, context: &LookupContext) -> Option<DependencyInfo> {
		if let Some(cached) = self.dependencies.get(key) {
			return cached.clone();
		}
		let info = self.lookup.dependency_information(key, context);
		self.dependencies.insert(key.clone(), info.clone());
		info
	}

	fn search(&mut self) -> bool {
		let mut choices = Vec::<ChoicePoint>::new();
		let mut cursor = 0;
		loop {
			let Some(req) = self.requirements.get(cursor).cloned() else {
				return true;
			};

			match self.assigned.get(&req.scope).cloned() {
				Some(selected) if satisfies(&selected, &req.range) => {
					self.edges.push(Edge { owner: req.owner, declared: req.target, target: selected });
					cursor += 1;
					continue;
				},
				Some(selected) => {
					log::trace!("`{}` requires `{}` {} but `{}` is already selected", req.owner, req.target, req.range, selected);
				},
				None => match self.lookup.lookup_versions(&req.target, req.context.as_ref()) {
					Some(candidates) => choices.push(ChoicePoint {
						cursor,
						requirement: req,
						candidates: candidates.into_iter(),
						requirements_len: self.requirements.len(),
						edges_len: self.edges.len(),
					}),
					None => log::trace!("No versions of `{}` found for `{}`", req.target, req.owner),
				},
			}

			match self.next_candidate(&mut choices) {
				Some(next) => cursor = next,
				None => return false,
			}
		}
	}

	/// Selects the next usable candidate of the most recent choice point, discarding exhausted ones.
	///
	/// Returns the cursor to continue from, `None` once every choice point is exhausted.
	fn next_candidate(&mut self, choices: &mut Vec<ChoicePoint>) -> Option<usize> {
		while let Some(choice) = choices.last_mut() {
			self.requirements.truncate(choice.requirements_len);
			self.edges.truncate(choice.edges_len);
			if let Some(previous) = self.assigned.shift_remove(&choice.requirement.scope) {
				log::trace!("Backtracking from `{}`", previous);
			}

			while let Some((candidate, context)) = choice.candidates.next() {
				let req = &choice.requirement;
				if !satisfies(&candidate, &req.range) {
					continue;
				}
				let Some(dependencies) = self.dependencies_of(&candidate, &context) else {
					continue;
				};

				self.assigned.insert(req.scope.clone(), candidate.clone());
				self.edges.push(Edge { owner: req.owner.clone(), declared: req.target.clone(), target: candidate.clone() });
				log::trace!("Selected `{}` for `{}`", candidate, req.target);

				if self.enqueue(&candidate, Some(&context), &dependencies) {
					return Some(choice.cursor + 1);
				}
				self.requirements.truncate(choice.requirements_len);
				self.edges.truncate(choice.edges_len);
				self.assigned.shift_remove(&req.scope);
			}
			choices.pop();
		}
		None
	}
}
