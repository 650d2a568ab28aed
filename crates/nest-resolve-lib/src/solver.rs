//! Finding a set of bundles that satisfies every version requirement.
//!
//! Solvers know nothing about registries or filters, they only talk to a [`DependencyLookup`]
//! which lists candidate versions and provides the already filtered dependencies of a candidate.
//!
//! Two result shapes exist, [`DomainSolver`] returns the full [`ResolutionDomain`] graph and
//! [`RequirementsSolver`] returns the satisfied declarations in the order they were handled
//! for hosts that predate domain resolution.

use crate::bundle::{BundleIdentifier, BundleKey, DependencyInfo};
use crate::registry::{LookupContext, LookupKey};

mod search;
use search::Search;
pub(crate) use search::Edge;

mod domain;
pub use domain::ResolutionDomain;

/// Callbacks a solver uses to expand the dependency graph.
pub trait DependencyLookup {
	/// Key of the lookup the root dependencies are resolved through.
	fn root_lookup_key(&self) -> LookupKey;

	/// Lists the candidates for `bundle`, preferred first.
	///
	/// `context` is the context of the bundle declaring the dependency, `None` for the root.
	/// Returns `None` if nothing is known about the bundle.
	fn lookup_versions(&mut self, bundle: &BundleIdentifier, context: Option<&LookupContext>) -> Option<Vec<(BundleKey, LookupContext)>>;

	/// The dependencies of a candidate, `None` if the candidate can't be used.
	fn dependency_information(&mut self, bundle: &BundleKey, context: &LookupContext) -> Option<DependencyInfo>;
}

#[derive(Debug, Clone)]
pub enum Resolution {
	Domain(ResolutionDomain),
	/// Declared identifier and the bundle selected for it, in the order they were handled.
	Declarations(Vec<(BundleIdentifier, BundleKey)>),
}

pub trait Solver: std::fmt::Debug + Send + Sync {
	/// Returns `None` if the dependencies can't be satisfied.
	fn solve(&self, root: &BundleKey, root_dependencies: &DependencyInfo, lookup: &mut dyn DependencyLookup) -> Option<Resolution>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DomainSolver;

impl Solver for DomainSolver {
	fn solve(&self, root: &BundleKey, root_dependencies: &DependencyInfo, lookup: &mut dyn DependencyLookup) -> Option<Resolution> {
		let edges = Search::new(lookup).run(root, root_dependencies)?;
		Some(Resolution::Domain(ResolutionDomain::from_edges(root, &edges)))
	}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RequirementsSolver;

impl Solver for RequirementsSolver {
	fn solve(&self, root: &BundleKey, root_dependencies: &DependencyInfo, lookup: &mut dyn DependencyLookup) -> Option<Resolution> {
		let edges = Search::new(lookup).run(root, root_dependencies)?;
		Some(Resolution::Declarations(edges.into_iter().map(|e| (e.declared, e.target)).collect()))
	}
}

#[cfg(test)]
mod test {
	use std::collections::HashMap;
	use std::sync::Arc;

	use super::*;
	use crate::bundle::*;
	use crate::registry::*;

	fn id(s: &str) -> BundleIdentifier { BundleIdentifier::parse(s).unwrap() }

	fn deps(pairs: &[(&str, &str)]) -> DependencyInfo {
		pairs.iter()
			.map(|(name, range)| (id(name), DependencyList::single(DependencyEntry::new(["classpath"], VersionRange::parse(range).unwrap()).unwrap())))
			.collect()
	}

	/// Bundles with their dependencies, versions listed highest first.
	#[derive(Debug)]
	struct Fixture {
		storage: Arc<MemoryStorage>,
		lookup: Arc<MemoryLookup>,
		bundles: HashMap<BundleIdentifier, Option<DependencyInfo>>,
		information_requests: Vec<BundleKey>,
	}

	impl Fixture {
		fn new(bundles: Vec<(&str, Option<DependencyInfo>)>) -> Self {
			let storage = Arc::new(MemoryStorage::new("s"));
			for (b, _) in &bundles {
				storage.insert(BundleInformation::new(id(b))).unwrap();
			}
			Self {
				lookup: Arc::new(MemoryLookup::new("l", vec![storage.clone()])),
				storage,
				bundles: bundles.into_iter().map(|(b, d)| (id(b), d)).collect(),
				information_requests: Vec::new(),
			}
		}
	}

	impl DependencyLookup for Fixture {
		fn root_lookup_key(&self) -> LookupKey {
			self.lookup.lookup_key().clone()
		}

		fn lookup_versions(&mut self, bundle: &BundleIdentifier, _: Option<&LookupContext>) -> Option<Vec<(BundleKey, LookupContext)>> {
			let result = self.lookup.lookup_bundle_versions(bundle)?;
			let context = LookupContext { storage_view: self.storage.clone(), relative_lookup: self.lookup.clone() };
			Some(result.bundles.into_iter().map(|b| (BundleKey::new(Some(StorageKey("s".into())), b), context.clone())).collect())
		}

		fn dependency_information(&mut self, bundle: &BundleKey, _: &LookupContext) -> Option<DependencyInfo> {
			self.information_requests.push(bundle.clone());
			self.bundles.get(bundle.bundle_identifier()).cloned().flatten()
		}
	}

	fn root() -> BundleKey { BundleKey::new(None, id("root.test")) }

	fn selected(resolution: Resolution) -> Vec<String> {
		match resolution {
			Resolution::Declarations(d) => d.into_iter().map(|(_, k)| k.to_string()).collect(),
			Resolution::Domain(_) => panic!("expected declarations"),
		}
	}

	#[test]
	fn selects_highest_version() {
		let mut f = Fixture::new(vec![
			("simple.bundle-v1", Some(deps(&[("dep.bundle", "*")]))),
			("dep.bundle-v1", Some(Default::default())),
			("dep.bundle-v2", Some(Default::default())),
		]);
		let r = RequirementsSolver.solve(&root(), &deps(&[("simple.bundle", "*")]), &mut f).unwrap();
		assert_eq!(selected(r), vec!["simple.bundle-v1", "dep.bundle-v2"]);
	}

	#[test]
	fn skips_unusable_candidate() {
		let mut f = Fixture::new(vec![
			("a-v1", Some(Default::default())),
			("a-v2", None),
		]);
		let r = RequirementsSolver.solve(&root(), &deps(&[("a", "*")]), &mut f).unwrap();
		assert_eq!(selected(r), vec!["a-v1"]);
	}

	#[test]
	fn backtracks_on_conflict() {
		/* b-v2 needs c-v2 but a-v2 pins c to 1, so b falls back to v1 */
		let mut f = Fixture::new(vec![
			("a-v2", Some(deps(&[("c", "1")]))),
			("b-v1", Some(deps(&[("c", "<=1")]))),
			("b-v2", Some(deps(&[("c", ">=2")]))),
			("c-v1", Some(Default::default())),
			("c-v2", Some(Default::default())),
		]);
		let r = RequirementsSolver.solve(&root(), &deps(&[("a", "*"), ("b", "*")]), &mut f).unwrap();
		assert_eq!(selected(r), vec!["a-v2", "b-v1", "c-v1", "c-v1"]);
	}

	#[test]
	fn unsatisfiable_is_none() {
		let mut f = Fixture::new(vec![("a-v1", Some(Default::default()))]);
		assert!(DomainSolver.solve(&root(), &deps(&[("a", ">=2")]), &mut f).is_none());
		assert!(DomainSolver.solve(&root(), &deps(&[("missing", "*")]), &mut f).is_none());
	}

	#[test]
	fn dependency_information_is_fetched_once() {
		let mut f = Fixture::new(vec![
			("a-v1", Some(deps(&[("c", "*")]))),
			("b-v1", Some(deps(&[("c", "*")]))),
			("c-v1", Some(Default::default())),
		]);
		DomainSolver.solve(&root(), &deps(&[("a", "*"), ("b", "*")]), &mut f).unwrap();
		assert_eq!(f.information_requests.len(), 3);
	}

	#[test]
	fn domain_keeps_declaration_order() {
		let mut f = Fixture::new(vec![
			("z-v1", Some(deps(&[("y", "*")]))),
			("a-v1", Some(Default::default())),
			("y-v1", Some(Default::default())),
		]);
		let Some(Resolution::Domain(domain)) = DomainSolver.solve(&root(), &deps(&[("z", "*"), ("a", "*")]), &mut f) else {
			panic!("expected domain");
		};
		let direct: Vec<_> = domain.direct_dependencies(domain.root()).into_iter()
			.map(|n| domain.bundle_key(n).unwrap().to_string())
			.collect();
		assert_eq!(direct, vec!["z-v1", "a-v1"]);
	}
	/// Every bundle `bN` has the single version `bN-v1`, dependencies are given by `deps`.
	struct Generated<F: FnMut(usize) -> DependencyInfo> {
		context: LookupContext,
		deps: F,
	}

	impl<F: FnMut(usize) -> DependencyInfo> Generated<F> {
		fn new(deps: F) -> Self {
			let context = LookupContext { storage_view: Arc::new(MemoryStorage::new("s")), relative_lookup: Arc::new(MemoryLookup::new("l", vec![])) };
			Self { context, deps }
		}
	}

	impl<F: FnMut(usize) -> DependencyInfo> DependencyLookup for Generated<F> {
		fn root_lookup_key(&self) -> LookupKey {
			self.context.relative_lookup.lookup_key().clone()
		}

		fn lookup_versions(&mut self, bundle: &BundleIdentifier, _: Option<&LookupContext>) -> Option<Vec<(BundleKey, LookupContext)>> {
			Some(vec![(BundleKey::new(None, id(&format!("{}-v1", bundle))), self.context.clone())])
		}

		fn dependency_information(&mut self, bundle: &BundleKey, _: &LookupContext) -> Option<DependencyInfo> {
			let n = bundle.bundle_identifier().name().strip_prefix('b')?.parse().ok()?;
			Some((self.deps)(n))
		}
	}

	fn numbered(range: std::ops::Range<usize>) -> DependencyInfo {
		range.map(|i| (id(&format!("b{}", i)), DependencyList::single(DependencyEntry::new(["classpath"], VersionRange::Any).unwrap()))).collect()
	}

	#[test]
	fn wide_request_is_solved() {
		let mut g = Generated::new(|_: usize| DependencyInfo::default());
		let r = RequirementsSolver.solve(&root(), &numbered(0..5_000), &mut g).unwrap();
		assert_eq!(selected(r).len(), 5_000);
	}

	#[test]
	fn deep_chain_is_solved() {
		let mut g = Generated::new(|n: usize| if n + 1 < 5_000 { numbered(n + 1..n + 2) } else { DependencyInfo::default() });
		let r = RequirementsSolver.solve(&root(), &numbered(0..1), &mut g).unwrap();
		assert_eq!(selected(r).last().map(String::as_str), Some("b4999-v1"));
	}

	#[test]
	fn backtracks_across_many_requirements() {
		/* b0 has versions 2 and 1, only 1 is compatible with the last of many requirements */
		let mut f = Fixture::new(vec![
			("b0-v2", Some(Default::default())),
			("b0-v1", Some(Default::default())),
			("z-v1", Some(deps(&[("b0", "1")]))),
		]);
		let mut root_deps: Vec<(String, &str)> = vec![("b0".to_string(), "*")];
		root_deps.extend((1..2_000).map(|i| (format!("b0.x{}", i), "*")));
		root_deps.push(("z".to_string(), "*"));
		for i in 1..2_000 {
			f.storage.insert(BundleInformation::new(id(&format!("b0.x{}-v1", i)))).unwrap();
			f.bundles.insert(id(&format!("b0.x{}-v1", i)), Some(Default::default()));
		}
		let pairs: Vec<(&str, &str)> = root_deps.iter().map(|(n, r)| (n.as_str(), *r)).collect();
		let r = RequirementsSolver.solve(&root(), &deps(&pairs), &mut f).unwrap();
		let names = selected(r);
		assert_eq!(names[0], "b0-v1");
		assert_eq!(names.len(), 2_002);
	}
}
