use std::sync::Arc;

use nest_resolve::{DependencyResolver, ResolutionRequest};
use nest_resolve::bundle::{BundleInformation, BundleKey};
use nest_resolve::registry::{LookupKey, MemoryLookup, MemoryRepository, MemoryStorage, StorageKey};
use nest_resolve::tracking::{NoopTracker, RecordingTracker, ResolutionCache, TrackedProperty};
use nest_resolve_test_utils::*;

/// `l1` over `s1` finds `x-v1` and `a-v1`, dependencies of its bundles are looked up in `l2` over `s2`.
struct Scoped {
	s1: Arc<MemoryStorage>,
	s2: Arc<MemoryStorage>,
	repository: Arc<MemoryRepository>,
}

fn scoped(a_needs: &str, l2_storages: impl FnOnce(&Arc<MemoryStorage>, &Arc<MemoryStorage>) -> Vec<Arc<MemoryStorage>>) -> Result<Scoped> {
	let s1 = Arc::new(MemoryStorage::new("s1"));
	s1.insert(BundleInformation::new(id("x-v1")?))?;
	s1.insert(BundleInformation::new(id("a-v1")?).with_dependencies(dependencies(vec![("x", classpath(a_needs)?)])?))?;
	let s2 = Arc::new(MemoryStorage::new("s2"));
	s2.insert(BundleInformation::new(id("x-v2")?))?;

	let l2 = Arc::new(MemoryLookup::new("l2", l2_storages(&s1, &s2)));
	let l1 = Arc::new(MemoryLookup::new("l1", vec![s1.clone()]).with_relative_lookup(l2));
	Ok(Scoped { s1, s2, repository: Arc::new(MemoryRepository::from_lookup(l1)) })
}

fn key(storage: &str, identifier: &str) -> Result<BundleKey> {
	Ok(BundleKey::new(Some(StorageKey(storage.to_string())), id(identifier)?))
}

fn request() -> Result<ResolutionRequest> {
	Ok(ResolutionRequest::builder().bundle(id("x")?).bundle(id("a")?).build())
}

#[test]
fn same_name_resolves_once_per_lookup() -> Result<()> {
	init_logging();
	let repo = scoped(">=2", |_, s2| vec![s2.clone()])?;
	let resolver = DependencyResolver::builder(repo.repository.clone()).build();

	let output = resolver.resolve(&request()?, &mut NoopTracker)?;
	assert_eq!(output.iter().cloned().collect::<Vec<_>>(), vec![key("s1", "x-v1")?, key("s1", "a-v1")?, key("s2", "x-v2")?]);
	Ok(())
}

#[test]
fn same_bundle_through_two_lookups_is_listed_once() -> Result<()> {
	init_logging();
	let repo = scoped("*", |s1, _| vec![s1.clone()])?;
	let resolver = DependencyResolver::builder(repo.repository.clone()).build();

	let output = resolver.resolve(&request()?, &mut NoopTracker)?;
	assert_eq!(output.iter().cloned().collect::<Vec<_>>(), vec![key("s1", "x-v1")?, key("s1", "a-v1")?]);
	Ok(())
}

#[test]
fn relative_lookup_is_recorded() -> Result<()> {
	init_logging();
	let repo = scoped(">=2", |_, s2| vec![s2.clone()])?;
	let resolver = DependencyResolver::builder(repo.repository.clone()).build();
	let mut tracker = RecordingTracker::new();
	resolver.resolve(&request()?, &mut tracker)?;

	let properties: Vec<_> = tracker.properties().keys().cloned().collect();
	assert!(properties.contains(&TrackedProperty::BundleVersions { lookup: LookupKey("l1".into()), bundle: id("x")? }));
	assert!(properties.contains(&TrackedProperty::BundleVersions { lookup: LookupKey("l2".into()), bundle: id("x")? }));
	assert!(properties.contains(&TrackedProperty::BundleInformation { storage: StorageKey("s2".into()), bundle: id("x-v2")? }));
	assert_eq!(properties.iter().filter(|p| **p == TrackedProperty::RootLookupKey).count(), 1);
	Ok(())
}

#[test]
fn change_in_relative_lookup_invalidates() -> Result<()> {
	init_logging();
	let repo = scoped(">=2", |_, s2| vec![s2.clone()])?;
	let resolver = DependencyResolver::builder(repo.repository.clone()).build();
	let mut cache = ResolutionCache::new();

	cache.resolve(&resolver, &request()?)?;
	repo.s2.insert(BundleInformation::new(id("x-v3")?))?;
	let output = cache.resolve(&resolver, &request()?)?;
	assert!(output.contains(&key("s2", "x-v3")?));
	assert_eq!(cache.misses(), 2);

	/* Unrelated to anything the resolution looked at */
	repo.s1.insert(BundleInformation::new(id("y-v1")?))?;
	cache.resolve(&resolver, &request()?)?;
	assert_eq!(cache.hits(), 1);
	Ok(())
}
