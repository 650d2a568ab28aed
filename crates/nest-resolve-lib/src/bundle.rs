//! Bundle identity and dependency declaration types.
//!
//! A bundle is a versioned, distributable unit. It is named by a [`BundleIdentifier`],
//! found in a registry under a [`BundleKey`] and declares its dependencies as a [`DependencyInfo`].

mod version;
pub use version::VersionNumber;
pub use version::VersionRange;

mod identifier;
pub use identifier::BundleIdentifier;
pub use identifier::is_meta_qualifier;

mod key;
pub use key::BundleKey;

pub mod dependency;
pub use dependency::DependencyEntry;
pub use dependency::DependencyList;
pub use dependency::DependencyInfo;

mod information;
pub use information::BundleInformation;
