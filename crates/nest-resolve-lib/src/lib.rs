pub mod error;
pub use error::Result;
pub use error::Error;

pub mod bundle;
pub use bundle::BundleIdentifier;
pub use bundle::BundleKey;
pub use bundle::DependencyInfo;

pub mod config;
pub use config::ResolverOptions;

pub mod constraint;
pub use constraint::ConstraintConfiguration;

pub mod filter;
pub use filter::DependencyFilter;

pub mod registry;
pub mod solver;
pub mod tracking;
pub mod manifest;

pub mod resolver;
pub use resolver::DependencyResolver;
pub use resolver::ResolutionRequest;
pub use resolver::ResolutionOutput;
