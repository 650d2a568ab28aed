use crate::bundle::VersionNumber;
use crate::constraint::ConstraintConfiguration;

/// Oldest repository version able to consume a full resolution domain.
pub const DOMAIN_RESOLUTION_MIN_REPOSITORY_VERSION: &str = "0.8.1";

pub const ENV_REPOSITORY_VERSION: &str = "NEST_REPOSITORY_VERSION";
pub const ENV_JRE_MAJOR_VERSION: &str = "NEST_JRE_MAJOR_VERSION";
pub const ENV_BUILD_SYSTEM_VERSION: &str = "NEST_BUILD_SYSTEM_VERSION";
pub const ENV_NATIVE_ARCHITECTURE: &str = "NEST_NATIVE_ARCHITECTURE";

/// Host capabilities and defaults a resolver is built with.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
	/// Version of the repository hosting the resolution, `None` if current.
	repository_version: Option<VersionNumber>,
	/// Fill the constraints a resolver is not given explicitly.
	default_constraints: ConstraintConfiguration,
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_version(name: &str) -> Option<VersionNumber> {
	let value = env_var(name)?;
	match VersionNumber::new(&value) {
		Ok(v) => Some(v),
		Err(e) => {
			log::warn!("Ignoring {}=`{}`: {}", name, value, e);
			None
		}
	}
}

impl ResolverOptions {
	/// Reads the options from the `NEST_*` environment variables.
	///
	/// Invalid values are logged and ignored. The native architecture defaults to the one of the running process.
	pub fn from_env() -> Self {
		let repository_version = env_version(ENV_REPOSITORY_VERSION);
		let jre_major_version = env_var(ENV_JRE_MAJOR_VERSION).and_then(|v| match v.parse::<u32>() {
			Ok(v) => Some(v),
			Err(e) => {
				log::warn!("Ignoring {}=`{}`: {}", ENV_JRE_MAJOR_VERSION, v, e);
				None
			}
		});
		let native_architecture = env_var(ENV_NATIVE_ARCHITECTURE).unwrap_or_else(|| std::env::consts::ARCH.to_string());

		Self {
			default_constraints: ConstraintConfiguration::default()
				.with_jre_major_version(jre_major_version)
				.with_repository_version(repository_version.clone())
				.with_build_system_version(env_version(ENV_BUILD_SYSTEM_VERSION))
				.with_native_architecture(Some(native_architecture)),
			repository_version,
		}
	}

	pub fn repository_version(&self) -> Option<&VersionNumber> {
		self.repository_version.as_ref()
	}
	pub fn set_repository_version(&mut self, repository_version: Option<VersionNumber>) {
		self.repository_version = repository_version;
	}

	pub fn default_constraints(&self) -> &ConstraintConfiguration {
		&self.default_constraints
	}
	pub fn set_default_constraints(&mut self, default_constraints: ConstraintConfiguration) {
		self.default_constraints = default_constraints;
	}

	/// Whether the host can use domain resolution, older repositories only understand the declaration list.
	pub fn supports_domain_resolution(&self) -> bool {
		match (&self.repository_version, VersionNumber::new(DOMAIN_RESOLUTION_MIN_REPOSITORY_VERSION)) {
			(Some(version), Ok(min)) => *version >= min,
			_ => true,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn with_repository(v: &str) -> ResolverOptions {
		let mut options = ResolverOptions::default();
		options.set_repository_version(Some(VersionNumber::new(v).unwrap()));
		options
	}

	#[test] fn unknown_repository_supports_domain() { assert!(ResolverOptions::default().supports_domain_resolution()) }
	#[test] fn old_repository_uses_requirements() { assert!(!with_repository("0.8.0").supports_domain_resolution()) }
	#[test] fn minimum_repository_supports_domain() { assert!(with_repository("0.8.1").supports_domain_resolution()) }
	#[test] fn newer_repository_supports_domain() { assert!(with_repository("0.10").supports_domain_resolution()) }
	#[test] fn default_is_unconstrained() { assert!(ResolverOptions::default().default_constraints().is_unconstrained()) }
}
