mod client;
mod provider;
mod registry_facts;

pub use provider::{DEFAULT_NPM_DOWNLOADS_URL, DEFAULT_NPM_REGISTRY_URL, Provider};
pub use registry_facts::{PackageMetadata, RegistryFacts};
