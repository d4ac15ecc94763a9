mod client;
mod hosting_facts;
mod provider;

pub use hosting_facts::{HostingFacts, RepoSummary};
pub use provider::{DEFAULT_GITHUB_API_URL, Provider};
