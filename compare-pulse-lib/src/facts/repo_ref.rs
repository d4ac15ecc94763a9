//! Normalization of free-form repository references.
//!
//! Users type repository references in many shapes: full URLs, clone URLs, URLs with trailing
//! paths, or the bare `owner/repo` form. [`normalize`] reduces all of them to a canonical
//! [`RepoRef`], or to nothing when the input cannot be understood.

use core::fmt::{Display, Formatter};
use std::sync::Arc;
use url::Url;

const LOG_TARGET: &str = "  repo_ref";
const HOST_MARKER: &str = "github.com/";
const GIT_SUFFIX: &str = ".git";

/// A validated `owner/repo` pair.
///
/// Both parts are non-empty and contain neither whitespace nor `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    owner: Arc<str>,
    repo: Arc<str>,
}

impl RepoRef {
    /// Build a reference from its two parts, returning `None` if either part is invalid.
    #[must_use]
    pub fn new(owner: &str, repo: &str) -> Option<Self> {
        if is_valid_part(owner) && is_valid_part(repo) {
            Some(Self {
                owner: Arc::from(owner),
                repo: Arc::from(repo),
            })
        } else {
            None
        }
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl Display for RepoRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty() && !part.contains('/') && !part.chars().any(char::is_whitespace)
}

fn strip_git_suffix(s: &str) -> &str {
    s.strip_suffix(GIT_SUFFIX).unwrap_or(s)
}

/// Normalize an arbitrary string into a repository reference.
///
/// Inputs are tried in this order:
///
/// 1. An absolute `http(s)` URL with at least two path segments.
/// 2. Any text containing `github.com/`, using the two segments that follow it.
/// 3. A bare `owner/repo`, after trimming surrounding slashes and a trailing `.git`.
///
/// A URL that fails to parse falls through to the textual rules. Returns `None` when nothing
/// matches; this signals "not configured" rather than an error.
#[must_use]
pub fn normalize(input: &str) -> Option<RepoRef> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    from_url(s).or_else(|| from_host_marker(s)).or_else(|| from_bare(s))
}

/// Like [`normalize`], but renders the result as `owner/repo`, or an empty string on failure.
#[must_use]
pub fn normalize_str(input: &str) -> String {
    normalize(input).map(|r| r.to_string()).unwrap_or_default()
}

fn from_url(s: &str) -> Option<RepoRef> {
    if !(s.starts_with("http://") || s.starts_with("https://")) {
        return None;
    }

    let url = match Url::parse(s) {
        Ok(url) => url,
        Err(e) => {
            log::trace!(target: LOG_TARGET, "'{s}' is not a well-formed URL ({e}), trying textual rules");
            return None;
        }
    };

    let mut segments = url.path_segments()?.skip_while(|segment| segment.is_empty());
    let owner = segments.next()?;
    let repo = strip_git_suffix(segments.next()?);
    RepoRef::new(owner, repo)
}

fn from_host_marker(s: &str) -> Option<RepoRef> {
    let (_, rest) = s.split_once(HOST_MARKER)?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();

    let mut segments = rest.split('/').filter(|segment| !segment.is_empty());
    let owner = segments.next()?;
    let repo = strip_git_suffix(segments.next()?);
    RepoRef::new(owner, repo)
}

fn from_bare(s: &str) -> Option<RepoRef> {
    let s = strip_git_suffix(s.trim_matches('/'));
    let (owner, repo) = s.split_once('/')?;
    RepoRef::new(owner, repo)
}
