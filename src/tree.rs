//! Repository snapshot retrieval: branch head lookup followed by one recursive
//! tree listing.

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Result, ScoutError};

/// One repository on one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    /// Key under which a file of this snapshot is memoized.
    pub fn cache_key(&self, path: &str) -> String {
        format!("{}/{}@{}:{path}", self.owner, self.repo, self.branch)
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodule commits and anything else the listing may carry.
    Other,
}

impl EntryKind {
    fn from_api(kind: &str) -> Self {
        match kind {
            "blob" => Self::Blob,
            "tree" => Self::Tree,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Tree,
        }
    }

    pub fn is_blob(&self) -> bool {
        self.kind == EntryKind::Blob
    }
}

/// The remote capability the analysis runs against.
///
/// `file_content` returns the payload exactly as served: base64 with embedded
/// line breaks. Decoding belongs to [`crate::cache::ContentCache`].
pub trait RepoSource {
    fn branch_head(&self, repo: &RepoRef) -> Result<String>;
    fn tree(&self, repo: &RepoRef, sha: &str) -> Result<Vec<TreeEntry>>;
    fn file_content(&self, repo: &RepoRef, path: &str) -> Result<String>;
    fn download_url(&self, repo: &RepoRef, path: &str) -> String;
}

/// Resolves the branch head and lists the whole tree at that commit.
///
/// Any failure here is fatal for the calling analysis.
pub fn fetch_snapshot(source: &dyn RepoSource, repo: &RepoRef) -> Result<Vec<TreeEntry>> {
    let sha = source.branch_head(repo)?;
    info!(%repo, %sha, "resolved branch head");
    let entries = source.tree(repo, &sha)?;
    info!(%repo, entries = entries.len(), "fetched repository tree");
    Ok(entries)
}

#[derive(Debug, Deserialize)]
struct BranchBody {
    commit: Option<CommitRef>,
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct TreeBody {
    tree: Vec<RawEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

pub fn parse_branch_sha(url: &str, body: Value) -> Result<String> {
    let branch: BranchBody =
        serde_json::from_value(body).map_err(|e| ScoutError::malformed(url, e.to_string()))?;
    branch
        .commit
        .map(|c| c.sha)
        .or(branch.sha)
        .filter(|sha| !sha.is_empty())
        .ok_or_else(|| ScoutError::malformed(url, "missing field `sha`"))
}

pub fn parse_tree(url: &str, body: Value) -> Result<Vec<TreeEntry>> {
    let listing: TreeBody =
        serde_json::from_value(body).map_err(|e| ScoutError::malformed(url, e.to_string()))?;
    if listing.truncated {
        warn!(url, "tree listing was truncated by the server; some files will be missing");
    }
    Ok(listing
        .tree
        .into_iter()
        .map(|e| TreeEntry {
            kind: EntryKind::from_api(&e.kind),
            path: e.path,
        })
        .collect())
}
