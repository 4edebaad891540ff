use tracing::info;

use crate::error::Result;
use crate::tree::{RepoRef, RepoSource, fetch_snapshot};

/// Direct download links for every file at or below `prefix`, in tree order.
///
/// Uses the single recursive tree listing, so the number of API calls does not
/// depend on how deep the repository is.
pub fn list_download_urls(
    source: &dyn RepoSource,
    repo: &RepoRef,
    prefix: Option<&str>,
) -> Result<Vec<String>> {
    let prefix = prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty());
    let entries = fetch_snapshot(source, repo)?;

    let urls: Vec<String> = entries
        .iter()
        .filter(|e| e.is_blob())
        .filter(|e| prefix.is_none_or(|p| is_under(&e.path, p)))
        .map(|e| source.download_url(repo, &e.path))
        .collect();
    info!(%repo, files = urls.len(), "listed download links");
    Ok(urls)
}

fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
