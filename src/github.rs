//! Blocking GitHub REST client backing [`RepoSource`].

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::Settings;
use crate::error::{Result, ScoutError};
use crate::tree::{RepoRef, RepoSource, TreeEntry, parse_branch_sha, parse_tree};

const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";

#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: Url,
    raw_base: Url,
}

impl GitHubClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        headers.insert(API_VERSION_HEADER, header_value(&settings.api_version)?);
        if let Some(token) = settings.token.as_deref() {
            let mut value = header_value(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: base_url(&settings.api_base_url)?,
            raw_base: base_url(&settings.raw_base_url)?,
        })
    }

    /// `{api}/repos/{owner}/{repo}/{tail...}` with every segment percent-encoded.
    fn repo_url<'s>(&self, repo: &RepoRef, tail: impl IntoIterator<Item = &'s str>) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", repo.owner.as_str(), repo.repo.as_str()])
                .extend(tail);
        }
        url
    }

    fn branch_url(&self, repo: &RepoRef) -> Url {
        self.repo_url(repo, ["branches"].into_iter().chain(repo.branch.split('/')))
    }

    fn tree_url(&self, repo: &RepoRef, sha: &str) -> Url {
        let mut url = self.repo_url(repo, ["git", "trees", sha]);
        url.query_pairs_mut().append_pair("recursive", "1");
        url
    }

    fn contents_url(&self, repo: &RepoRef, path: &str) -> Url {
        let mut url = self.repo_url(repo, ["contents"].into_iter().chain(path.split('/')));
        url.query_pairs_mut().append_pair("ref", &repo.branch);
        url
    }

    /// GET returning the status and, on success, the parsed JSON body.
    fn get_json(&self, url: &str) -> Result<(StatusCode, Option<Value>)> {
        debug!(url, "GET");
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Ok((status, None));
        }
        let body = response.text()?;
        let value = serde_json::from_str(&body)
            .map_err(|e| ScoutError::malformed(url, format!("body is not JSON: {e}")))?;
        Ok((status, Some(value)))
    }

    fn get_ok_json(&self, url: &str) -> Result<Value> {
        match self.get_json(url)? {
            (_, Some(value)) => Ok(value),
            (status, None) => Err(ScoutError::Transport {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }
}

impl RepoSource for GitHubClient {
    fn branch_head(&self, repo: &RepoRef) -> Result<String> {
        let url = self.branch_url(repo).to_string();
        match self.get_json(&url)? {
            (_, Some(body)) => parse_branch_sha(&url, body),
            (StatusCode::NOT_FOUND, None) => Err(ScoutError::BranchNotFound {
                owner: repo.owner.clone(),
                repo: repo.repo.clone(),
                branch: repo.branch.clone(),
            }),
            (status, None) => Err(ScoutError::Transport {
                status: status.as_u16(),
                url,
            }),
        }
    }

    fn tree(&self, repo: &RepoRef, sha: &str) -> Result<Vec<TreeEntry>> {
        let url = self.tree_url(repo, sha).to_string();
        let body = self.get_ok_json(&url)?;
        parse_tree(&url, body)
    }

    fn file_content(&self, repo: &RepoRef, path: &str) -> Result<String> {
        let url = self.contents_url(repo, path).to_string();
        let body = self.get_ok_json(&url)?;
        body.get("content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ScoutError::malformed(&url, "missing field `content`"))
    }

    fn download_url(&self, repo: &RepoRef, path: &str) -> String {
        let mut url = self.raw_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([repo.owner.as_str(), repo.repo.as_str()])
                .extend(repo.branch.split('/'))
                .extend(path.split('/'));
        }
        url.to_string()
    }
}

fn base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| ScoutError::InvalidConfig(format!("invalid base URL {raw:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ScoutError::InvalidConfig(format!(
            "base URL cannot carry a path: {raw:?}"
        )));
    }
    Ok(url)
}

fn header_value(raw: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(raw)
        .map_err(|_| ScoutError::InvalidConfig(format!("not a valid header value: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GitHubClient {
        let settings = Settings {
            api_base_url: "http://api.test/".to_string(),
            raw_base_url: "http://raw.test".to_string(),
            ..Settings::default()
        };
        GitHubClient::new(&settings).unwrap()
    }

    #[test]
    fn urls_follow_rest_layout() {
        let c = client();
        let repo = RepoRef::new("acme", "shop", "main");
        assert_eq!(
            c.branch_url(&repo).as_str(),
            "http://api.test/repos/acme/shop/branches/main"
        );
        assert_eq!(
            c.tree_url(&repo, "abc").as_str(),
            "http://api.test/repos/acme/shop/git/trees/abc?recursive=1"
        );
        assert_eq!(
            c.contents_url(&repo, "src/App.java").as_str(),
            "http://api.test/repos/acme/shop/contents/src/App.java?ref=main"
        );
        assert_eq!(
            c.download_url(&repo, "src/App.java"),
            "http://raw.test/acme/shop/main/src/App.java"
        );
    }

    #[test]
    fn reserved_characters_in_paths_are_encoded() {
        let c = client();
        let repo = RepoRef::new("acme", "shop", "feature/a&b");
        assert_eq!(
            c.contents_url(&repo, "docs/C#?.md").as_str(),
            "http://api.test/repos/acme/shop/contents/docs/C%23%3F.md?ref=feature%2Fa%26b"
        );
        assert_eq!(
            c.branch_url(&repo).as_str(),
            "http://api.test/repos/acme/shop/branches/feature/a&b"
        );
        assert_eq!(
            c.download_url(&repo, "docs/C#?.md"),
            "http://raw.test/acme/shop/feature/a&b/docs/C%23%3F.md"
        );
    }

    #[test]
    fn base_url_with_path_prefix_is_kept() {
        let settings = Settings {
            api_base_url: "http://ghe.test/api/v3/".to_string(),
            ..Settings::default()
        };
        let c = GitHubClient::new(&settings).unwrap();
        let repo = RepoRef::new("acme", "shop", "main");
        assert_eq!(
            c.branch_url(&repo).as_str(),
            "http://ghe.test/api/v3/repos/acme/shop/branches/main"
        );
    }

    #[test]
    fn unparseable_base_url_is_rejected() {
        let settings = Settings {
            api_base_url: "not a url".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            GitHubClient::new(&settings),
            Err(ScoutError::InvalidConfig(_))
        ));
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let settings = Settings {
            token: Some("bad\ntoken".to_string()),
            ..Settings::default()
        };
        assert!(matches!(
            GitHubClient::new(&settings),
            Err(ScoutError::InvalidConfig(_))
        ));
    }
}
