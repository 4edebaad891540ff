use thiserror::Error;

pub type Result<T, E = ScoutError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("branch not found: {owner}/{repo}@{branch}")]
    BranchNotFound {
        owner: String,
        repo: String,
        branch: String,
    },

    #[error("GET {url} returned {status}")]
    Transport { status: u16, url: String },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response from {url}: {detail}")]
    MalformedResponse { url: String, detail: String },

    #[error("base64 payload for {path} could not be decoded: {source}")]
    Decode {
        path: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("java parse failed: {0}")]
    Parse(String),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ScoutError {
    pub fn malformed(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            detail: detail.into(),
        }
    }
}
