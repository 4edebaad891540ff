use regex::Regex;
use std::sync::LazyLock;
use tracing::error;

static ORIGIN_STATEMENT: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\b(?:package|import)\s+[^;]+;"));

/// Flattens Java source for prompt input: drops `package` and `import`
/// statements and squeezes all whitespace to single spaces.
pub fn clean_source(code: Option<&str>) -> String {
    let Some(code) = code.filter(|c| !c.is_empty()) else {
        return String::new();
    };

    let pattern = match ORIGIN_STATEMENT.as_ref() {
        Ok(pattern) => pattern,
        Err(err) => {
            error!(error = %err, "source cleaner unavailable");
            return String::new();
        }
    };

    let stripped = pattern.replace_all(code, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
