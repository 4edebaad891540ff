use serde::Serialize;

use crate::cache::CacheStats;
use crate::structure::SignatureStatus;

/// One analyzed controller: its cleaned source plus the cleaned sources of the
/// data classes its methods accept and return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub path: String,
    pub content: String,
    pub param_sources: Vec<String>,
    pub return_sources: Vec<String>,
    /// Referenced types with no data class in this repository, most likely
    /// declared in another module or a dependency.
    pub unresolved: Vec<String>,
    pub signature_status: SignatureStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Analyzed(AnalysisResult),
    Skipped(SkippedFile),
}

impl FileOutcome {
    pub fn path(&self) -> &str {
        match self {
            FileOutcome::Analyzed(result) => &result.path,
            FileOutcome::Skipped(skipped) => &skipped.path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileFile {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectOverviewResult {
    pub controllers: Vec<String>,
    pub profiles: Vec<ProfileFile>,
}

/// `analyze --report` output.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub results: Vec<AnalysisResult>,
    pub skipped: Vec<SkippedFile>,
    pub cache: CacheStats,
}

impl AnalysisReport {
    pub fn new(outcomes: Vec<FileOutcome>, cache: CacheStats) -> Self {
        let mut results = Vec::new();
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Analyzed(result) => results.push(result),
                FileOutcome::Skipped(file) => skipped.push(file),
            }
        }
        Self {
            results,
            skipped,
            cache,
        }
    }
}
