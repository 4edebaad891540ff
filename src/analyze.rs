//! The two analyses: controllers with their data classes, and the project
//! overview.

use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::cache::ContentCache;
use crate::classify::{ClassifiedFileSet, classify_for_analysis, classify_for_overview, file_name};
use crate::clean::clean_source;
use crate::config::DEFAULT_MAX_FILES;
use crate::error::Result;
use crate::model::{AnalysisResult, FileOutcome, ProfileFile, ProjectOverviewResult, SkippedFile};
use crate::registry::ClassRegistry;
use crate::structure::{SignatureStatus, extract_signatures};
use crate::tree::{RepoRef, RepoSource, fetch_snapshot};

pub struct Analyzer<'a> {
    source: &'a dyn RepoSource,
    cache: &'a ContentCache,
}

impl<'a> Analyzer<'a> {
    pub fn new(source: &'a dyn RepoSource, cache: &'a ContentCache) -> Self {
        Self { source, cache }
    }

    /// Analyzes up to `max_files` controllers (default 10) in tree order.
    ///
    /// Branch and tree lookup failures abort the call. A controller whose
    /// content cannot be fetched or decoded becomes [`FileOutcome::Skipped`].
    pub fn analyze_controllers(
        &self,
        repo: &RepoRef,
        max_files: Option<usize>,
    ) -> Result<Vec<FileOutcome>> {
        let entries = fetch_snapshot(self.source, repo)?;
        let files = classify_for_analysis(&entries);
        let limit = max_files.unwrap_or(DEFAULT_MAX_FILES);
        if files.controllers.len() > limit {
            info!(
                total = files.controllers.len(),
                limit, "limiting controllers to analyze"
            );
        }

        let outcomes: Vec<FileOutcome> = files
            .controllers
            .iter()
            .take(limit)
            .map(|path| self.analyze_controller(repo, path, &files))
            .collect();

        let analyzed = outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Analyzed(_)))
            .count();
        info!(
            %repo,
            analyzed,
            skipped = outcomes.len() - analyzed,
            cache = ?self.cache.stats(),
            "controller analysis finished"
        );
        Ok(outcomes)
    }

    /// [`Self::analyze_controllers`] without the skipped entries.
    pub fn analyze(&self, repo: &RepoRef, max_files: Option<usize>) -> Result<Vec<AnalysisResult>> {
        Ok(self
            .analyze_controllers(repo, max_files)?
            .into_iter()
            .filter_map(|outcome| match outcome {
                FileOutcome::Analyzed(result) => Some(result),
                FileOutcome::Skipped(_) => None,
            })
            .collect())
    }

    /// Every controller plus build, configuration, logging and docs files.
    pub fn analyze_project_overview(&self, repo: &RepoRef) -> Result<ProjectOverviewResult> {
        let entries = fetch_snapshot(self.source, repo)?;
        let files = classify_for_overview(&entries);

        let controllers = files
            .controllers
            .iter()
            .filter_map(|path| self.fetch_cleaned(repo, path))
            .collect();
        let profiles = files
            .profiles
            .iter()
            .filter_map(|path| {
                self.fetch_cleaned(repo, path).map(|content| ProfileFile {
                    name: file_name(path).to_string(),
                    content,
                })
            })
            .collect();

        Ok(ProjectOverviewResult {
            controllers,
            profiles,
        })
    }

    fn analyze_controller(
        &self,
        repo: &RepoRef,
        path: &str,
        files: &ClassifiedFileSet,
    ) -> FileOutcome {
        let content = match self.fetch_text(repo, path) {
            Ok(Some(text)) => text,
            Ok(None) => return skipped(path, "content could not be decoded"),
            Err(err) => {
                warn!(path, error = %err, "skipping controller");
                return skipped(path, &err.to_string());
            }
        };

        let signatures = extract_signatures(&content);
        if signatures.status == SignatureStatus::ParseFailed {
            warn!(path, "controller kept without signatures");
        }

        let registry = ClassRegistry::new(&files.data_classes);
        let mut unresolved = Vec::new();
        let param_sources =
            self.resolve_sources(repo, &registry, &signatures.param_types, &mut unresolved);
        let return_sources =
            self.resolve_sources(repo, &registry, &signatures.return_types, &mut unresolved);

        FileOutcome::Analyzed(AnalysisResult {
            path: path.to_string(),
            content: clean_source(Some(&content)),
            param_sources,
            return_sources,
            unresolved,
            signature_status: signatures.status,
        })
    }

    fn resolve_sources(
        &self,
        repo: &RepoRef,
        registry: &ClassRegistry<'_>,
        type_names: &BTreeSet<String>,
        unresolved: &mut Vec<String>,
    ) -> Vec<String> {
        let mut sources = Vec::new();
        for type_name in type_names {
            let Some(found) = registry.resolve(type_name) else {
                debug!(type_name = %type_name, "type not found, likely cross-module");
                unresolved.push(type_name.clone());
                continue;
            };
            if let Some(code) = self.fetch_cleaned(repo, found.path()) {
                sources.push(code);
            }
        }
        sources
    }

    fn fetch_text(&self, repo: &RepoRef, path: &str) -> Result<Option<String>> {
        self.cache
            .get_or_fetch(&repo.cache_key(path), || self.source.file_content(repo, path))
    }

    fn fetch_cleaned(&self, repo: &RepoRef, path: &str) -> Option<String> {
        match self.fetch_text(repo, path) {
            Ok(Some(text)) => Some(clean_source(Some(&text))),
            Ok(None) => None,
            Err(err) => {
                warn!(path, error = %err, "failed to retrieve file content");
                None
            }
        }
    }
}

fn skipped(path: &str, reason: &str) -> FileOutcome {
    FileOutcome::Skipped(SkippedFile {
        path: path.to_string(),
        reason: reason.to_string(),
    })
}
