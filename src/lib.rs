//! # api-scout
//!
//! Collects, from a GitHub repository, the Java sources an API documentation
//! generator needs: controllers and the DTO/entity classes their methods take
//! and return, or a project overview of controllers plus build and config files.
//!
//! ## Architecture
//!
//! - **tree**: Branch head lookup and recursive tree listing behind the `RepoSource` trait
//! - **github**: Blocking GitHub REST implementation of `RepoSource`
//! - **classify**: Path-based split into controllers, data classes and profile files
//! - **cache**: Thread-safe memo of decoded file bodies, one fetch per key
//! - **registry**: Type name to data-class path resolution (exact, then substring)
//! - **structure**: Method parameter/return types via tree-sitter Java parsing
//! - **clean**: Removal of package/import statements and whitespace squeezing
//! - **analyze**: Controller analysis and project overview pipelines
//! - **listing**: Raw download links for every file in a snapshot

pub mod analyze;
pub mod cache;
pub mod classify;
pub mod clean;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod listing;
pub mod model;
pub mod registry;
pub mod structure;
pub mod tree;

pub use analyze::Analyzer;
pub use cache::ContentCache;
pub use error::{Result, ScoutError};
pub use github::GitHubClient;
pub use tree::{RepoRef, RepoSource, TreeEntry};
