//! Path-only classification of tree entries. No file is opened here.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::tree::TreeEntry;

const SOURCE_EXTENSION: &str = ".java";
const CONTROLLER_DIR: &str = "/controller/";
const CONTROLLER_SUFFIX: &str = "controller.java";
const DATA_CLASS_DIRS: [&str; 5] = ["/entity/", "/model/", "/dto/", "/bo/", "/po/"];
const PROFILE_MARKERS: [&str; 4] = ["pom.xml", "application", "logback-spring.xml", ".md"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedFileSet {
    /// Tree order.
    pub controllers: Vec<String>,
    /// Bare class name to path. A later path with the same name replaces an
    /// earlier one.
    pub data_classes: BTreeMap<String, String>,
    /// Tree order.
    pub profiles: Vec<String>,
}

/// Controllers and the data classes they may reference.
pub fn classify_for_analysis(entries: &[TreeEntry]) -> ClassifiedFileSet {
    let mut set = ClassifiedFileSet::default();

    for entry in entries.iter().filter(|e| e.is_blob()) {
        if !entry.path.ends_with(SOURCE_EXTENSION) {
            continue;
        }
        let lower = entry.path.to_lowercase();

        if is_controller_path(&lower) {
            debug!(path = %entry.path, "controller");
            set.controllers.push(entry.path.clone());
        } else if is_data_class_path(&lower) {
            let Some(class_name) = bare_class_name(&entry.path) else {
                continue;
            };
            debug!(class = class_name, path = %entry.path, "data class");
            if let Some(previous) = set
                .data_classes
                .insert(class_name.to_string(), entry.path.clone())
            {
                debug!(class = class_name, replaced = %previous, "data class name collision");
            }
        }
    }

    info!(
        controllers = set.controllers.len(),
        data_classes = set.data_classes.len(),
        "classified repository tree"
    );
    set
}

/// Controllers plus build, configuration, logging and documentation files.
pub fn classify_for_overview(entries: &[TreeEntry]) -> ClassifiedFileSet {
    let mut set = ClassifiedFileSet::default();

    for entry in entries.iter().filter(|e| e.is_blob()) {
        let lower = entry.path.to_lowercase();
        if is_controller_path(&lower) {
            set.controllers.push(entry.path.clone());
        } else if PROFILE_MARKERS.iter().any(|m| lower.contains(m)) {
            set.profiles.push(entry.path.clone());
        }
    }

    if !set.profiles.is_empty() {
        info!(profiles = ?set.profiles, "found profile files");
    }
    if !set.controllers.is_empty() {
        info!(controllers = ?set.controllers, "found controllers");
    }
    set
}

fn is_controller_path(lower: &str) -> bool {
    lower.contains(CONTROLLER_DIR) || lower.ends_with(CONTROLLER_SUFFIX)
}

fn is_data_class_path(lower: &str) -> bool {
    DATA_CLASS_DIRS.iter().any(|dir| lower.contains(dir))
}

/// `a/b/UserDTO.java` -> `UserDTO`. Paths without a directory yield `None`.
pub fn bare_class_name(path: &str) -> Option<&str> {
    let (_, file) = path.rsplit_once('/')?;
    if file.is_empty() {
        return None;
    }
    Some(file.strip_suffix(SOURCE_EXTENSION).unwrap_or(file))
}

/// Last path segment.
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}
