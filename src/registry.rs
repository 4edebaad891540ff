use std::collections::BTreeMap;
use tracing::debug;

/// Lookup from a referenced type name to the data-class file that declares it.
#[derive(Debug, Clone, Copy)]
pub struct ClassRegistry<'a> {
    index: &'a BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match<'a> {
    Exact(&'a str),
    /// Carries the index key that contained the requested name.
    Fuzzy { class_name: &'a str, path: &'a str },
}

impl<'a> Match<'a> {
    pub fn path(&self) -> &'a str {
        match *self {
            Match::Exact(path) => path,
            Match::Fuzzy { path, .. } => path,
        }
    }
}

impl<'a> ClassRegistry<'a> {
    pub fn new(index: &'a BTreeMap<String, String>) -> Self {
        Self { index }
    }

    /// Exact, case-sensitive key first; otherwise the first key (in sorted
    /// order) whose lowercase form contains the lowercase `type_name`.
    pub fn resolve(&self, type_name: &str) -> Option<Match<'a>> {
        if let Some(path) = self.index.get(type_name) {
            return Some(Match::Exact(path.as_str()));
        }

        let wanted = type_name.to_lowercase();
        let found = self
            .index
            .iter()
            .find(|(name, _)| name.to_lowercase().contains(&wanted))
            .map(|(name, path)| Match::Fuzzy {
                class_name: name.as_str(),
                path: path.as_str(),
            });
        if let Some(Match::Fuzzy { class_name, .. }) = found {
            debug!(type_name, matched = class_name, "fuzzy class match");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn exact_match_beats_substring_match() {
        let idx = index(&[
            ("AUser", "dto/AUser.java"),
            ("User", "entity/User.java"),
        ]);
        let registry = ClassRegistry::new(&idx);
        assert_eq!(
            registry.resolve("User"),
            Some(Match::Exact("entity/User.java"))
        );
    }

    #[test]
    fn falls_back_to_case_insensitive_substring() {
        let idx = index(&[("OrderDetailVO", "vo/model/OrderDetailVO.java")]);
        let registry = ClassRegistry::new(&idx);
        let m = registry.resolve("orderdetail").unwrap();
        assert_eq!(m.path(), "vo/model/OrderDetailVO.java");
        assert!(matches!(m, Match::Fuzzy { class_name: "OrderDetailVO", .. }));
    }

    #[test]
    fn fuzzy_match_picks_first_sorted_key() {
        let idx = index(&[
            ("UserQueryDTO", "dto/UserQueryDTO.java"),
            ("UserDTOList", "dto/UserDTOList.java"),
            ("BaseUserDTO", "dto/BaseUserDTO.java"),
        ]);
        let registry = ClassRegistry::new(&idx);
        assert_eq!(
            registry.resolve("UserDTO").map(|m| m.path()),
            Some("dto/BaseUserDTO.java")
        );
    }

    #[test]
    fn unknown_and_generic_names_are_unresolved() {
        let idx = index(&[("UserDTO", "dto/UserDTO.java")]);
        let registry = ClassRegistry::new(&idx);
        assert!(registry.resolve("PageResult").is_none());
        assert!(registry.resolve("List<UserDTO>").is_none());
    }
}
