use std::collections::HashSet;

// Exclusions always win over inclusions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterRules {
    exact_names: HashSet<String>,
    extensions: HashSet<String>,
    disallowed_segments: HashSet<String>,
    disallowed_substrings: Vec<String>,
}

impl FilterRules {
    pub fn new<I, S>(
        exact_names: I,
        extensions: I,
        disallowed_segments: I,
        disallowed_substrings: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut substrings: Vec<String> = disallowed_substrings
            .into_iter()
            .map(|s| s.as_ref().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        substrings.sort();
        substrings.dedup();

        Self {
            exact_names: exact_names
                .into_iter()
                .map(|s| s.as_ref().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            extensions: extensions
                .into_iter()
                .filter_map(|s| normalize_extension(s.as_ref()))
                .collect(),
            disallowed_segments: disallowed_segments
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            disallowed_substrings: substrings,
        }
    }

    pub fn is_disallowed_segment(&self, name: &str) -> bool {
        self.disallowed_segments.contains(&name.to_lowercase())
    }

    pub fn is_disallowed_file_name(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.disallowed_substrings
            .iter()
            .any(|part| lower.contains(part.as_str()))
    }

    pub fn is_allowed_file_name(&self, file_name: &str) -> bool {
        if self.exact_names.contains(file_name) {
            return true;
        }
        file_extension(file_name).is_some_and(|ext| self.extensions.contains(ext))
    }

    pub fn qualifies(&self, file_name: &str) -> bool {
        if self.is_disallowed_file_name(file_name) {
            log::trace!("Rejected by disallowed substring: {}", file_name);
            return false;
        }
        self.is_allowed_file_name(file_name)
    }
}

// Substring from the last `.` to the end, dot included: ".bashrc" yields
// ".bashrc", "Makefile" yields None.
pub fn file_extension(file_name: &str) -> Option<&str> {
    file_name.rfind('.').map(|idx| &file_name[idx..])
}

fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    if trimmed.starts_with('.') {
        Some(trimmed.to_string())
    } else {
        Some(format!(".{}", trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> FilterRules {
        FilterRules::new(
            vec!["go.mod", "Makefile"],
            vec![".go", "md", ".tsx"],
            vec!["bin", "Node_Modules"],
            vec!["Coverage.html"],
        )
    }

    #[test]
    fn extension_is_taken_from_last_dot() {
        assert_eq!(file_extension("main.go"), Some(".go"));
        assert_eq!(file_extension("archive.tar.gz"), Some(".gz"));
        assert_eq!(file_extension(".bashrc"), Some(".bashrc"));
        assert_eq!(file_extension("Makefile"), None);
    }

    #[test]
    fn extensions_without_dot_are_normalized() {
        let rules = rules();
        assert!(rules.qualifies("README.md"));
        assert!(rules.qualifies("main.go"));
        assert!(!rules.qualifies("main.rs"));
    }

    #[test]
    fn exact_names_are_case_sensitive() {
        let rules = rules();
        assert!(rules.qualifies("Makefile"));
        assert!(!rules.qualifies("makefile"));
        assert!(rules.qualifies("go.mod"));
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        assert!(!rules().qualifies("MAIN.GO"));
    }

    #[test]
    fn segments_match_case_insensitively() {
        let rules = rules();
        assert!(rules.is_disallowed_segment("bin"));
        assert!(rules.is_disallowed_segment("BIN"));
        assert!(rules.is_disallowed_segment("node_modules"));
        assert!(!rules.is_disallowed_segment("binary"));
    }

    #[test]
    fn exclusion_wins_over_inclusion() {
        let rules = FilterRules::new(
            vec!["coverage.html"],
            vec![".html"],
            Vec::<&str>::new(),
            vec!["coverage.html"],
        );
        assert!(!rules.qualifies("coverage.html"));
        assert!(!rules.qualifies("unit-COVERAGE.HTML"));
        assert!(rules.qualifies("index.html"));
    }
}
