use crate::error::{AppError, Result};
use crate::extract::{ExtractorRegistry, extract_internal_imports};
use crate::rules::FilterRules;
#[cfg(feature = "serde_support")]
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub struct FileRecord {
    pub path: String,
    #[cfg_attr(feature = "serde_support", serde(skip_serializing))]
    pub content: String,
    pub package_name: String,
    pub internal_imports: Vec<String>,
}

impl FileRecord {
    pub fn directory(&self) -> &str {
        parent_dir(&self.path)
    }
}

pub fn parent_dir(relative_path: &str) -> &str {
    match relative_path.rfind('/') {
        Some(idx) => &relative_path[..idx],
        None => ".",
    }
}

// Disallowed segments are never descended into. Any traversal error aborts
// the walk.
pub fn collect_files(project_root: &Path, rules: &FilterRules) -> Result<Vec<PathBuf>> {
    log::info!("Walking project directory: {}", project_root.display());
    let walker = WalkDir::new(project_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let skip = rules.is_disallowed_segment(&entry.file_name().to_string_lossy());
            if skip {
                log::trace!("Skipping disallowed path: {}", entry.path().display());
            }
            !skip
        });

    let mut files = Vec::new();
    for entry_result in walker {
        let entry = entry_result.map_err(|e| {
            log::error!("Error walking directory: {}", e);
            AppError::from(e)
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        // Names that are not valid UTF-8 are matched on their lossy form.
        let file_name = entry.file_name().to_string_lossy();
        if rules.qualifies(&file_name) {
            log::trace!("Including file: {}", entry.path().display());
            files.push(entry.into_path());
        } else {
            log::trace!("Excluding file: {}", entry.path().display());
        }
    }

    log::info!("Directory walk complete. Selected {} files.", files.len());
    Ok(files)
}

// Stops at the first unreadable file or header parse failure.
pub fn read_records(
    project_root: &Path,
    files: &[PathBuf],
    module_name: Option<&str>,
    extractors: &ExtractorRegistry,
) -> Result<Vec<FileRecord>> {
    log::info!("Reading content for {} files...", files.len());
    let mut records = Vec::with_capacity(files.len());

    for path in files {
        let bytes = fs::read(path).map_err(|e| AppError::FileRead {
            path: path.clone(),
            source: e,
        })?;
        let content = String::from_utf8_lossy(&bytes).into_owned();
        let relative_path = relative_path(project_root, path);

        let extraction =
            extract_internal_imports(extractors, &relative_path, &content, module_name)?;
        records.push(FileRecord {
            path: relative_path,
            content,
            package_name: extraction.package_name,
            internal_imports: extraction.internal_imports,
        });
    }

    log::info!("File reading complete.");
    Ok(records)
}

// Panics if `path` is not below `project_root`: the collector only yields
// paths under the root it was given.
pub fn relative_path(project_root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(project_root).unwrap_or_else(|_| {
        panic!(
            "collected path {} is not under project root {}",
            path.display(),
            project_root.display()
        )
    });
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn default_rules() -> FilterRules {
        crate::config::FiltersConfig::default().to_rules()
    }

    fn relative_all(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files.iter().map(|p| relative_path(root, p)).collect()
    }

    #[test]
    fn parent_dir_of_root_file_is_dot() {
        assert_eq!(parent_dir("main.go"), ".");
        assert_eq!(parent_dir("pkg/a/a.go"), "pkg/a");
    }

    #[test]
    fn collects_in_lexicographic_order() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.go", "package b");
        touch(temp.path(), "a/z.go", "package a");
        touch(temp.path(), "a/m.md", "# m");
        touch(temp.path(), "go.mod", "module x");

        let files = collect_files(temp.path(), &default_rules()).unwrap();
        assert_eq!(
            relative_all(temp.path(), &files),
            vec!["a/m.md", "a/z.go", "b.go"]
        );
    }

    #[test]
    fn skips_disallowed_subtrees_and_names() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "bin/tool.go", "package main");
        touch(temp.path(), "web/Node_Modules/lib/x.ts", "x");
        touch(temp.path(), "coverage.html", "<html>");
        touch(temp.path(), "docs/index.html", "<html>");
        touch(temp.path(), "main.rs", "fn main() {}");

        let files = collect_files(temp.path(), &default_rules()).unwrap();
        assert_eq!(relative_all(temp.path(), &files), vec!["docs/index.html"]);
    }

    #[test]
    fn missing_root_is_a_traversal_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let err = collect_files(&missing, &default_rules()).unwrap_err();
        assert!(matches!(err, AppError::WalkDir { .. }));
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let temp = TempDir::new().unwrap();
        let ghost = temp.path().join("ghost.go");
        let err = read_records(temp.path(), &[ghost], None, &ExtractorRegistry::default())
            .unwrap_err();
        assert!(matches!(err, AppError::FileRead { .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_file_names_are_matched_by_extension() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let name = OsStr::from_bytes(b"caf\xe9.go");
        fs::write(temp.path().join(name), "package cafe").unwrap();
        touch(temp.path(), "b.go", "package b");

        let files = collect_files(temp.path(), &default_rules()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|p| p.file_name() == Some(name)));
    }

    #[test]
    #[should_panic(expected = "is not under project root")]
    fn relative_path_outside_root_panics() {
        relative_path(Path::new("/project"), Path::new("/elsewhere/file.go"));
    }
}
