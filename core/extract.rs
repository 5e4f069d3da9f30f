use crate::error::Result;
use crate::rules::file_extension;
use std::collections::HashMap;

pub mod go;

pub use go::GoExtractor;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceHeader {
    pub package_name: Option<String>,
    pub imports: Vec<String>,
}

pub trait ImportExtractor: Send + Sync {
    fn dialect(&self) -> &'static str;

    fn parse_header(&self, path: &str, content: &str) -> Result<SourceHeader>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExtractor;

impl ImportExtractor for NoopExtractor {
    fn dialect(&self) -> &'static str {
        "none"
    }

    fn parse_header(&self, _path: &str, _content: &str) -> Result<SourceHeader> {
        Ok(SourceHeader::default())
    }
}

pub struct ExtractorRegistry {
    extractors: HashMap<String, Box<dyn ImportExtractor>>,
    fallback: NoopExtractor,
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
            fallback: NoopExtractor,
        }
    }

    pub fn register(&mut self, extension: &str, extractor: Box<dyn ImportExtractor>) {
        let key = if extension.starts_with('.') {
            extension.to_string()
        } else {
            format!(".{}", extension)
        };
        log::trace!("Registering '{}' extractor for {}", extractor.dialect(), key);
        self.extractors.insert(key, extractor);
    }

    pub fn for_file_name(&self, file_name: &str) -> &dyn ImportExtractor {
        file_extension(file_name)
            .and_then(|ext| self.extractors.get(ext))
            .map(|boxed| boxed.as_ref())
            .unwrap_or(&self.fallback as &dyn ImportExtractor)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(go::GO_EXTENSION, Box::new(GoExtractor));
        registry
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.extractors.keys().collect();
        keys.sort();
        f.debug_struct("ExtractorRegistry")
            .field("extensions", &keys)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    pub package_name: String,
    pub internal_imports: Vec<String>,
}

pub fn extract_internal_imports(
    registry: &ExtractorRegistry,
    relative_path: &str,
    content: &str,
    module_name: Option<&str>,
) -> Result<Extraction> {
    let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
    let extractor = registry.for_file_name(file_name);
    let header = extractor.parse_header(relative_path, content)?;

    let internal_imports = match module_name {
        Some(module) => header
            .imports
            .iter()
            .filter_map(|import| {
                let dir = internal_import_dir(import, module);
                match &dir {
                    Some(d) => log::trace!("{}: internal import {} -> {}", relative_path, import, d),
                    None => log::trace!("{}: external import {}", relative_path, import),
                }
                dir
            })
            .collect(),
        None => Vec::new(),
    };

    Ok(Extraction {
        package_name: header.package_name.unwrap_or_default(),
        internal_imports,
    })
}

// The module root itself maps to ".".
pub fn internal_import_dir(import_path: &str, module_name: &str) -> Option<String> {
    if module_name.is_empty() {
        return None;
    }
    let rest = import_path.strip_prefix(module_name)?;
    if rest.is_empty() {
        return Some(".".to_string());
    }
    let rest = rest.strip_prefix('/')?;
    Some(clean_relative(rest))
}

// Drops empty and `.` elements and folds `..` where possible.
// An empty result becomes ".".
pub fn clean_relative(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
