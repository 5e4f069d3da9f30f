use crate::config::{Config, ManifestConfig};
use crate::error::{AppError, Result};
use crate::extract::ExtractorRegistry;
use crate::gather::{self, FileRecord};
use crate::linearize::linearize;
use crate::manifest::read_module_name;
use crate::render::render_bundle;
use crate::rules::FilterRules;
use crate::tokens::TokenCounter;
use std::path::Path;

pub const INVALID_TOKEN_COUNT: i64 = -1;

// `tokens` covers the counting step only: on error `content` is still complete.
#[derive(Debug)]
pub struct Bundle {
    pub content: String,
    pub files: Vec<FileRecord>,
    pub module_name: Option<String>,
    pub tokens: Result<usize>,
}

impl Bundle {
    pub fn token_count(&self) -> i64 {
        match &self.tokens {
            Ok(count) => i64::try_from(*count).unwrap_or(i64::MAX),
            Err(_) => INVALID_TOKEN_COUNT,
        }
    }

    pub fn token_error(&self) -> Option<&AppError> {
        self.tokens.as_ref().err()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }
}

// Holds only immutable state, so one instance can serve concurrent runs.
pub struct Bundler<'a> {
    rules: FilterRules,
    manifest: Option<ManifestConfig>,
    extractors: ExtractorRegistry,
    counter: &'a dyn TokenCounter,
}

impl<'a> Bundler<'a> {
    pub fn new(config: &Config, counter: &'a dyn TokenCounter) -> Self {
        Self {
            rules: config.filters.to_rules(),
            manifest: config
                .manifest
                .enabled
                .then(|| config.manifest.clone()),
            extractors: ExtractorRegistry::default(),
            counter,
        }
    }

    pub fn with_extractors(mut self, extractors: ExtractorRegistry) -> Self {
        self.extractors = extractors;
        self
    }

    pub fn plan(&self, project_root: &Path) -> Result<(Option<String>, Vec<FileRecord>)> {
        let module_name = match &self.manifest {
            Some(manifest) => Some(read_module_name(project_root, manifest)?),
            None => {
                log::debug!("Manifest disabled; imports will not be classified as internal.");
                None
            }
        };

        let files = gather::collect_files(project_root, &self.rules)?;
        let records =
            gather::read_records(project_root, &files, module_name.as_deref(), &self.extractors)?;
        let ordered = linearize(records);
        log::debug!("Linearized order holds {} files", ordered.len());
        Ok((module_name, ordered))
    }

    pub fn bundle(&self, project_root: &Path) -> Result<Bundle> {
        log::info!("Bundling project at {}", project_root.display());
        let (module_name, files) = self.plan(project_root)?;
        let content = render_bundle(&files);

        let tokens = self.counter.count_tokens(&content);
        match &tokens {
            Ok(count) => log::info!(
                "Bundle holds {} files, {} bytes, {} tokens ({})",
                files.len(),
                content.len(),
                count,
                self.counter.model()
            ),
            Err(e) => log::warn!("Token counting failed: {}", e),
        }

        Ok(Bundle {
            content,
            files,
            module_name,
            tokens,
        })
    }
}
