use crate::error::{AppError, Result};
use crate::rules::FilterRules;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_DIR: &str = ".amalgam";
pub const DEFAULT_CONFIG_FILENAME: &str = "amalgam.toml";
pub const USER_CONFIG_SUBDIR: &str = "amalgam";
pub const PROJECT_ROOT_ENV: &str = "AMALGAM_PROJECT_ROOT";
pub const DEFAULT_MANIFEST_FILE: &str = "go.mod";
pub const DEFAULT_MODULE_PREFIX: &str = "module ";
pub const DEFAULT_MODEL: &str = "gpt-4";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub manifest: ManifestConfig,
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FiltersConfig {
    #[serde(default = "default_exact_names")]
    pub exact_names: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_disallowed_segments")]
    pub disallowed_segments: Vec<String>,
    #[serde(default = "default_disallowed_substrings")]
    pub disallowed_substrings: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ManifestConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_manifest_file")]
    pub file: String,
    #[serde(default = "default_module_prefix")]
    pub module_prefix: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TokenizerConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_false")]
    pub allow_special_tokens: bool,
}

fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_exact_names() -> Vec<String> {
    Vec::new()
}
fn default_extensions() -> Vec<String> {
    [".go", ".md", ".ts", ".tsx", ".html", ".css", ".sql", ".proto"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_disallowed_segments() -> Vec<String> {
    vec!["bin".to_string(), "node_modules".to_string()]
}
fn default_disallowed_substrings() -> Vec<String> {
    vec!["coverage.html".to_string()]
}
fn default_manifest_file() -> String {
    DEFAULT_MANIFEST_FILE.to_string()
}
fn default_module_prefix() -> String {
    DEFAULT_MODULE_PREFIX.to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            exact_names: default_exact_names(),
            extensions: default_extensions(),
            disallowed_segments: default_disallowed_segments(),
            disallowed_substrings: default_disallowed_substrings(),
        }
    }
}
impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            file: default_manifest_file(),
            module_prefix: default_module_prefix(),
        }
    }
}
impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            allow_special_tokens: default_false(),
        }
    }
}

impl FiltersConfig {
    pub fn to_rules(&self) -> FilterRules {
        FilterRules::new(
            &self.exact_names,
            &self.extensions,
            &self.disallowed_segments,
            &self.disallowed_substrings,
        )
    }
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var(PROJECT_ROOT_ENV).ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })
    }

    // Explicit paths must exist. Bare names are looked up in the project's
    // `.amalgam/` directory. Without an explicit choice the project default
    // is tried, then the user-level config directory.
    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        let path_to_check = match cli_config_file {
            Some(p_str) => {
                let expanded_path_cow = shellexpand::tilde(p_str);
                let mut path = PathBuf::from(expanded_path_cow.as_ref());
                let looks_like_path = path.is_absolute()
                    || path.components().count() > 1
                    || p_str.contains(['/', '\\']);

                if looks_like_path {
                    if !path.exists() && path.extension().is_none() {
                        path.set_extension("toml");
                    }
                    if !path.exists() {
                        return Err(AppError::Config(format!(
                            "Specified config file not found at path: {}",
                            path.display()
                        )));
                    }
                    log::debug!("Using specified config file path: {}", path.display());
                    Some(path)
                } else {
                    let filename = if path.extension().is_none_or(|e| e != "toml") {
                        format!("{}.toml", path.to_string_lossy())
                    } else {
                        path.to_string_lossy().to_string()
                    };
                    let full_path = project_root.join(DEFAULT_CONFIG_DIR).join(filename);
                    if !full_path.exists() {
                        return Err(AppError::Config(format!(
                            "Specified config file '{}' not found in default directory: {}",
                            path.display(),
                            project_root.join(DEFAULT_CONFIG_DIR).display()
                        )));
                    }
                    log::debug!(
                        "Using specified config filename in default directory: {}",
                        full_path.display()
                    );
                    Some(full_path)
                }
            }
            None => {
                let project_default = project_root
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME);
                let user_default = dirs::config_dir()
                    .map(|d| d.join(USER_CONFIG_SUBDIR).join(DEFAULT_CONFIG_FILENAME));

                if project_default.exists() {
                    log::debug!(
                        "Using project config file path: {}",
                        project_default.display()
                    );
                    Some(project_default)
                } else if let Some(user_path) = user_default.filter(|p| p.exists()) {
                    log::debug!("Using user config file path: {}", user_path.display());
                    Some(user_path)
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        project_default.display()
                    );
                    None
                }
            }
        };
        Ok(path_to_check)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(content)
            .map_err(|e| AppError::TomlParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_toml() -> Result<String> {
        Ok(toml::to_string_pretty(&Config::default())?)
    }

    fn validate(&self) -> Result<()> {
        if self.manifest.enabled && self.manifest.file.trim().is_empty() {
            return Err(AppError::Config(
                "manifest.file must not be empty while the manifest is enabled".to_string(),
            ));
        }
        if self.manifest.enabled && self.manifest.module_prefix.is_empty() {
            return Err(AppError::Config(
                "manifest.module_prefix must not be empty while the manifest is enabled"
                    .to_string(),
            ));
        }
        if self.tokenizer.model.trim().is_empty() {
            return Err(AppError::Config(
                "tokenizer.model must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
