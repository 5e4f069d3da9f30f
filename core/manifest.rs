use crate::config::ManifestConfig;
use crate::error::{AppError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// First line (trimmed) starting with the module prefix wins. A trailing
// `//` comment and surrounding double quotes are removed from the value.
pub fn read_module_name(project_root: &Path, manifest: &ManifestConfig) -> Result<String> {
    let manifest_path = project_root.join(&manifest.file);
    log::debug!("Reading module name from {}", manifest_path.display());

    let file = File::open(&manifest_path).map_err(|e| AppError::ManifestRead {
        path: manifest_path.clone(),
        source: e,
    })?;

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| AppError::ManifestRead {
            path: manifest_path.clone(),
            source: e,
        })?;
        let line = line.trim();
        if let Some(value) = line.strip_prefix(manifest.module_prefix.as_str()) {
            let module_name = clean_module_value(value);
            log::debug!("Found module name '{}'", module_name);
            return Ok(module_name);
        }
    }

    Err(AppError::ModuleNotFound {
        path: manifest_path,
    })
}

fn clean_module_value(value: &str) -> String {
    let without_comment = match value.find("//") {
        Some(idx) => &value[..idx],
        None => value,
    };
    let trimmed = without_comment.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(trimmed)
        .to_string()
}
