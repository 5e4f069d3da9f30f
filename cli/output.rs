use amalgam_core::output_formats;
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::cli_args::FormatOutputOpts;

pub fn selected_format(format_opts: &FormatOutputOpts) -> String {
    format_opts
        .format
        .as_deref()
        .unwrap_or("text")
        .to_lowercase()
}

pub fn print_or_save(content: &str, output_path: Option<&Path>, quiet: bool) -> Result<()> {
    match output_path {
        Some(path) => {
            write_to_file(path, content)?;
            if !quiet {
                eprintln!(
                    "{} Output saved to: {}",
                    "✅".green(),
                    path.display().to_string().blue()
                );
            }
        }
        None => write_to_stdout(content)?,
    }
    Ok(())
}

pub fn serialize_output<T: Serialize>(data: &T, format: &str, pretty_json: bool) -> Result<String> {
    match format {
        "yaml" | "yml" => output_formats::serialize_to_yaml(data).map_err(anyhow::Error::from),
        _ => output_formats::serialize_to_json(data, pretty_json).map_err(anyhow::Error::from),
    }
}

pub fn write_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to file {}", path.display()))?;
    Ok(())
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_to_file_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested").join("out.txt");
        write_to_file(&target, "bundle").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "bundle");
    }

    #[test]
    fn format_defaults_to_text() {
        assert_eq!(selected_format(&FormatOutputOpts::default()), "text");
        let opts = FormatOutputOpts {
            format: Some("YAML".to_string()),
            pretty: false,
        };
        assert_eq!(selected_format(&opts), "yaml");
    }

    #[test]
    fn serializes_to_requested_format() {
        #[derive(Serialize)]
        struct Row {
            path: &'static str,
        }
        let row = Row { path: "main.go" };
        assert_eq!(serialize_output(&row, "json", false).unwrap(), r#"{"path":"main.go"}"#);
        assert_eq!(serialize_output(&row, "yaml", false).unwrap(), "path: main.go\n");
    }
}
