use crate::cli_args::ConfigArgs;
use crate::output::{write_to_file, write_to_stdout};
use amalgam_core::Config;
use amalgam_core::config::{DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME};
use anyhow::{Context, Result};
use colored::*;
use std::io::{self, Write};
use std::path::Path;

pub fn handle_config_command(args: &ConfigArgs, project_root: &Path, quiet: bool) -> Result<()> {
    let default_toml = Config::default_toml().context("Failed to render default configuration")?;

    if !args.save {
        return write_to_stdout(&default_toml);
    }

    let save_path = project_root
        .join(DEFAULT_CONFIG_DIR)
        .join(DEFAULT_CONFIG_FILENAME);

    if save_path.exists() {
        if quiet {
            anyhow::bail!(
                "Target file '{}' exists. Overwrite prevented in quiet mode.",
                save_path.display()
            );
        }
        print!(
            "{} Config file already exists at '{}'. Overwrite? [{}/{}] ",
            "⚠️".yellow(),
            save_path.display().to_string().cyan(),
            "y".green(),
            "N".red()
        );
        io::stdout().flush().context("Failed to flush stdout")?;
        let mut response = String::new();
        io::stdin()
            .read_line(&mut response)
            .context("Failed to read user input")?;
        if !response.trim().eq_ignore_ascii_case("y") {
            println!("Save cancelled.");
            return Ok(());
        }
    }

    write_to_file(&save_path, &default_toml)?;
    log::info!("Default configuration written to {}", save_path.display());
    if !quiet {
        println!(
            "{} Default config saved to: {}",
            "✅".green(),
            save_path.display().to_string().blue()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn save_writes_loadable_default_config() {
        let dir = tempdir().unwrap();
        let args = ConfigArgs {
            project_root: None,
            save: true,
        };
        handle_config_command(&args, dir.path(), true).unwrap();

        let saved = dir
            .path()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILENAME);
        let loaded = Config::load_from_path(&saved).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn quiet_save_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join(DEFAULT_CONFIG_DIR);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(DEFAULT_CONFIG_FILENAME), "# mine\n").unwrap();

        let args = ConfigArgs {
            project_root: None,
            save: true,
        };
        assert!(handle_config_command(&args, dir.path(), true).is_err());
        assert_eq!(
            fs::read_to_string(config_dir.join(DEFAULT_CONFIG_FILENAME)).unwrap(),
            "# mine\n"
        );
    }
}
