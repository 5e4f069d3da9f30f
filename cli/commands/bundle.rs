use crate::cli_args::BundleArgs;
use crate::load_config_for_command;
use crate::output::{print_or_save, selected_format, serialize_output};
use amalgam_core::{Bundle, BundleReport, Bundler, Config, TiktokenCounter, TokenCounter};
use anyhow::{Context, Result};
use colored::*;

pub fn handle_bundle_command(args: BundleArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let mut config = load_config_for_command(&project_root, &args.project_config)
        .context("Failed to load configuration for bundle command")?;
    if args.allow_special_tokens {
        config.tokenizer.allow_special_tokens = true;
    }

    let counter = TiktokenCounter::from_config(&config.tokenizer)?;
    let bundler = Bundler::new(&config, &counter);
    let bundle = bundler.bundle(&project_root)?;
    log::info!(
        "Bundled {} files from {}",
        bundle.files.len(),
        project_root.display()
    );

    let format = selected_format(&args.format_output);
    let content = match format.as_str() {
        "text" => bundle.content.clone(),
        other => {
            let report = BundleReport::from_bundle(&bundle, counter.model());
            serialize_output(&report, other, args.format_output.pretty)?
        }
    };
    print_or_save(&content, args.save.as_deref(), quiet)?;

    report_token_count(bundle, counter.model(), quiet)
}

fn report_token_count(bundle: Bundle, model: &str, quiet: bool) -> Result<()> {
    let file_count = bundle.files.len();
    match bundle.tokens {
        Ok(count) => {
            if !quiet {
                eprintln!(
                    "{} {} files, {} tokens ({})",
                    "📦".blue(),
                    file_count.to_string().cyan(),
                    count.to_string().green().bold(),
                    model.dimmed()
                );
            }
            Ok(())
        }
        Err(e) => {
            log::warn!("Token count unavailable for {} files", file_count);
            Err(e.into())
        }
    }
}
