use crate::cli_args::FilesArgs;
use crate::load_config_for_command;
use crate::output::{selected_format, serialize_output, write_to_stdout};
use amalgam_core::{Bundler, Config, FileRecord, TiktokenCounter, TokenCounter};
use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use colored::*;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FileRow {
    position: usize,
    path: String,
    package_name: String,
    internal_imports: Vec<String>,
    bytes: usize,
    #[serde(skip)]
    bytes_readable: String,
    tokens: Option<usize>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FileListing {
    module_name: Option<String>,
    model: String,
    files: Vec<FileRow>,
}

pub fn handle_files_command(args: FilesArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(&project_root, &args.project_config)
        .context("Failed to load configuration for files command")?;
    let counter = TiktokenCounter::from_config(&config.tokenizer)?;
    let bundler = Bundler::new(&config, &counter);
    let (module_name, records) = bundler.plan(&project_root)?;

    let listing = FileListing {
        module_name,
        model: counter.model().to_string(),
        files: records
            .iter()
            .enumerate()
            .map(|(idx, record)| file_row(idx + 1, record, &counter))
            .collect(),
    };

    match selected_format(&args.format_output).as_str() {
        "text" => print_files_table(&listing, quiet),
        other => {
            let content = serialize_output(&listing, other, args.format_output.pretty)?;
            write_to_stdout(&content)
        }
    }
}

fn file_row(position: usize, record: &FileRecord, counter: &dyn TokenCounter) -> FileRow {
    let bytes = record.content.len();
    let bytes_readable = Byte::from_u128(bytes as u128)
        .unwrap_or_default()
        .get_appropriate_unit(UnitType::Binary)
        .to_string();
    let tokens = match counter.count_tokens(&record.content) {
        Ok(count) => Some(count),
        Err(e) => {
            log::warn!("Could not count tokens for {}: {}", record.path, e);
            None
        }
    };
    FileRow {
        position,
        path: record.path.clone(),
        package_name: record.package_name.clone(),
        internal_imports: record.internal_imports.clone(),
        bytes,
        bytes_readable,
        tokens,
    }
}

fn print_files_table(listing: &FileListing, quiet: bool) -> Result<()> {
    if listing.files.is_empty() {
        if !quiet {
            println!("{}", "(No files selected)".yellow());
        }
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::Green),
        Cell::new("Path").fg(Color::Green),
        Cell::new("Package").fg(Color::Green),
        Cell::new("Internal Imports").fg(Color::Green),
        Cell::new("Size").fg(Color::Green),
        Cell::new("Tokens").fg(Color::Green),
    ]);
    for row in &listing.files {
        let tokens = row
            .tokens
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(row.position).set_alignment(CellAlignment::Right),
            Cell::new(&row.path).fg(Color::Cyan),
            Cell::new(&row.package_name),
            Cell::new(row.internal_imports.join("\n")).fg(Color::DarkGrey),
            Cell::new(&row.bytes_readable)
                .set_alignment(CellAlignment::Right)
                .fg(Color::DarkGrey),
            Cell::new(tokens).set_alignment(CellAlignment::Right),
        ]);
    }

    if !quiet {
        match &listing.module_name {
            Some(module) => println!("{} {}", "Module:".green(), module.cyan()),
            None => println!("{} {}", "Module:".green(), "(manifest disabled)".dimmed()),
        }
    }
    println!("{table}");
    Ok(())
}
