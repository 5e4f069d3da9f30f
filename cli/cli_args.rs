use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        help = "Specify the target project directory (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify path/filename of the TOML config file (default: .amalgam/amalgam.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config",
        help_heading = "Project Setup"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config",
        help_heading = "Project Setup"
    )]
    pub no_config: bool,

    #[arg(
        long,
        help = "Do not read the module manifest; no import is treated as internal.",
        help_heading = "Project Setup"
    )]
    pub no_manifest: bool,

    #[arg(
        long,
        env = "AMALGAM_MODEL",
        value_name = "MODEL",
        help = "Model whose tokenizer counts the bundle (default: gpt-4).",
        help_heading = "Project Setup"
    )]
    pub model: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FormatOutputOpts {
    #[arg(short = 'f', long, help = "Set the output format.", value_name = "FORMAT", value_parser = ["text", "json", "yaml"], help_heading = "Output Formatting")]
    pub format: Option<String>,

    #[arg(
        long,
        help = "Pretty-print JSON output.",
        help_heading = "Output Formatting"
    )]
    pub pretty: bool,
}

#[derive(Parser, Debug)]
#[command(
    name = "amalgam",
    author,
    version,
    about = "Bundle a project's sources into one dependency-ordered document.",
    long_about = "amalgam walks a project, selects source files by name and extension, \norders them so that imported packages precede their importers, and \nreports the token count of the result for a language model.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  amalgam bundle --save ./amalgam.txt\n  amalgam bundle -f json --pretty\n  amalgam files\n  amalgam config",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "b",
        about = "Render the bundle and report its token count."
    )]
    Bundle(BundleArgs),

    #[command(
        visible_alias = "f",
        about = "List the selected files in bundle order with their imports."
    )]
    Files(FilesArgs),

    #[command(about = "Show or save the default configuration file structure.")]
    Config(ConfigArgs),

    #[command(about = "Generate or save shell completion scripts.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BundleArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,

    #[arg(
        short = 's',
        long,
        value_name = "PATH",
        help_heading = "Output Control",
        help = "Write the output to PATH instead of standard output."
    )]
    pub save: Option<PathBuf>,

    #[arg(
        long,
        help_heading = "Output Control",
        help = "Encode the model's control sequences (e.g. <|endoftext|>) as special tokens."
    )]
    pub allow_special_tokens: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FilesArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_name = "SHELL",
        help = "Shell to generate completions for (fish, bash, zsh) [default: fish]"
    )]
    pub shell: Option<String>,
    #[arg(
        long,
        help = "Save completion script to default location (prompts overwrite)."
    )]
    pub save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        long,
        help = "Specify the target project directory (default: current dir).",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,
    #[arg(
        long,
        help = "Save default config structure to default path (prompts overwrite)."
    )]
    pub save: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_bundle_options() {
        let cli = Cli::try_parse_from([
            "amalgam",
            "bundle",
            "--project-root",
            "/tmp/project",
            "--no-manifest",
            "--model",
            "gpt-4",
            "-f",
            "json",
            "--save",
            "out.json",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Bundle(args)) => {
                assert_eq!(
                    args.project_config.project_root,
                    Some(PathBuf::from("/tmp/project"))
                );
                assert!(args.project_config.no_manifest);
                assert_eq!(args.project_config.model.as_deref(), Some("gpt-4"));
                assert_eq!(args.format_output.format.as_deref(), Some("json"));
                assert_eq!(args.save, Some(PathBuf::from("out.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_and_no_config_conflict() {
        let result = Cli::try_parse_from(["amalgam", "files", "--config", "x", "--no-config"]);
        assert!(result.is_err());
    }
}
