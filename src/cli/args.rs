use crate::constants::{exit_codes, verbosity};
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#;

/// skelly - materialize projects from layered skeleton repositories.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the skeletons of the configured repositories.
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Create a project from one or more skeletons.
    New(NewArgs),
}

/// Repositories to search and how remote ones are synchronized.
#[derive(clap::Args, Debug, Clone)]
pub struct RepositoryArgs {
    /// Repository as NAME=LOCATION; LOCATION is a directory or a git URL.
    #[arg(
        short = 'r',
        long = "repository",
        value_name = "NAME=LOCATION",
        value_parser = parse_repository,
        default_value = "default=."
    )]
    pub repositories: Vec<(String, String)>,

    /// Directory holding the git cache of remote repositories.
    #[arg(long = "cache-dir", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Abort git network operations after this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

/// Arguments for the list command.
#[derive(clap::Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub repositories: RepositoryArgs,
}

/// Arguments for the new command.
#[derive(clap::Args, Debug, Clone)]
pub struct NewArgs {
    /// Skeletons to compose, as NAME or REPOSITORY:NAME; later ones win.
    #[arg(value_name = "SKELETON", required = true, num_args = 1..)]
    pub skeletons: Vec<String>,

    /// Destination directory for generated files.
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Project name (defaults to the output directory name).
    #[arg(long)]
    pub name: Option<String>,

    /// Project owner, used by templates and license texts.
    #[arg(long)]
    pub owner: Option<String>,

    /// YAML file with values overriding the skeleton values.
    #[arg(long = "values", value_name = "FILE")]
    pub values_files: Vec<PathBuf>,

    /// Value override as KEY.PATH=VALUE, applied after value files.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub assignments: Vec<String>,

    /// Overwrite every existing file.
    #[arg(short, long)]
    pub force: bool,

    /// Existing path (or directory of paths) that may be overwritten.
    #[arg(long, value_name = "PATH")]
    pub overwrite: Vec<PathBuf>,

    /// Path (or directory of paths) that is never written.
    #[arg(long, value_name = "PATH")]
    pub skip: Vec<PathBuf>,

    /// License key exposed to templates as `license.key`.
    #[arg(long, value_name = "KEY")]
    pub license: Option<String>,

    /// Directory of `<KEY>.txt` license texts; writes LICENSE for `--license`.
    #[arg(long = "licenses-dir", value_name = "DIR", requires = "license")]
    pub licenses_dir: Option<PathBuf>,

    /// Gitignore templates to concatenate into .gitignore (comma-separated).
    #[arg(long, value_name = "KEY", value_delimiter = ',', requires = "gitignores_dir")]
    pub gitignore: Vec<String>,

    /// Directory of `<KEY>.gitignore` templates.
    #[arg(long = "gitignores-dir", value_name = "DIR")]
    pub gitignores_dir: Option<PathBuf>,

    /// Preview actions without touching the filesystem.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    #[command(flatten)]
    pub repositories: RepositoryArgs,
}

fn parse_repository(value: &str) -> Result<(String, String), String> {
    let (name, location) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=LOCATION, got '{value}'"))?;
    let (name, location) = (name.trim(), location.trim());
    if name.is_empty() || name.contains(':') {
        return Err(format!("invalid repository name '{name}'"));
    }
    if location.is_empty() {
        return Err(format!("repository '{name}' has no location"));
    }
    Ok((name.to_string(), location.to_string()))
}

/// Parse command line arguments, printing the help when required inputs are missing.
pub fn get_cli() -> Cli {
    Cli::try_parse().unwrap_or_else(|e| {
        if e.kind() == ErrorKind::MissingRequiredArgument
            || e.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        {
            let mut command = Cli::command().help_template(HELP_TEMPLATE);
            if let Err(print_err) = command.print_help() {
                eprintln!("Failed to display help information: {print_err}");
            } else {
                println!();
            }
            std::process::exit(exit_codes::FAILURE);
        } else {
            e.exit();
        }
    })
}

/// Map `-v` counts to the appropriate log level.
pub fn get_log_level_from_verbose(verbose_count: u8) -> LevelFilter {
    match verbose_count {
        verbosity::OFF => LevelFilter::Error,
        verbosity::INFO => LevelFilter::Info,
        verbosity::DEBUG => LevelFilter::Debug,
        verbosity::TRACE.. => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_verbose_flags_to_log_filters() {
        assert_eq!(get_log_level_from_verbose(verbosity::OFF), LevelFilter::Error);
        assert_eq!(get_log_level_from_verbose(verbosity::INFO), LevelFilter::Info);
        assert_eq!(get_log_level_from_verbose(verbosity::DEBUG), LevelFilter::Debug);
        assert_eq!(get_log_level_from_verbose(verbosity::TRACE), LevelFilter::Trace);
        assert_eq!(get_log_level_from_verbose(verbosity::TRACE + 1), LevelFilter::Trace);
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_new_with_several_skeletons() {
        let cli = Cli::parse_from([
            "skelly", "new", "base", "team:advanced", "out", "--set", "db.port=1", "-vv",
            "--skip", "docs", "--dry-run",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::New(args) = cli.command else { panic!("expected new") };
        assert_eq!(args.skeletons, ["base", "team:advanced"]);
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert_eq!(args.assignments, ["db.port=1"]);
        assert_eq!(args.skip, [PathBuf::from("docs")]);
        assert!(args.dry_run);
        assert_eq!(args.repositories.repositories, [("default".to_string(), ".".to_string())]);
    }

    #[test]
    fn parses_repositories() {
        let cli = Cli::parse_from([
            "skelly",
            "list",
            "-r",
            "local=./skeletons",
            "--repository",
            "remote=https://example.com/s.git?revision=v1",
            "--timeout",
            "30",
        ]);
        let Commands::List(args) = cli.command else { panic!("expected list") };
        assert_eq!(args.repositories.repositories.len(), 2);
        assert_eq!(args.repositories.repositories[1].1, "https://example.com/s.git?revision=v1");
        assert_eq!(args.repositories.timeout, Some(30));
    }

    #[test]
    fn rejects_malformed_repositories() {
        assert!(parse_repository("no-equals").is_err());
        assert!(parse_repository("=./x").is_err());
        assert!(parse_repository("a:b=./x").is_err());
        assert!(parse_repository("name=").is_err());
        assert_eq!(parse_repository("n = ./x").unwrap(), ("n".into(), "./x".into()));
    }
}
