use crate::{
    cancel::CancelToken,
    cli::{Cli, Commands, ListArgs, NewArgs, RepositoryArgs},
    config::SkeletonConfig,
    error::Result,
    ext::PathExt,
    extras::{gitignore_file, license_file, DirectoryTextProvider},
    fs::{MemoryFileSystem, OsFileSystem},
    loader::{default_cache_root, resolve_repository, Resolver, Source, SourceOptions},
    plan::{build_plan, PlanOptions, ProjectInfo},
    skeleton::{compose_skeletons, SkeletonLoader},
    values::collect_overrides,
};
use log::{debug, warn};
use std::time::Duration;

/// Runs the selected command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::List(args) => list(args),
        Commands::New(args) => new_project(args),
    }
}

fn source_options(args: &RepositoryArgs) -> SourceOptions {
    let cache_root = args.cache_dir.clone().unwrap_or_else(default_cache_root);
    let cancel = args
        .timeout
        .map(|seconds| CancelToken::with_timeout(Duration::from_secs(seconds)))
        .unwrap_or_default();
    debug!("Using cache '{}'", cache_root.display());
    SourceOptions::new(cache_root).with_cancel(cancel)
}

fn resolver(args: &RepositoryArgs, options: &SourceOptions) -> Result<Resolver> {
    resolve_repository(
        args.repositories.iter().map(|(name, location)| (name.clone(), location.as_str())),
        options,
    )
}

/// Prints every skeleton with its description.
fn list(args: ListArgs) -> Result<()> {
    let options = source_options(&args.repositories);
    let skeletons = resolver(&args.repositories, &options)?.list()?;
    if skeletons.is_empty() {
        println!("No skeletons found.");
        return Ok(());
    }

    let width = skeletons.iter().map(|s| s.qualified_name().len()).max().unwrap_or(0);
    for skeleton in skeletons {
        let description = match SkeletonConfig::load(&skeleton.path) {
            Ok(config) => config.description,
            Err(err) => {
                warn!("Cannot read '{}': {err}", skeleton.qualified_name());
                String::new()
            }
        };
        println!("{:width$}  {description}", skeleton.qualified_name());
    }
    Ok(())
}

/// Loads, composes, plans and applies the requested skeletons.
fn new_project(args: NewArgs) -> Result<()> {
    let options = source_options(&args.repositories);
    let resolver = resolver(&args.repositories, &options)?;
    let loader = SkeletonLoader::new(options);

    let mut loaded = Vec::with_capacity(args.skeletons.len());
    for name in &args.skeletons {
        loaded.push(loader.load(&resolver.resolve(name)?)?);
    }
    let skeleton = compose_skeletons(loaded)?;

    let project = ProjectInfo::new(project_name(&args)?, args.owner.clone().unwrap_or_default());
    let mut plan_options = PlanOptions::new(&args.output_dir, project.clone())
        .with_overrides(collect_overrides(&args.values_files, &args.assignments)?)
        .with_force_overwrite(args.force);
    plan_options.overwrite = args.overwrite.clone();
    plan_options.skip = args.skip.clone();

    if let Some(key) = &args.license {
        plan_options = plan_options.with_license(key);
        if let Some(dir) = &args.licenses_dir {
            let provider = DirectoryTextProvider::new(dir, ".txt");
            plan_options = plan_options.with_extra_file(license_file(&provider, key, &project)?);
        }
    }
    if let Some(dir) = &args.gitignores_dir {
        if !args.gitignore.is_empty() {
            let provider = DirectoryTextProvider::new(dir, ".gitignore");
            let gitignore = gitignore_file(&provider, &args.gitignore)?;
            plan_options = plan_options.with_extra_file(gitignore);
        }
    }

    let plan = build_plan(&skeleton, &plan_options, &OsFileSystem::new())?;
    let stats = if args.dry_run {
        for operation in plan.operations() {
            println!("[DRY RUN] {}", operation.message());
        }
        plan.apply(&mut MemoryFileSystem::new())?
    } else {
        plan.apply(&mut OsFileSystem::new())?
    };

    println!(
        "{}Created {} directories and {} files in {} ({} skipped).",
        if args.dry_run { "[DRY RUN] " } else { "" },
        stats.directories_created,
        stats.files_written,
        args.output_dir.display(),
        stats.skipped
    );
    Ok(())
}

/// The explicit name, or the last component of the output directory.
fn project_name(args: &NewArgs) -> Result<String> {
    if let Some(name) = &args.name {
        return Ok(name.clone());
    }
    let output_dir = std::path::absolute(&args.output_dir)?.clean();
    Ok(output_dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("project")
        .to_string())
}
