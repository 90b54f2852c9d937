use serde_json::json;
use skelly::error::Error;
use skelly::loader::{resolve_repository, Source, SourceOptions};
use skelly::skeleton::{compose_skeletons, FileSource, ResolvedSkeleton, SkeletonLoader};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use test_log::test;

mod utils;
use utils::write_skeleton;

fn load(repository: &Path, name: &str) -> skelly::error::Result<ResolvedSkeleton> {
    let options = SourceOptions::new(repository.join(".cache"));
    let resolver =
        resolve_repository([("local", repository.display().to_string())], &options)?;
    SkeletonLoader::new(options).load(&resolver.resolve(name)?)
}

fn disk_source(skeleton: &ResolvedSkeleton, path: &str) -> PathBuf {
    match &skeleton.file(path).unwrap().source {
        FileSource::Disk(source) => source.clone(),
        FileSource::Generated(_) => panic!("expected a file on disk"),
    }
}

#[test]
fn three_level_chain_resolves_each_path_to_nearest_definition() {
    let repo = TempDir::new().unwrap();
    write_skeleton(
        repo.path(),
        "base",
        "description: Base\nvalues:\n  ci: {provider: github, lint: true}\n  name: base\n",
        &[("README.md", "base"), ("ci/pipeline.yml", "base"), (".editorconfig", "base")],
    );
    write_skeleton(
        repo.path(),
        "go",
        "description: Go\nparent:\n  skeletonName: base\nvalues:\n  ci: {lint: false}\n",
        &[("README.md", "go"), ("go.mod.skel", "module {{ values.name }}")],
    );
    write_skeleton(
        repo.path(),
        "go/service",
        "description: Go service\nparent:\n  skeletonName: go\nvalues:\n  name: service\n",
        &[("ci/pipeline.yml", "service"), ("cmd/main.go", "package main")],
    );

    let skeleton = load(repo.path(), "go/service").unwrap();
    assert_eq!(skeleton.description(), "Go service");
    assert_eq!(skeleton.reference().name, "go/service");
    assert_eq!(
        serde_json::Value::Object(skeleton.values().clone()),
        json!({"ci": {"provider": "github", "lint": false}, "name": "service"})
    );

    let skeletons = repo.path().join("skeletons");
    assert_eq!(disk_source(&skeleton, "README.md"), skeletons.join("go/README.md"));
    assert_eq!(
        disk_source(&skeleton, "ci/pipeline.yml"),
        skeletons.join("go/service/ci/pipeline.yml")
    );
    assert_eq!(disk_source(&skeleton, ".editorconfig"), skeletons.join("base/.editorconfig"));

    assert!(skeleton.file("README.md").unwrap().inherited);
    assert!(!skeleton.file("cmd/main.go").unwrap().inherited);
    assert!(!skeleton.file("ci/pipeline.yml").unwrap().inherited);

    let ancestors: Vec<_> =
        skeleton.ancestors().map(|s| s.reference().name.clone()).collect();
    assert_eq!(ancestors, ["go", "base"]);
}

#[test]
fn nested_skeleton_directories_are_part_of_the_parent_skeleton() {
    let repo = TempDir::new().unwrap();
    write_skeleton(repo.path(), "go", "", &[("go.mod", "")]);
    write_skeleton(repo.path(), "go/service", "", &[("main.go", "")]);

    let skeleton = load(repo.path(), "go").unwrap();
    assert!(skeleton.file("service/main.go").is_some());
    assert!(skeleton.file("service/skeleton.yaml").is_some());
    assert!(skeleton.file("skeleton.yaml").is_none());
}

#[test]
fn two_skeleton_cycle_is_detected() {
    let repo = TempDir::new().unwrap();
    write_skeleton(repo.path(), "a", "parent:\n  skeletonName: b\n", &[]);
    write_skeleton(repo.path(), "b", "parent:\n  skeletonName: a\n", &[]);

    match load(repo.path(), "a") {
        Err(Error::DependencyCycle { name, .. }) => assert_eq!(name, "a"),
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn same_name_in_another_repository_is_not_a_cycle() {
    let dir = TempDir::new().unwrap();
    let upstream = dir.path().join("upstream");
    let team = dir.path().join("team");
    write_skeleton(&upstream, "base", "values: {origin: upstream}\n", &[("UPSTREAM", "")]);
    write_skeleton(
        &team,
        "base",
        &format!(
            "parent:\n  skeletonName: base\n  repositoryURL: {}\n",
            upstream.display()
        ),
        &[("TEAM", "")],
    );

    let skeleton = load(&team, "base").unwrap();
    assert!(skeleton.file("UPSTREAM").unwrap().inherited);
    assert!(skeleton.file("TEAM").is_some());
    assert_eq!(skeleton.values()["origin"], "upstream");
}

#[test]
fn composition_layers_independent_skeletons() {
    let repo = TempDir::new().unwrap();
    write_skeleton(repo.path(), "go", "values: {lang: go, ci: {lint: true}}\n", &[
        ("main.go", "go"),
        ("Makefile", "go"),
    ]);
    write_skeleton(repo.path(), "docker", "values: {ci: {docker: true}}\n", &[
        ("Dockerfile", "docker"),
        ("Makefile", "docker"),
    ]);

    let composed = compose_skeletons(vec![
        load(repo.path(), "go").unwrap(),
        load(repo.path(), "docker").unwrap(),
    ])
    .unwrap();

    assert_eq!(
        serde_json::Value::Object(composed.values().clone()),
        json!({"lang": "go", "ci": {"lint": true, "docker": true}})
    );
    assert_eq!(
        disk_source(&composed, "Makefile"),
        repo.path().join("skeletons/docker/Makefile")
    );
    assert!(composed.file("main.go").unwrap().inherited);
    assert_eq!(composed.reference().name, "docker");
}

#[test]
fn resolver_lists_across_repositories() {
    let dir = TempDir::new().unwrap();
    let alpha = dir.path().join("alpha");
    let beta = dir.path().join("beta");
    write_skeleton(&alpha, "web", "", &[]);
    write_skeleton(&beta, "cli", "", &[]);
    write_skeleton(&beta, "web", "", &[]);

    let options = SourceOptions::new(dir.path().join("cache"));
    let resolver = resolve_repository(
        [("beta", beta.display().to_string()), ("alpha", alpha.display().to_string())],
        &options,
    )
    .unwrap();

    let listed: Vec<_> = resolver.list().unwrap().iter().map(|s| s.qualified_name()).collect();
    assert_eq!(listed, ["alpha:web", "beta:cli", "beta:web"]);
    assert!(matches!(resolver.resolve("web"), Err(Error::AmbiguousSkeleton { .. })));
    assert_eq!(resolver.resolve("cli").unwrap().qualified_name(), "beta:cli");
}
