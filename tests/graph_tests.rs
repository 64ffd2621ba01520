//! Resource graph tests
//!
//! Builds graphs from repositories on disk and checks reference resolution,
//! key collisions and the query surface.

use std::path::Path;

use gitops_validator::graph::ResourceGraph;
use gitops_validator::loader;
use gitops_validator::{Config, ReferenceKind, ResourceType};
use tempfile::TempDir;

fn write_repo(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, contents) in files {
        let full = dir.path().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, contents).unwrap();
    }
    dir
}

fn build(root: &Path) -> ResourceGraph {
    let loaded = loader::load_repository(root, &Config::default()).unwrap();
    ResourceGraph::from_loaded(root, loaded)
}

const FLUX_APPS: &str = r#"apiVersion: kustomize.toolkit.fluxcd.io/v1
kind: Kustomization
metadata:
  name: apps
  namespace: flux-system
spec:
  path: ./apps/web
  sourceRef:
    kind: GitRepository
    name: flux-repo
"#;

const SOURCE: &str = r#"apiVersion: source.toolkit.fluxcd.io/v1
kind: GitRepository
metadata:
  name: flux-repo
  namespace: flux-system
spec:
  url: https://example.com/repo.git
"#;

fn config_map(name: &str) -> String {
    format!("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {}\n  namespace: default\n", name)
}

fn sample_repo() -> TempDir {
    write_repo(&[
        ("clusters/apps.yaml", FLUX_APPS),
        // Sorts after the Flux Kustomization that references it
        ("zz-sources/source.yaml", SOURCE),
        (
            "apps/web/kustomization.yaml",
            "resources:\n  - deployment.yaml\n  - ../common/cm.yaml\n  - https://example.com/remote.yaml\n",
        ),
        (
            "apps/web/deployment.yaml",
            "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n  namespace: default\n",
        ),
        ("apps/common/cm.yaml", &config_map("shared")),
    ])
}

#[test]
fn test_forward_references_resolve() {
    let repo = sample_repo();
    let graph = build(repo.path());

    let apps = graph.get("flux-system/apps").unwrap();
    let source_ref = apps
        .dependencies
        .iter()
        .find(|r| r.kind == ReferenceKind::NameLookup)
        .unwrap();
    let target = graph.resource(source_ref.resolved.unwrap());
    assert_eq!(target.key(), "flux-system/flux-repo");
    assert_eq!(target.resource_type, ResourceType::FluxSource);
}

#[test]
fn test_flux_paths_resolve_from_repository_root() {
    let repo = sample_repo();
    let graph = build(repo.path());

    let apps = graph.get("flux-system/apps").unwrap();
    let path_ref = apps
        .dependencies
        .iter()
        .find(|r| r.kind == ReferenceKind::Path)
        .unwrap();
    let target = graph.resource(path_ref.resolved.unwrap());
    assert_eq!(graph.relative_path(&target.file), "apps/web/kustomization.yaml");
    assert_eq!(target.resource_type, ResourceType::KubernetesKustomization);
}

#[test]
fn test_kustomize_paths_resolve_from_owning_file() {
    let repo = sample_repo();
    let graph = build(repo.path());

    let kustomization = graph.get("apps/web/kustomization.yaml").unwrap();
    let targets: Vec<String> = kustomization
        .dependencies
        .iter()
        .filter_map(|r| r.resolved)
        .map(|id| graph.resource(id).key())
        .collect();
    assert_eq!(targets, vec!["default/web", "default/shared"]);

    // Remote entries are kept but never resolved locally
    let remote = kustomization
        .dependencies
        .iter()
        .find(|r| r.target.starts_with("https://"))
        .unwrap();
    assert!(remote.resolved.is_none());
    assert!(remote.resolved_path.is_none());
}

#[test]
fn test_reverse_edges() {
    let repo = sample_repo();
    let graph = build(repo.path());

    let shared = graph.get("default/shared").unwrap();
    assert_eq!(shared.referenced_by.len(), 1);
    assert_eq!(
        graph.relative_path(&shared.referenced_by[0].file),
        "apps/web/kustomization.yaml"
    );

    let dependents = graph.dependents(&shared.file);
    assert_eq!(dependents.len(), 1);
    assert_eq!(graph.relative_path(&dependents[0]), "apps/web/kustomization.yaml");
}

#[test]
fn test_build_is_idempotent() {
    let repo = sample_repo();
    let first = build(repo.path());
    let second = build(repo.path());

    assert_eq!(first.edge_set(), second.edge_set());
    assert_eq!(first.stats(), second.stats());
    assert_eq!(first.edge_set().len(), 4);
}

#[test]
fn test_stats() {
    let repo = sample_repo();
    let stats = build(repo.path()).stats();

    assert_eq!(stats.resources, 5);
    assert_eq!(stats.files, 5);
    assert_eq!(stats.resolved_references, 4);
    assert_eq!(stats.unresolved_references, 1);
    assert_eq!(stats.by_type.get("flux-kustomization"), Some(&1));
    assert_eq!(stats.by_type.get("kubernetes-resource"), Some(&2));
}

#[test]
fn test_key_collision_keeps_later_resource() {
    let repo = write_repo(&[("a.yaml", &config_map("cm")), ("b.yaml", &config_map("cm"))]);
    let graph = build(repo.path());

    assert_eq!(graph.resource_count(), 1);
    let kept = graph.get("default/cm").unwrap();
    assert_eq!(graph.relative_path(&kept.file), "b.yaml");
    assert_eq!(graph.by_kind("ConfigMap").len(), 1);
}

#[test]
fn test_query_surface() {
    let repo = sample_repo();
    let graph = build(repo.path());

    assert_eq!(graph.by_kind("Deployment").len(), 1);
    assert_eq!(graph.by_api_version_kind("apps/v1", "Deployment").len(), 1);
    assert_eq!(graph.by_namespace("flux-system").len(), 2);
    assert_eq!(graph.flux_kustomizations().len(), 1);
    assert_eq!(graph.kubernetes_kustomizations().len(), 1);
    assert_eq!(graph.flux_sources().len(), 1);
    assert_eq!(graph.in_directory("apps").len(), 3);
    assert_eq!(graph.in_directory("apps/web").len(), 2);
    assert_eq!(graph.by_file(Path::new("apps/common/cm.yaml")).len(), 1);

    let matched = graph.matching_pattern("apps/*/*.yaml").unwrap();
    assert_eq!(matched.len(), 3);
    // `*` stays inside one directory level
    assert!(graph.matching_pattern("apps/*").unwrap().is_empty());
    assert!(graph.matching_pattern("apps/[").is_err());
}

#[test]
fn test_multi_document_files() {
    let repo = write_repo(&[(
        "bundle.yaml",
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: one\n---\n# comment\n---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: two\n",
    )]);
    let graph = build(repo.path());

    assert_eq!(graph.resource_count(), 2);
    assert_eq!(graph.get("one").unwrap().line, 1);
    assert_eq!(graph.get("two").unwrap().line, 8);
    assert_eq!(graph.file_count(), 1);
}

#[test]
fn test_unparseable_file_becomes_warning() {
    let repo = write_repo(&[
        ("broken.yaml", "apiVersion: v1\nkind: [unclosed\n"),
        ("ok.yaml", &config_map("ok")),
    ]);
    let graph = build(repo.path());

    assert_eq!(graph.resource_count(), 1);
    assert_eq!(graph.load_warnings().len(), 1);
    assert!(graph.load_warnings()[0].file.ends_with("broken.yaml"));
}
