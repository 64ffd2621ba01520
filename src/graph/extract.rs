//! Reference extraction
//!
//! Pure functions that read typed references out of a resource's content,
//! dispatched on the resource type. Types without an extractor emit nothing.

use crate::models::{Reference, ReferenceKind, Resource, ResourceType, resource_key};

pub const ORIGIN_FLUX_PATH: &str = "flux-kustomization-path";
pub const ORIGIN_FLUX_SOURCE: &str = "flux-source";
pub const ORIGIN_KUSTOMIZATION_RESOURCE: &str = "kustomization-resource";
pub const ORIGIN_KUSTOMIZATION_PATCH: &str = "kustomization-patch";
pub const ORIGIN_KUSTOMIZATION_PATCH_STRATEGIC: &str = "kustomization-patch-strategic";
pub const ORIGIN_HELM_CHART: &str = "helm-chart";
pub const ORIGIN_HELM_SOURCE: &str = "helm-source";

/// Extract every reference `resource` emits, in field order
pub fn extract_references(resource: &Resource) -> Vec<Reference> {
    match resource.resource_type {
        ResourceType::FluxKustomization => flux_kustomization_references(resource),
        ResourceType::KubernetesKustomization => kustomization_references(resource),
        ResourceType::HelmRelease => helm_release_references(resource),
        _ => Vec::new(),
    }
}

fn reference(resource: &Resource, kind: ReferenceKind, origin: &'static str, target: &str) -> Reference {
    Reference::new(
        kind,
        origin,
        resource.name.clone(),
        resource.file.clone(),
        resource.line,
        target,
    )
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Name-lookup target, qualified with an explicit namespace when one is given
fn source_ref_target(resource: &Resource, path: &[&str]) -> Option<String> {
    let mut name_path = path.to_vec();
    name_path.push("name");
    let name = resource.content.str_at(&name_path).ok()?;
    if name.is_empty() {
        return None;
    }

    let mut namespace_path = path.to_vec();
    namespace_path.push("namespace");
    let namespace = resource.content.str_or_empty(&namespace_path);
    Some(resource_key(namespace, name))
}

fn flux_kustomization_references(resource: &Resource) -> Vec<Reference> {
    let mut refs = Vec::new();

    // Flux paths are relative to the repository root
    if let Some(path) = non_empty(resource.content.str_at(&["spec", "path"]).ok()) {
        refs.push(
            reference(resource, ReferenceKind::Path, ORIGIN_FLUX_PATH, path)
                .relative_to_owner_file(false),
        );
    }

    if let Some(target) = source_ref_target(resource, &["spec", "sourceRef"]) {
        refs.push(reference(
            resource,
            ReferenceKind::NameLookup,
            ORIGIN_FLUX_SOURCE,
            &target,
        ));
    }

    refs
}

fn kustomization_references(resource: &Resource) -> Vec<Reference> {
    let content = &resource.content;
    let mut refs = Vec::new();

    // Kustomize paths are relative to the kustomization file
    let mut push_path = |origin: &'static str, target: &str| {
        if !target.is_empty() {
            refs.push(
                reference(resource, ReferenceKind::Path, origin, target)
                    .relative_to_owner_file(true),
            );
        }
    };

    for target in content.str_list_at(&["resources"]).unwrap_or_default() {
        push_path(ORIGIN_KUSTOMIZATION_RESOURCE, target);
    }

    if let Ok(patches) = content.seq_at(&["patches"]) {
        for patch in patches {
            if let Some(path) = patch.get("path").and_then(|p| p.as_str()) {
                push_path(ORIGIN_KUSTOMIZATION_PATCH, path);
            }
        }
    }

    for target in content
        .str_list_at(&["patchesStrategicMerge"])
        .unwrap_or_default()
    {
        push_path(ORIGIN_KUSTOMIZATION_PATCH_STRATEGIC, target);
    }

    refs
}

fn helm_release_references(resource: &Resource) -> Vec<Reference> {
    let mut refs = Vec::new();

    if let Some(chart) = non_empty(resource.content.str_at(&["spec", "chart", "spec", "chart"]).ok()) {
        refs.push(reference(resource, ReferenceKind::Chart, ORIGIN_HELM_CHART, chart));
    }

    if let Some(target) = source_ref_target(resource, &["spec", "chart", "spec", "sourceRef"]) {
        refs.push(reference(
            resource,
            ReferenceKind::NameLookup,
            ORIGIN_HELM_SOURCE,
            &target,
        ));
    }

    // helm-controller v2 chartRef points at an OCIRepository or HelmChart
    if let Some(target) = source_ref_target(resource, &["spec", "chartRef"]) {
        refs.push(reference(
            resource,
            ReferenceKind::NameLookup,
            ORIGIN_HELM_SOURCE,
            &target,
        ));
    }

    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Content;

    fn resource(file: &str, yaml: &str) -> Resource {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        let content = Content::new(value);
        Resource::new(
            content.str_or_empty(&["apiVersion"]).to_string(),
            content.str_or_empty(&["kind"]).to_string(),
            content.str_or_empty(&["metadata", "name"]).to_string(),
            content.str_or_empty(&["metadata", "namespace"]).to_string(),
            file,
            1,
            content,
        )
    }

    #[test]
    fn test_flux_kustomization() {
        let r = resource(
            "/repo/clusters/flux-system.yaml",
            r#"
apiVersion: kustomize.toolkit.fluxcd.io/v1
kind: Kustomization
metadata:
  name: apps
  namespace: flux-system
spec:
  path: ./apps/prod
  sourceRef:
    kind: GitRepository
    name: flux-system
"#,
        );
        let refs = extract_references(&r);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].kind, ReferenceKind::Path);
        assert_eq!(refs[0].origin, ORIGIN_FLUX_PATH);
        assert_eq!(refs[0].target, "./apps/prod");
        assert!(!refs[0].relative_to_owner_file);
        assert_eq!(refs[1].kind, ReferenceKind::NameLookup);
        assert_eq!(refs[1].target, "flux-system");
    }

    #[test]
    fn test_source_ref_namespace_qualifies_target() {
        let r = resource(
            "/repo/apps.yaml",
            r#"
apiVersion: kustomize.toolkit.fluxcd.io/v1
kind: Kustomization
metadata:
  name: apps
spec:
  sourceRef:
    kind: GitRepository
    name: shared
    namespace: sources
"#,
        );
        let refs = extract_references(&r);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target, "sources/shared");
    }

    #[test]
    fn test_kustomization_lists() {
        let r = resource(
            "/repo/base/kustomization.yaml",
            r#"
apiVersion: kustomize.config.k8s.io/v1beta1
kind: Kustomization
resources:
  - ./ns.yaml
  - ../common
patches:
  - path: patch.yaml
  - patch: |-
      inline
patchesStrategicMerge:
  - merge.yaml
"#,
        );
        let refs = extract_references(&r);
        let targets: Vec<_> = refs.iter().map(|r| (r.origin, r.target.as_str())).collect();
        assert_eq!(
            targets,
            vec![
                (ORIGIN_KUSTOMIZATION_RESOURCE, "./ns.yaml"),
                (ORIGIN_KUSTOMIZATION_RESOURCE, "../common"),
                (ORIGIN_KUSTOMIZATION_PATCH, "patch.yaml"),
                (ORIGIN_KUSTOMIZATION_PATCH_STRATEGIC, "merge.yaml"),
            ]
        );
        assert!(refs.iter().all(|r| r.relative_to_owner_file));
    }

    #[test]
    fn test_helm_release() {
        let r = resource(
            "/repo/apps/podinfo.yaml",
            r#"
apiVersion: helm.toolkit.fluxcd.io/v2
kind: HelmRelease
metadata:
  name: podinfo
  namespace: apps
spec:
  chart:
    spec:
      chart: podinfo
      sourceRef:
        kind: HelmRepository
        name: podinfo
"#,
        );
        let refs = extract_references(&r);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].kind, ReferenceKind::Chart);
        assert_eq!(refs[1].kind, ReferenceKind::NameLookup);
        assert_eq!(refs[1].origin, ORIGIN_HELM_SOURCE);
    }

    #[test]
    fn test_plain_resource_has_no_references() {
        let r = resource(
            "/repo/cm.yaml",
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cfg\n",
        );
        assert!(extract_references(&r).is_empty());
    }
}
