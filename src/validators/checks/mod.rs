//! Built-in rule checks
//!
//! One check per file. Each check reads the shared graph and reachability
//! results, honours its rule's `enabled` flag and takes its severity from the
//! rule configuration unless a table says otherwise.

mod broken_references;
mod deprecated_api;
mod double_references;
mod flux_kustomization;
mod flux_postbuild_variables;
mod kubernetes_kustomization;
mod orphaned_resources;
mod version_consistency;

use std::sync::Arc;

pub use broken_references::BrokenReferencesCheck;
pub use deprecated_api::DeprecatedApiCheck;
pub use double_references::DoubleReferencesCheck;
pub use flux_kustomization::FluxKustomizationCheck;
pub use flux_postbuild_variables::FluxPostBuildVariablesCheck;
pub use kubernetes_kustomization::KubernetesKustomizationCheck;
pub use orphaned_resources::OrphanedResourcesCheck;
pub use version_consistency::VersionConsistencyCheck;

use super::Check;
use crate::context::ValidationContext;
use crate::models::Resource;
use crate::results::{Finding, Severity};

/// Every built-in check, in default registration order
pub fn builtin_checks() -> Vec<Arc<dyn Check>> {
    vec![
        Arc::new(FluxKustomizationCheck),
        Arc::new(KubernetesKustomizationCheck),
        Arc::new(BrokenReferencesCheck),
        Arc::new(OrphanedResourcesCheck),
        Arc::new(DoubleReferencesCheck),
        Arc::new(DeprecatedApiCheck),
        Arc::new(FluxPostBuildVariablesCheck),
        Arc::new(VersionConsistencyCheck),
    ]
}

/// Finding located at `resource`
fn resource_finding(
    ctx: &ValidationContext,
    resource: &Resource,
    finding_type: &str,
    severity: Severity,
    message: String,
) -> Finding {
    Finding::new(finding_type, severity, message)
        .with_file(ctx.relative_path(&resource.file))
        .with_line(resource.line)
        .with_resource(resource.name.clone())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use crate::config::Config;
    use crate::context::ValidationContext;
    use crate::graph::ResourceGraph;
    use crate::loader;
    use crate::validators::DeprecationTable;

    /// Write `files` into a fresh repository
    pub fn write_repo(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        dir
    }

    pub fn context_with(root: &Path, config: Config) -> ValidationContext {
        let loaded = loader::load_repository(root, &config).unwrap();
        let graph = ResourceGraph::from_loaded(root, loaded);
        let deprecations = DeprecationTable::load(&config.deprecated_apis, None).unwrap();
        ValidationContext::new(graph, config, deprecations)
    }

    pub fn context(root: &Path) -> ValidationContext {
        context_with(root, Config::default())
    }
}
