//! Resource type classification
//!
//! Every decoded manifest is classified into one of a small closed set of
//! types. The type decides which reference extractor runs for a resource and
//! which entry-point selectors and charts treat it specially.

use std::fmt;
use std::str::FromStr;

/// API group prefixes recognised by the classifier
pub const FLUX_KUSTOMIZE_GROUP: &str = "kustomize.toolkit.fluxcd.io/";
pub const FLUX_HELM_GROUP: &str = "helm.toolkit.fluxcd.io/";
pub const FLUX_SOURCE_GROUP: &str = "source.toolkit.fluxcd.io/";
pub const FLUX_IMAGE_GROUP: &str = "image.toolkit.fluxcd.io/";
pub const FLUX_NOTIFICATION_GROUP: &str = "notification.toolkit.fluxcd.io/";
pub const KUSTOMIZE_CONFIG_GROUP: &str = "kustomize.config.k8s.io/";

/// Classification of a parsed resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    // Flux kustomize-controller
    FluxKustomization,
    // Plain kustomize (kustomization.yaml)
    KubernetesKustomization,
    // Flux helm-controller
    HelmRelease,
    // Flux source-controller
    FluxSource,
    // Flux image automation
    FluxImage,
    // Flux notification-controller
    FluxNotification,
    // Anything else
    KubernetesResource,
}

impl ResourceType {
    /// Get the kebab-case name used in configuration and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::FluxKustomization => "flux-kustomization",
            ResourceType::KubernetesKustomization => "kubernetes-kustomization",
            ResourceType::HelmRelease => "helm-release",
            ResourceType::FluxSource => "flux-source",
            ResourceType::FluxImage => "flux-image",
            ResourceType::FluxNotification => "flux-notification",
            ResourceType::KubernetesResource => "kubernetes-resource",
        }
    }

    /// Try to parse a string into a ResourceType, returning None if invalid
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Get all resource types
    pub fn all() -> &'static [Self] {
        &[
            ResourceType::FluxKustomization,
            ResourceType::KubernetesKustomization,
            ResourceType::HelmRelease,
            ResourceType::FluxSource,
            ResourceType::FluxImage,
            ResourceType::FluxNotification,
            ResourceType::KubernetesResource,
        ]
    }

    /// Classify a document by its apiVersion and kind
    ///
    /// `from_kustomization_file` marks documents decoded from a
    /// `kustomization.yaml`; kustomize allows those to omit apiVersion, so any
    /// non-Flux document there is treated as a kustomize Kustomization.
    pub fn classify(api_version: &str, kind: &str, from_kustomization_file: bool) -> Self {
        let in_group = |group: &str| api_version.starts_with(group);

        match kind {
            "Kustomization" if in_group(FLUX_KUSTOMIZE_GROUP) => ResourceType::FluxKustomization,
            "HelmRelease" if in_group(FLUX_HELM_GROUP) => ResourceType::HelmRelease,
            "GitRepository" | "HelmRepository" | "OCIRepository" | "Bucket"
                if in_group(FLUX_SOURCE_GROUP) =>
            {
                ResourceType::FluxSource
            }
            "ImageRepository" | "ImagePolicy" | "ImageUpdateAutomation"
                if in_group(FLUX_IMAGE_GROUP) =>
            {
                ResourceType::FluxImage
            }
            "Alert" | "Provider" | "Receiver" if in_group(FLUX_NOTIFICATION_GROUP) => {
                ResourceType::FluxNotification
            }
            "Kustomization" | "Component" if in_group(KUSTOMIZE_CONFIG_GROUP) => {
                ResourceType::KubernetesKustomization
            }
            _ if from_kustomization_file => ResourceType::KubernetesKustomization,
            _ => ResourceType::KubernetesResource,
        }
    }

    /// Whether this type belongs to one of the Flux controllers
    pub fn is_flux(&self) -> bool {
        !matches!(
            self,
            ResourceType::KubernetesKustomization | ResourceType::KubernetesResource
        )
    }

    /// Label with an icon, used by chart renderers
    pub fn icon_label(&self) -> &'static str {
        match self {
            ResourceType::FluxKustomization => "📁 flux-kustomization",
            ResourceType::KubernetesKustomization => "📁 kustomization",
            ResourceType::HelmRelease => "🚀 helm-release",
            ResourceType::FluxSource => "📦 flux-source",
            ResourceType::FluxImage => "🖼️ flux-image",
            ResourceType::FluxNotification => "🔔 flux-notification",
            ResourceType::KubernetesResource => "📄 kubernetes-resource",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ResourceType> for String {
    fn from(resource_type: ResourceType) -> Self {
        resource_type.as_str().to_string()
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flux-kustomization" => Ok(ResourceType::FluxKustomization),
            "kubernetes-kustomization" => Ok(ResourceType::KubernetesKustomization),
            "helm-release" => Ok(ResourceType::HelmRelease),
            // Entry-point configuration historically names sources by their most common kind
            "flux-source" | "git-repository" => Ok(ResourceType::FluxSource),
            "flux-image" => Ok(ResourceType::FluxImage),
            "flux-notification" => Ok(ResourceType::FluxNotification),
            "kubernetes-resource" => Ok(ResourceType::KubernetesResource),
            _ => Err(format!("Unknown resource type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_flux_kinds() {
        assert_eq!(
            ResourceType::classify("kustomize.toolkit.fluxcd.io/v1", "Kustomization", false),
            ResourceType::FluxKustomization
        );
        assert_eq!(
            ResourceType::classify("helm.toolkit.fluxcd.io/v2", "HelmRelease", false),
            ResourceType::HelmRelease
        );
        assert_eq!(
            ResourceType::classify("source.toolkit.fluxcd.io/v1", "GitRepository", false),
            ResourceType::FluxSource
        );
        assert_eq!(
            ResourceType::classify("image.toolkit.fluxcd.io/v1beta2", "ImagePolicy", false),
            ResourceType::FluxImage
        );
        assert_eq!(
            ResourceType::classify("notification.toolkit.fluxcd.io/v1beta3", "Alert", false),
            ResourceType::FluxNotification
        );
    }

    #[test]
    fn test_classify_kustomize() {
        assert_eq!(
            ResourceType::classify("kustomize.config.k8s.io/v1beta1", "Kustomization", false),
            ResourceType::KubernetesKustomization
        );
        // kustomization.yaml without apiVersion
        assert_eq!(
            ResourceType::classify("", "Kustomization", true),
            ResourceType::KubernetesKustomization
        );
        // A Flux Kustomization stays a Flux Kustomization even inside kustomization.yaml
        assert_eq!(
            ResourceType::classify("kustomize.toolkit.fluxcd.io/v1", "Kustomization", true),
            ResourceType::FluxKustomization
        );
    }

    #[test]
    fn test_classify_fallback() {
        assert_eq!(
            ResourceType::classify("apps/v1", "Deployment", false),
            ResourceType::KubernetesResource
        );
        // Kind alone is not enough without the matching group
        assert_eq!(
            ResourceType::classify("example.com/v1", "HelmRelease", false),
            ResourceType::KubernetesResource
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            ResourceType::parse_optional("helm-release"),
            Some(ResourceType::HelmRelease)
        );
        assert_eq!(
            ResourceType::parse_optional("git-repository"),
            Some(ResourceType::FluxSource)
        );
        assert_eq!(ResourceType::parse_optional("unknown"), None);
    }

    #[test]
    fn test_round_trip_names() {
        for resource_type in ResourceType::all() {
            assert_eq!(
                ResourceType::parse_optional(resource_type.as_str()),
                Some(*resource_type)
            );
        }
    }

    #[test]
    fn test_into_string() {
        let s: String = ResourceType::FluxSource.into();
        assert_eq!(s, "flux-source");
        assert!(ResourceType::FluxSource.is_flux());
        assert!(!ResourceType::KubernetesResource.is_flux());
    }
}
