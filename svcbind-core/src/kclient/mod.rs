//! Kubernetes collaborator
//!
//! The binding workflows only see the [`KubernetesClient`] trait. The
//! `kube`-backed implementation is [`ClusterClient`]; tests run against an
//! in-memory fake.

pub mod cluster;
pub mod crd;

#[cfg(test)]
pub(crate) mod fake;

use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::DynamicObject;
use kube::core::{GroupVersionKind, GroupVersionResource};

pub use cluster::ClusterClient;
use crd::{BindableKindsStatus, operator, spec};

/// Resolved REST mapping of a kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestMapping {
    pub gvk: GroupVersionKind,
    /// Plural resource name, e.g. `clusters`
    pub resource: String,
    pub namespaced: bool,
}

/// Cluster operations the binding workflows depend on
#[async_trait]
pub trait KubernetesClient: Send + Sync {
    /// Whether the Service Binding Operator's `ServiceBinding` resource is served
    async fn is_service_binding_supported(&self) -> Result<bool>;

    /// Status of the `bindable-kinds` resource maintained by the operator
    async fn get_bindable_kinds(&self) -> Result<Vec<BindableKindsStatus>>;

    /// REST mappings for the bindable kinds, one per group/kind
    async fn get_bindable_kind_status_rest_mapping(
        &self,
        statuses: &[BindableKindsStatus],
    ) -> Result<Vec<RestMapping>>;

    /// Instances of a resource in `namespace` (current namespace when empty)
    async fn list_dynamic_resources(
        &self,
        namespace: &str,
        mapping: &RestMapping,
    ) -> Result<Vec<DynamicObject>>;

    /// Service entry of a binding pointing at `service`
    async fn new_service_binding_service_object(
        &self,
        service_namespace: &str,
        service: &DynamicObject,
        binding_name: &str,
    ) -> Result<operator::Service>;

    /// Group, version and resource the cluster serves Deployments under
    async fn get_deployment_api_version(&self) -> Result<GroupVersionResource>;

    async fn get_gvk_from_gvr(&self, gvr: &GroupVersionResource) -> Result<GroupVersionKind>;

    /// Bindings of the current namespace: `servicebinding.io` ones first,
    /// then `binding.operators.coreos.com` ones
    async fn list_service_bindings_from_all_groups(
        &self,
    ) -> Result<(Vec<spec::ServiceBinding>, Vec<operator::ServiceBinding>)>;

    async fn get_binding_service_binding(
        &self,
        name: &str,
    ) -> Result<Option<operator::ServiceBinding>>;

    async fn get_spec_service_binding(&self, name: &str) -> Result<Option<spec::ServiceBinding>>;

    async fn get_secret(&self, name: &str, namespace: &str) -> Result<Secret>;

    fn get_current_namespace(&self) -> String;
}

/// Group/version/kind of a dynamic object, from its type metadata
pub fn gvk_of(object: &DynamicObject) -> Option<GroupVersionKind> {
    let types = object.types.as_ref()?;
    let (group, version) = crate::api::split_api_version(&types.api_version);
    Some(GroupVersionKind::gvk(group, version, &types.kind))
}
