//! In-memory [`KubernetesClient`] used by the unit tests

use std::collections::{BTreeMap, HashMap};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::DynamicObject;
use kube::core::{ApiResource, GroupVersionKind, GroupVersionResource};

use super::crd::{BindableKindsStatus, operator, spec};
use super::{KubernetesClient, RestMapping, gvk_of};

pub const NAMESPACE: &str = "my-ns";

#[derive(Default)]
pub struct FakeKubeClient {
    pub sbo_installed: bool,
    pub bindable_kinds: Vec<BindableKindsStatus>,
    pub mappings: Vec<RestMapping>,
    /// instances keyed by plural resource name
    pub instances: HashMap<String, Vec<DynamicObject>>,
    pub spec_bindings: Vec<spec::ServiceBinding>,
    pub operator_bindings: Vec<operator::ServiceBinding>,
    pub secrets: HashMap<String, Secret>,
    /// error returned by `list_service_bindings_from_all_groups`
    pub list_error: Option<String>,
    pub deployment_error: Option<String>,
    /// error returned by `get_bindable_kind_status_rest_mapping`
    pub mapping_error: Option<String>,
    /// error returned by `list_dynamic_resources`
    pub instances_error: Option<String>,
}

impl FakeKubeClient {
    pub fn new() -> Self {
        Self {
            sbo_installed: true,
            ..Default::default()
        }
    }

    pub fn with_secret(mut self, name: &str, keys: &[&str]) -> Self {
        let data: BTreeMap<String, ByteString> = keys
            .iter()
            .map(|k| ((*k).to_string(), ByteString(b"value".to_vec())))
            .collect();
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(NAMESPACE.to_string()),
                ..Default::default()
            },
            data: Some(data),
            ..Default::default()
        };
        self.secrets.insert(name.to_string(), secret);
        self
    }
}

pub fn cluster_gvk() -> GroupVersionKind {
    GroupVersionKind::gvk("postgresql.k8s.enterprisedb.io", "v1", "Cluster")
}

pub fn cluster_mapping() -> RestMapping {
    RestMapping {
        gvk: cluster_gvk(),
        resource: "clusters".to_string(),
        namespaced: true,
    }
}

pub fn cluster_instance(name: &str) -> DynamicObject {
    let resource = ApiResource::from_gvk_with_plural(&cluster_gvk(), "clusters");
    DynamicObject::new(name, &resource)
}

#[async_trait]
impl KubernetesClient for FakeKubeClient {
    async fn is_service_binding_supported(&self) -> Result<bool> {
        Ok(self.sbo_installed)
    }

    async fn get_bindable_kinds(&self) -> Result<Vec<BindableKindsStatus>> {
        Ok(self.bindable_kinds.clone())
    }

    async fn get_bindable_kind_status_rest_mapping(
        &self,
        _statuses: &[BindableKindsStatus],
    ) -> Result<Vec<RestMapping>> {
        if let Some(err) = &self.mapping_error {
            return Err(anyhow!(err.clone()));
        }
        Ok(self.mappings.clone())
    }

    async fn list_dynamic_resources(
        &self,
        _namespace: &str,
        mapping: &RestMapping,
    ) -> Result<Vec<DynamicObject>> {
        if let Some(err) = &self.instances_error {
            return Err(anyhow!(err.clone()));
        }
        Ok(self
            .instances
            .get(&mapping.resource)
            .cloned()
            .unwrap_or_default())
    }

    async fn new_service_binding_service_object(
        &self,
        service_namespace: &str,
        service: &DynamicObject,
        binding_name: &str,
    ) -> Result<operator::Service> {
        let gvk = gvk_of(service).ok_or_else(|| anyhow!("untyped service"))?;
        let mapping = self
            .mappings
            .iter()
            .find(|m| m.gvk == gvk)
            .ok_or_else(|| anyhow!("no mapping for {gvk:?}"))?;
        Ok(operator::Service {
            group: gvk.group,
            version: gvk.version,
            kind: gvk.kind,
            resource: mapping.resource.clone(),
            name: service.metadata.name.clone().unwrap_or_default(),
            id: Some(binding_name.to_string()),
            namespace: (!service_namespace.is_empty()).then(|| service_namespace.to_string()),
        })
    }

    async fn get_deployment_api_version(&self) -> Result<GroupVersionResource> {
        if let Some(err) = &self.deployment_error {
            return Err(anyhow!(err.clone()));
        }
        Ok(GroupVersionResource::gvr("apps", "v1", "deployments"))
    }

    async fn get_gvk_from_gvr(&self, gvr: &GroupVersionResource) -> Result<GroupVersionKind> {
        self.mappings
            .iter()
            .find(|m| m.gvk.group == gvr.group && m.resource == gvr.resource)
            .map(|m| m.gvk.clone())
            .ok_or_else(|| anyhow!("no kind for {gvr:?}"))
    }

    async fn list_service_bindings_from_all_groups(
        &self,
    ) -> Result<(Vec<spec::ServiceBinding>, Vec<operator::ServiceBinding>)> {
        if let Some(err) = &self.list_error {
            return Err(anyhow!(err.clone()));
        }
        Ok((self.spec_bindings.clone(), self.operator_bindings.clone()))
    }

    async fn get_binding_service_binding(
        &self,
        name: &str,
    ) -> Result<Option<operator::ServiceBinding>> {
        Ok(self
            .operator_bindings
            .iter()
            .find(|b| b.metadata.name.as_deref() == Some(name))
            .cloned())
    }

    async fn get_spec_service_binding(&self, name: &str) -> Result<Option<spec::ServiceBinding>> {
        Ok(self
            .spec_bindings
            .iter()
            .find(|b| b.metadata.name.as_deref() == Some(name))
            .cloned())
    }

    async fn get_secret(&self, name: &str, namespace: &str) -> Result<Secret> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("secrets {name:?} not found in {namespace}"))
    }

    fn get_current_namespace(&self) -> String {
        NAMESPACE.to_string()
    }
}
