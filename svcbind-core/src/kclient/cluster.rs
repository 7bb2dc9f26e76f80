//! `kube`-backed implementation of [`KubernetesClient`]

use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, ApiResource, DynamicObject, ListParams, ResourceExt};
use kube::core::{GroupVersionKind, GroupVersionResource};
use kube::discovery::{self, Scope};
use kube::Client;
use tracing::debug;

use super::crd::{BINDABLE_KINDS_NAME, BINDABLE_KINDS_RESOURCE, BindableKindsStatus, operator, spec};
use super::{KubernetesClient, RestMapping, gvk_of};
use crate::error::BindingError;

/// Client talking to the cluster of the active kubeconfig context
#[derive(Clone)]
pub struct ClusterClient {
    client: Client,
    namespace: String,
}

impl ClusterClient {
    /// Connect using the default kubeconfig / in-cluster configuration.
    /// `namespace` overrides the namespace of the current context.
    pub async fn try_default(namespace: Option<String>) -> Result<Self> {
        let client = Client::try_default()
            .await
            .context("Failed to create Kubernetes client")?;
        let namespace = namespace.unwrap_or_else(|| client.default_namespace().to_string());
        debug!("using namespace {namespace}");
        Ok(Self { client, namespace })
    }

    pub fn new(client: Client, namespace: String) -> Self {
        Self { client, namespace }
    }

    async fn rest_mapping(&self, gvk: &GroupVersionKind) -> Result<RestMapping> {
        let (resource, caps) = discovery::pinned_kind(&self.client, gvk)
            .await
            .with_context(|| format!("Failed to find REST mapping for {gvk:?}"))?;
        Ok(RestMapping {
            gvk: gvk.clone(),
            resource: resource.plural,
            namespaced: matches!(caps.scope, Scope::Namespaced),
        })
    }

    fn namespace_or_current<'a>(&'a self, namespace: &'a str) -> &'a str {
        if namespace.is_empty() {
            &self.namespace
        } else {
            namespace
        }
    }
}

/// 403 (RBAC) and 404 (CRD not installed) are treated as "no bindings of this group"
fn is_absent_or_forbidden(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(status) if status.code == 403 || status.code == 404)
}

/// Group version not served (404) or served without the kind
fn is_kind_absent(err: &kube::Error) -> bool {
    match err {
        kube::Error::Discovery(_) => true,
        kube::Error::Api(status) => status.code == 404,
        _ => false,
    }
}

#[async_trait]
impl KubernetesClient for ClusterClient {
    async fn is_service_binding_supported(&self) -> Result<bool> {
        let gvk = GroupVersionKind::gvk(operator::GROUP, operator::VERSION, operator::KIND);
        match discovery::pinned_kind(&self.client, &gvk).await {
            Ok(_) => Ok(true),
            Err(err) if is_kind_absent(&err) => {
                debug!("ServiceBinding kind not served: {err}");
                Ok(false)
            }
            Err(err) => Err(err).context("Failed to discover the ServiceBinding resource"),
        }
    }

    async fn get_bindable_kinds(&self) -> Result<Vec<BindableKindsStatus>> {
        let gvk = GroupVersionKind::gvk(operator::GROUP, operator::VERSION, "BindableKinds");
        let resource = ApiResource::from_gvk_with_plural(&gvk, BINDABLE_KINDS_RESOURCE);
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &resource);

        let Some(object) = api.get_opt(BINDABLE_KINDS_NAME).await? else {
            return Err(BindingError::NoBindableOperators.into());
        };
        let status = object
            .data
            .get("status")
            .cloned()
            .unwrap_or(serde_json::Value::Array(Vec::new()));
        serde_json::from_value(status).context("Failed to decode bindable-kinds status")
    }

    async fn get_bindable_kind_status_rest_mapping(
        &self,
        statuses: &[BindableKindsStatus],
    ) -> Result<Vec<RestMapping>> {
        let mut result: Vec<RestMapping> = Vec::new();
        for status in statuses {
            // every group/kind only once, whatever the version
            if result
                .iter()
                .any(|m| m.gvk.group == status.group && m.gvk.kind == status.kind)
            {
                continue;
            }
            let gvk = GroupVersionKind::gvk(&status.group, &status.version, &status.kind);
            result.push(self.rest_mapping(&gvk).await?);
        }
        Ok(result)
    }

    async fn list_dynamic_resources(
        &self,
        namespace: &str,
        mapping: &RestMapping,
    ) -> Result<Vec<DynamicObject>> {
        let resource = ApiResource::from_gvk_with_plural(&mapping.gvk, &mapping.resource);
        let api: Api<DynamicObject> = if mapping.namespaced {
            Api::namespaced_with(
                self.client.clone(),
                self.namespace_or_current(namespace),
                &resource,
            )
        } else {
            Api::all_with(self.client.clone(), &resource)
        };
        let list = api.list(&ListParams::default()).await?;

        // the list response does not always carry the item types
        let items = list
            .items
            .into_iter()
            .map(|mut item| {
                if item.types.is_none() {
                    item.types = Some(kube::core::TypeMeta {
                        api_version: resource.api_version.clone(),
                        kind: resource.kind.clone(),
                    });
                }
                item
            })
            .collect();
        Ok(items)
    }

    async fn new_service_binding_service_object(
        &self,
        service_namespace: &str,
        service: &DynamicObject,
        binding_name: &str,
    ) -> Result<operator::Service> {
        let gvk = gvk_of(service)
            .with_context(|| format!("service {} has no type information", service.name_any()))?;
        let mapping = self.rest_mapping(&gvk).await?;

        Ok(operator::Service {
            group: mapping.gvk.group,
            version: mapping.gvk.version,
            kind: mapping.gvk.kind,
            resource: mapping.resource,
            name: service.name_any(),
            id: Some(binding_name.to_string()),
            namespace: (!service_namespace.is_empty()).then(|| service_namespace.to_string()),
        })
    }

    async fn get_deployment_api_version(&self) -> Result<GroupVersionResource> {
        let apps = discovery::group(&self.client, "apps")
            .await
            .context("Failed to discover the apps API group")?;
        let version = apps.preferred_version_or_latest();
        Ok(GroupVersionResource::gvr("apps", version, "deployments"))
    }

    async fn get_gvk_from_gvr(&self, gvr: &GroupVersionResource) -> Result<GroupVersionKind> {
        let group = discovery::group(&self.client, &gvr.group)
            .await
            .with_context(|| format!("Failed to discover API group {:?}", gvr.group))?;
        group
            .versioned_resources(&gvr.version)
            .into_iter()
            .find(|(resource, _)| resource.plural == gvr.resource)
            .map(|(resource, _)| {
                GroupVersionKind::gvk(&resource.group, &resource.version, &resource.kind)
            })
            .with_context(|| format!("no kind found for resource {gvr:?}"))
    }

    async fn list_service_bindings_from_all_groups(
        &self,
    ) -> Result<(Vec<spec::ServiceBinding>, Vec<operator::ServiceBinding>)> {
        let specs: Api<spec::ServiceBinding> = Api::namespaced(self.client.clone(), &self.namespace);
        let specs = match specs.list(&ListParams::default()).await {
            Ok(list) => list.items,
            Err(err) if is_absent_or_forbidden(&err) => {
                debug!("skipping {}: {err}", spec::API_VERSION);
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };

        let bindings: Api<operator::ServiceBinding> =
            Api::namespaced(self.client.clone(), &self.namespace);
        let bindings = match bindings.list(&ListParams::default()).await {
            Ok(list) => list.items,
            Err(err) if is_absent_or_forbidden(&err) => {
                debug!("skipping {}: {err}", operator::API_VERSION);
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };

        Ok((specs, bindings))
    }

    async fn get_binding_service_binding(
        &self,
        name: &str,
    ) -> Result<Option<operator::ServiceBinding>> {
        let api: Api<operator::ServiceBinding> =
            Api::namespaced(self.client.clone(), &self.namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn get_spec_service_binding(&self, name: &str) -> Result<Option<spec::ServiceBinding>> {
        let api: Api<spec::ServiceBinding> = Api::namespaced(self.client.clone(), &self.namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn get_secret(&self, name: &str, namespace: &str) -> Result<Secret> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .with_context(|| format!("Failed to get secret {namespace}/{name}"))
    }

    fn get_current_namespace(&self) -> String {
        self.namespace.clone()
    }
}
