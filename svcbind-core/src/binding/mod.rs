//! Binding workflows: add, list/describe and remove
//!
//! [`BindingClient`] picks the input backend for each operation and talks to
//! the devfile and, when one is configured, to the cluster.

mod add;
mod list;
mod remove;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::Result;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::ResourceExt;
use kube::api::DynamicObject;
use kube::core::GroupVersionResource;
use tracing::debug;

pub use add::AddInputs;

use crate::api::{self, SERVICE_BINDING_ROOT, ServiceBinding, ServiceBindingSpec, ServiceBindingStatus};
use crate::asker::Asker;
use crate::backend::{
    Backend, BackendKind, FLAG_BIND_AS_FILES, FLAG_NAME, FLAG_SERVICE, Flags, FlagsBackend,
    InteractiveBackend,
};
use crate::error::BindingError;
use crate::kclient::crd::{INJECTION_READY, is_condition_true, operator, spec};
use crate::kclient::{KubernetesClient, gvk_of};

/// Kinds of the native workload resources, by group and plural resource name
const NATIVE_WORKLOADS: &[(&str, &str, &str)] = &[
    ("apps", "daemonsets", "DaemonSet"),
    ("apps", "deployments", "Deployment"),
    ("apps", "replicasets", "ReplicaSet"),
    ("", "replicationcontrollers", "ReplicationController"),
    ("apps", "statefulsets", "StatefulSet"),
];

pub struct BindingClient {
    flags_backend: FlagsBackend,
    interactive_backend: InteractiveBackend,
    kubernetes_client: Option<Arc<dyn KubernetesClient>>,
}

impl BindingClient {
    /// `kubernetes_client` is `None` when no cluster is reachable; devfile-only
    /// operations keep working in that case.
    pub fn new(asker: Box<dyn Asker>, kubernetes_client: Option<Arc<dyn KubernetesClient>>) -> Self {
        Self {
            flags_backend: FlagsBackend::new(),
            interactive_backend: InteractiveBackend::new(asker),
            kubernetes_client,
        }
    }

    /// Keep only the flags of the binding operations, so unrelated flags
    /// (verbosity, output format...) do not force the flags backend
    pub fn get_flags(&self, flags: &HashMap<String, String>) -> Flags {
        flags
            .iter()
            .filter(|(k, _)| {
                matches!(k.as_str(), FLAG_NAME | FLAG_SERVICE | FLAG_BIND_AS_FILES)
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn select_backend(&self, flags: &Flags) -> Backend<'_> {
        match BackendKind::for_flags(flags) {
            BackendKind::Flags => Backend::Flags(&self.flags_backend),
            BackendKind::Interactive => Backend::Interactive(&self.interactive_backend),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.kubernetes_client.is_none()
    }

    fn kube(&self) -> Result<&dyn KubernetesClient> {
        match &self.kubernetes_client {
            Some(client) => Ok(client.as_ref()),
            None => Err(BindingError::NoCluster.into()),
        }
    }

    /// Every instance of every bindable kind, keyed `<name> (<Kind>.<group>)`
    pub async fn get_service_instances(&self) -> Result<BTreeMap<String, DynamicObject>> {
        let kube = self.kube()?;
        if !kube.is_service_binding_supported().await? {
            return Err(BindingError::ServiceBindingNotSupported.into());
        }

        let kinds = kube.get_bindable_kinds().await?;
        let mappings = kube.get_bindable_kind_status_rest_mapping(&kinds).await?;

        let mut instances = BTreeMap::new();
        for mapping in &mappings {
            let items = kube.list_dynamic_resources("", mapping).await?;
            debug!("{} instances of {}", items.len(), mapping.resource);
            for item in items {
                let gvk = gvk_of(&item).unwrap_or_else(|| mapping.gvk.clone());
                let label = format!("{} ({}.{})", item.name_any(), gvk.kind, gvk.group);
                instances.insert(label, item);
            }
        }
        Ok(instances)
    }

    /// Binding `name` from the cluster, looked up in the operator group first
    /// and then in the `servicebinding.io` group
    pub async fn get_binding_from_cluster(&self, name: &str) -> Result<ServiceBinding> {
        let kube = self.kube()?;

        if let Some(binding) = kube.get_binding_service_binding(name).await? {
            let mut sb = self.convert_operator_binding(&binding).await?;
            sb.status = operator_status(kube, &binding).await?;
            return Ok(sb);
        }

        if let Some(binding) = kube.get_spec_service_binding(name).await? {
            let mut sb = from_spec_binding(&binding);
            sb.status = spec_status(kube, &binding).await?;
            return Ok(sb);
        }

        Err(BindingError::BindingNotOnCluster {
            name: name.to_string(),
        }
        .into())
    }

    /// Status of the operator binding `name` on the cluster, `None` when it is
    /// absent, not injected yet, or no cluster is configured
    async fn get_status_from_binding(&self, name: &str) -> Result<Option<ServiceBindingStatus>> {
        let Some(kube) = self.kubernetes_client.as_deref() else {
            return Ok(None);
        };
        match kube.get_binding_service_binding(name).await? {
            Some(binding) => operator_status(kube, &binding).await,
            None => Ok(None),
        }
    }

    async fn get_status_from_spec(&self, name: &str) -> Result<Option<ServiceBindingStatus>> {
        let Some(kube) = self.kubernetes_client.as_deref() else {
            return Ok(None);
        };
        match kube.get_spec_service_binding(name).await? {
            Some(binding) => spec_status(kube, &binding).await,
            None => Ok(None),
        }
    }

    async fn convert_operator_binding(&self, binding: &operator::ServiceBinding) -> Result<ServiceBinding> {
        let kind = self.resolve_application_kind(&binding.spec.application).await?;
        Ok(from_operator_binding(binding, kind))
    }

    /// Kind of the bound workload. Manifests written by `add` only carry the
    /// resource, so the kind comes from the native workload table or, for
    /// other resources, from the cluster discovery.
    async fn resolve_application_kind(&self, application: &operator::Application) -> Result<String> {
        if !application.kind.is_empty() {
            return Ok(application.kind.clone());
        }
        if let Some((_, _, kind)) = NATIVE_WORKLOADS
            .iter()
            .find(|(group, resource, _)| *group == application.group && *resource == application.resource)
        {
            return Ok((*kind).to_string());
        }
        let Some(kube) = self.kubernetes_client.as_deref() else {
            debug!("no cluster to resolve the kind of {}", application.resource);
            return Ok(String::new());
        };
        let gvr = GroupVersionResource::gvr(&application.group, &application.version, &application.resource);
        Ok(kube.get_gvk_from_gvr(&gvr).await?.kind)
    }
}

async fn operator_status(
    kube: &dyn KubernetesClient,
    binding: &operator::ServiceBinding,
) -> Result<Option<ServiceBindingStatus>> {
    let Some(status) = &binding.status else {
        return Ok(None);
    };
    if !is_condition_true(&status.conditions, INJECTION_READY) {
        return Ok(None);
    }

    let name = binding.name_any();
    let keys = secret_keys(kube, &status.secret).await?;
    if binding.spec.bind_as_files {
        Ok(Some(ServiceBindingStatus {
            binding_files: binding_files(&name, &keys),
            ..Default::default()
        }))
    } else {
        Ok(Some(ServiceBindingStatus {
            binding_env_vars: keys,
            ..Default::default()
        }))
    }
}

async fn spec_status(
    kube: &dyn KubernetesClient,
    binding: &spec::ServiceBinding,
) -> Result<Option<ServiceBindingStatus>> {
    let Some(status) = &binding.status else {
        return Ok(None);
    };
    if !is_condition_true(&status.conditions, INJECTION_READY) {
        return Ok(None);
    }
    let Some(secret) = &status.binding else {
        return Ok(None);
    };

    let keys = secret_keys(kube, &secret.name).await?;
    Ok(Some(ServiceBindingStatus {
        binding_files: binding_files(&binding.name_any(), &keys),
        binding_env_vars: binding.spec.env.iter().map(|e| e.name.clone()).collect(),
        ..Default::default()
    }))
}

async fn secret_keys(kube: &dyn KubernetesClient, secret_name: &str) -> Result<Vec<String>> {
    let secret = kube
        .get_secret(secret_name, &kube.get_current_namespace())
        .await?;
    Ok(secret.data.unwrap_or_default().into_keys().collect())
}

fn binding_files(binding_name: &str, keys: &[String]) -> Vec<String> {
    keys.iter()
        .map(|key| format!("{SERVICE_BINDING_ROOT}/{binding_name}/{key}"))
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn from_operator_binding(binding: &operator::ServiceBinding, application_kind: String) -> ServiceBinding {
    let app = &binding.spec.application;
    let services = binding
        .spec
        .services
        .iter()
        .map(|s| ObjectReference {
            api_version: Some(api::join_api_version(&s.group, &s.version)),
            kind: non_empty(&s.kind),
            name: non_empty(&s.name),
            namespace: s.namespace.clone().filter(|ns| !ns.is_empty()),
            ..Default::default()
        })
        .collect();

    ServiceBinding {
        name: binding.name_any(),
        spec: ServiceBindingSpec {
            application: ObjectReference {
                api_version: Some(api::join_api_version(&app.group, &app.version)),
                kind: non_empty(&application_kind),
                name: non_empty(&app.name),
                ..Default::default()
            },
            services,
            detect_binding_resources: binding.spec.detect_binding_resources,
            bind_as_files: binding.spec.bind_as_files,
            naming_strategy: binding.spec.naming_strategy.clone().unwrap_or_default(),
        },
        status: None,
    }
}

fn from_spec_binding(binding: &spec::ServiceBinding) -> ServiceBinding {
    let workload = &binding.spec.workload;
    let service = &binding.spec.service;
    ServiceBinding {
        name: binding.name_any(),
        spec: ServiceBindingSpec {
            application: ObjectReference {
                api_version: non_empty(&workload.api_version),
                kind: non_empty(&workload.kind),
                name: workload.name.clone(),
                ..Default::default()
            },
            services: vec![ObjectReference {
                api_version: non_empty(&service.api_version),
                kind: non_empty(&service.kind),
                name: non_empty(&service.name),
                ..Default::default()
            }],
            detect_binding_resources: false,
            bind_as_files: true,
            naming_strategy: String::new(),
        },
        status: None,
    }
}

/// First document of a manifest as an untyped tree, `None` when empty
pub(crate) fn first_manifest_document(manifest: &str) -> Result<Option<serde_yaml::Value>> {
    use serde::Deserialize;

    let Some(document) = serde_yaml::Deserializer::from_str(manifest).next() else {
        return Ok(None);
    };
    let value = serde_yaml::Value::deserialize(document)
        .map_err(|e| anyhow::Error::new(e).context("Failed to parse manifest"))?;
    Ok((!value.is_null()).then_some(value))
}

/// `(apiVersion, kind, metadata.name)` of a manifest tree
pub(crate) fn manifest_identity(value: &serde_yaml::Value) -> (&str, &str, &str) {
    let api_version = value.get("apiVersion").and_then(serde_yaml::Value::as_str);
    let kind = value.get("kind").and_then(serde_yaml::Value::as_str);
    let name = value
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(serde_yaml::Value::as_str);
    (
        api_version.unwrap_or_default(),
        kind.unwrap_or_default(),
        name.unwrap_or_default(),
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    use super::*;
    use crate::asker::scripted::ScriptedAsker;
    use crate::kclient::crd::BindingCondition;
    use crate::kclient::fake::{FakeKubeClient, cluster_instance, cluster_mapping};

    pub const BINDING_NAME: &str = "my-nodejs-app-cluster-sample";

    pub fn client(fake: FakeKubeClient) -> BindingClient {
        BindingClient::new(Box::new(ScriptedAsker::default()), Some(Arc::new(fake)))
    }

    pub fn injected() -> Vec<BindingCondition> {
        vec![BindingCondition {
            type_: INJECTION_READY.to_string(),
            status: "True".to_string(),
            ..Default::default()
        }]
    }

    /// Operator binding as it comes back from the cluster
    pub fn operator_binding(name: &str, mode: Option<&str>, secret: Option<&str>) -> operator::ServiceBinding {
        let mut binding = operator::ServiceBinding::new(
            name,
            operator::ServiceBindingSpec {
                name: None,
                application: operator::Application {
                    group: "apps".to_string(),
                    version: "v1".to_string(),
                    kind: String::new(),
                    resource: "deployments".to_string(),
                    name: "my-nodejs-app-app".to_string(),
                },
                services: vec![operator::Service {
                    group: "postgresql.k8s.enterprisedb.io".to_string(),
                    version: "v1".to_string(),
                    kind: "Cluster".to_string(),
                    resource: "clusters".to_string(),
                    name: "cluster-sample".to_string(),
                    id: Some(name.to_string()),
                    namespace: None,
                }],
                bind_as_files: true,
                detect_binding_resources: true,
                naming_strategy: None,
            },
        );
        if let Some(mode) = mode {
            binding.metadata.labels = Some(BTreeMap::from([(
                api::MODE_LABEL.to_string(),
                mode.to_string(),
            )]));
        }
        if let Some(secret) = secret {
            binding.status = Some(operator::ServiceBindingStatus {
                conditions: injected(),
                secret: secret.to_string(),
            });
        }
        binding
    }

    #[test]
    fn test_get_flags_keeps_binding_flags_only() {
        let client = BindingClient::new(Box::new(ScriptedAsker::default()), None);
        let raw = HashMap::from([
            ("name".to_string(), "b".to_string()),
            ("v".to_string(), "4".to_string()),
            ("o".to_string(), "json".to_string()),
        ]);
        let flags = client.get_flags(&raw);
        assert_eq!(flags.len(), 1);
        assert_eq!(client.select_backend(&flags).kind(), BackendKind::Flags);
        assert_eq!(
            client.select_backend(&client.get_flags(&HashMap::new())).kind(),
            BackendKind::Interactive
        );
    }

    #[tokio::test]
    async fn test_service_instances_are_labelled() {
        let mut fake = FakeKubeClient::new();
        fake.mappings = vec![cluster_mapping()];
        fake.instances.insert(
            "clusters".to_string(),
            vec![cluster_instance("cluster-sample"), cluster_instance("other")],
        );

        let instances = client(fake).get_service_instances().await.unwrap();
        let labels: Vec<&String> = instances.keys().collect();
        assert_eq!(
            labels,
            vec![
                "cluster-sample (Cluster.postgresql.k8s.enterprisedb.io)",
                "other (Cluster.postgresql.k8s.enterprisedb.io)"
            ]
        );
    }

    #[tokio::test]
    async fn test_no_bindable_instances_is_not_an_error() {
        let instances = client(FakeKubeClient::new()).get_service_instances().await.unwrap();
        assert!(instances.is_empty());
    }

    #[tokio::test]
    async fn test_bindable_kind_without_instances_is_skipped() {
        let mut fake = FakeKubeClient::new();
        fake.mappings = vec![cluster_mapping()];

        let instances = client(fake).get_service_instances().await.unwrap();
        assert!(instances.is_empty());
    }

    #[tokio::test]
    async fn test_service_instances_propagate_mapping_error() {
        let mut fake = FakeKubeClient::new();
        fake.mapping_error = Some("no matches for kind \"Cluster\"".to_string());

        let err = client(fake).get_service_instances().await.unwrap_err();
        assert_eq!(err.to_string(), "no matches for kind \"Cluster\"");
    }

    #[tokio::test]
    async fn test_service_instances_propagate_listing_error() {
        let mut fake = FakeKubeClient::new();
        fake.mappings = vec![cluster_mapping()];
        fake.instances
            .insert("clusters".to_string(), vec![cluster_instance("cluster-sample")]);
        fake.instances_error = Some("clusters is forbidden".to_string());

        let err = client(fake).get_service_instances().await.unwrap_err();
        assert_eq!(err.to_string(), "clusters is forbidden");
    }

    #[tokio::test]
    async fn test_service_instances_require_operator() {
        let mut fake = FakeKubeClient::new();
        fake.sbo_installed = false;
        let err = client(fake).get_service_instances().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BindingError>(),
            Some(BindingError::ServiceBindingNotSupported)
        ));
    }

    #[tokio::test]
    async fn test_service_instances_need_a_cluster() {
        let client = BindingClient::new(Box::new(ScriptedAsker::default()), None);
        let err = client.get_service_instances().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BindingError>(),
            Some(BindingError::NoCluster)
        ));
    }

    #[tokio::test]
    async fn test_operator_binding_files() {
        let mut fake = FakeKubeClient::new().with_secret("asecret", &["akey", "bkey"]);
        fake.operator_bindings = vec![operator_binding(BINDING_NAME, None, Some("asecret"))];

        let binding = client(fake).get_binding_from_cluster(BINDING_NAME).await.unwrap();

        assert_eq!(binding.spec.application.kind.as_deref(), Some("Deployment"));
        assert_eq!(binding.spec.application.api_version.as_deref(), Some("apps/v1"));
        assert_eq!(
            binding.status.unwrap().binding_files,
            vec![
                "${SERVICE_BINDING_ROOT}/my-nodejs-app-cluster-sample/akey",
                "${SERVICE_BINDING_ROOT}/my-nodejs-app-cluster-sample/bkey"
            ]
        );
    }

    #[tokio::test]
    async fn test_operator_binding_env_vars() {
        let mut binding = operator_binding(BINDING_NAME, None, Some("asecret"));
        binding.spec.bind_as_files = false;
        let mut fake = FakeKubeClient::new().with_secret("asecret", &["PASSWORD"]);
        fake.operator_bindings = vec![binding];

        let status = client(fake)
            .get_binding_from_cluster(BINDING_NAME)
            .await
            .unwrap()
            .status
            .unwrap();
        assert!(status.binding_files.is_empty());
        assert_eq!(status.binding_env_vars, vec!["PASSWORD"]);
    }

    #[tokio::test]
    async fn test_not_injected_binding_has_no_status() {
        let mut binding = operator_binding(BINDING_NAME, None, Some("asecret"));
        if let Some(status) = binding.status.as_mut() {
            status.conditions[0].status = "False".to_string();
        }
        let mut fake = FakeKubeClient::new();
        fake.operator_bindings = vec![binding];

        let sb = client(fake).get_binding_from_cluster(BINDING_NAME).await.unwrap();
        assert_eq!(sb.status, None);
    }

    #[tokio::test]
    async fn test_spec_binding_from_cluster() {
        let binding = spec::ServiceBinding {
            metadata: ObjectMeta {
                name: Some("spec-binding".to_string()),
                ..Default::default()
            },
            spec: spec::ServiceBindingSpec {
                name: None,
                type_: None,
                provider: None,
                workload: spec::WorkloadReference {
                    api_version: "apps/v1".to_string(),
                    kind: "Deployment".to_string(),
                    name: Some("my-nodejs-app-app".to_string()),
                },
                service: spec::ServiceReference {
                    api_version: "postgresql.k8s.enterprisedb.io/v1".to_string(),
                    kind: "Cluster".to_string(),
                    name: "cluster-sample".to_string(),
                },
                env: vec![spec::EnvMapping {
                    name: "DB_PASSWORD".to_string(),
                    key: "password".to_string(),
                }],
            },
            status: Some(spec::ServiceBindingStatus {
                conditions: injected(),
                binding: Some(spec::SecretReference {
                    name: "spec-secret".to_string(),
                }),
            }),
        };
        let mut fake = FakeKubeClient::new().with_secret("spec-secret", &["password"]);
        fake.spec_bindings = vec![binding];

        let sb = client(fake).get_binding_from_cluster("spec-binding").await.unwrap();
        assert!(sb.spec.bind_as_files);
        assert!(!sb.spec.detect_binding_resources);
        let status = sb.status.unwrap();
        assert_eq!(
            status.binding_files,
            vec!["${SERVICE_BINDING_ROOT}/spec-binding/password"]
        );
        assert_eq!(status.binding_env_vars, vec!["DB_PASSWORD"]);
    }

    #[tokio::test]
    async fn test_missing_binding_on_cluster() {
        let err = client(FakeKubeClient::new())
            .get_binding_from_cluster("absent")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "ServiceBinding \"absent\" not found");
    }

    #[tokio::test]
    async fn test_application_kind_from_discovery() {
        let mut binding = operator_binding(BINDING_NAME, None, None);
        binding.spec.application.group = "postgresql.k8s.enterprisedb.io".to_string();
        binding.spec.application.resource = "clusters".to_string();
        let mut fake = FakeKubeClient::new();
        fake.mappings = vec![cluster_mapping()];
        fake.operator_bindings = vec![binding];

        let sb = client(fake).get_binding_from_cluster(BINDING_NAME).await.unwrap();
        assert_eq!(sb.spec.application.kind.as_deref(), Some("Cluster"));
    }

    #[test]
    fn test_first_manifest_document() {
        assert_eq!(first_manifest_document("").unwrap(), None);
        let doc = first_manifest_document("kind: A\nmetadata:\n  name: a\n---\nkind: B\n")
            .unwrap()
            .unwrap();
        assert_eq!(manifest_identity(&doc), ("", "A", "a"));
        assert!(first_manifest_document("kind: [unclosed").is_err());
    }
}
