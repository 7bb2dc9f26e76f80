use std::collections::BTreeMap;

use anyhow::Result;
use kube::ResourceExt;
use kube::api::DynamicObject;
use serde_json::Value;
use snafu::ensure;
use tracing::{debug, info};

use super::BindingClient;
use crate::backend::{AddBindingBackend, BackendKind, Flags};
use crate::devfile::{Devfile, validate_k8s_resource_name};
use crate::error::{MissingComponentNameSnafu, ServiceNotFoundSnafu};
use crate::kclient::crd::operator;

/// Inputs of an add-binding operation, resolved by a single backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddInputs {
    /// Label of the selected instance, a key of the service instance map
    pub service: String,
    pub name: String,
    pub bind_as_files: bool,
    pub backend: BackendKind,
}

impl BindingClient {
    /// Resolve the service, binding name and bind mode with the backend
    /// selected for `flags`
    pub fn resolve_add_inputs(
        &self,
        flags: &Flags,
        devfile: &Devfile,
        instances: &BTreeMap<String, DynamicObject>,
    ) -> Result<AddInputs> {
        let backend = self.select_backend(flags);
        backend.validate(flags)?;

        let candidates: Vec<String> = instances.keys().cloned().collect();
        let service = backend.select_service_instance(flags, &candidates)?;
        let instance = instances
            .get(&service)
            .ok_or_else(|| ServiceNotFoundSnafu { service: service.as_str() }.build())?;

        let default_name = format!("{}-{}", devfile.metadata_name(), instance.name_any());
        let name = backend.ask_binding_name(&default_name, flags)?;
        let bind_as_files = backend.ask_bind_as_files(flags)?;

        Ok(AddInputs {
            service,
            name,
            bind_as_files,
            backend: backend.kind(),
        })
    }

    /// Embed a `ServiceBinding` between the devfile's workload and `service`
    /// as an inlined Kubernetes component named `name`.
    ///
    /// The workload is assumed to be the Deployment `<metadata.name>-app`.
    pub async fn add_binding(
        &self,
        name: &str,
        bind_as_files: bool,
        service: &DynamicObject,
        mut devfile: Devfile,
    ) -> Result<Devfile> {
        validate_k8s_resource_name("binding name", name)?;
        let component = devfile.metadata_name();
        ensure!(!component.is_empty(), MissingComponentNameSnafu);
        let application_name = format!("{component}-app");

        let kube = self.kube()?;
        let service_ref = kube
            .new_service_binding_service_object("", service, name)
            .await?;
        let deployment = kube.get_deployment_api_version().await?;
        debug!("binding {name} targets {}/{} {application_name}", deployment.group, deployment.resource);

        let binding = operator::ServiceBinding::new(
            name,
            operator::ServiceBindingSpec {
                name: None,
                application: operator::Application {
                    group: deployment.group,
                    version: deployment.version,
                    kind: String::new(),
                    resource: deployment.resource,
                    name: application_name,
                },
                services: vec![service_ref],
                bind_as_files,
                detect_binding_resources: true,
                naming_strategy: None,
            },
        );

        let manifest = canonical_manifest(&binding)?;
        devfile.add_kubernetes_component(name, manifest)?;
        info!("added binding {name} to the devfile");
        Ok(devfile)
    }
}

/// YAML of a resource in the form the API server hands back: keys sorted,
/// null values and empty objects left out
fn canonical_manifest<T: serde::Serialize>(resource: &T) -> Result<String> {
    let value = serde_json::to_value(resource)
        .map_err(|e| anyhow::Error::new(e).context("Failed to serialize ServiceBinding"))?;
    let tree = to_canonical_yaml(value).unwrap_or(serde_yaml::Value::Null);
    serde_yaml::to_string(&tree)
        .map_err(|e| anyhow::Error::new(e).context("Failed to render ServiceBinding manifest"))
}

fn to_canonical_yaml(value: Value) -> Option<serde_yaml::Value> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(serde_yaml::Value::Bool(b)),
        Value::Number(n) => serde_yaml::to_value(&n).ok(),
        Value::String(s) => Some(serde_yaml::Value::String(s)),
        Value::Array(items) => Some(serde_yaml::Value::Sequence(
            items.into_iter().filter_map(to_canonical_yaml).collect(),
        )),
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mapping: serde_yaml::Mapping = entries
                .into_iter()
                .filter_map(|(k, v)| to_canonical_yaml(v).map(|v| (serde_yaml::Value::String(k), v)))
                .collect();
            (!mapping.is_empty()).then_some(serde_yaml::Value::Mapping(mapping))
        }
    }
}
