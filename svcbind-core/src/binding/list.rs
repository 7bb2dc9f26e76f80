use std::path::Path;

use anyhow::Result;
use kube::ResourceExt;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{BindingClient, first_manifest_document, from_spec_binding, manifest_identity};
use crate::api::{self, MODE_LABEL, ServiceBinding};
use crate::binding_list::BindingList;
use crate::devfile::Devfile;
use crate::kclient::crd::{operator, spec};

enum DevfileBinding {
    Operator(Box<operator::ServiceBinding>),
    Spec(Box<spec::ServiceBinding>),
}

fn parse_binding<T: DeserializeOwned>(document: serde_yaml::Value, component: &str) -> Result<T> {
    serde_yaml::from_value(document).map_err(|e| {
        anyhow::Error::new(e).context(format!("Invalid ServiceBinding in component {component}"))
    })
}

impl BindingClient {
    /// Typed `ServiceBinding` resources declared as Kubernetes components
    fn devfile_bindings(devfile: &Devfile, context: &Path) -> Result<Vec<DevfileBinding>> {
        let mut result = Vec::new();
        for component in devfile.kubernetes_components() {
            let manifest = devfile.kubernetes_manifest(component, context)?;
            let Some(document) = first_manifest_document(&manifest)? else {
                continue;
            };
            let (api_version, kind, _) = manifest_identity(&document);
            let (api_version, kind) = (api_version.to_string(), kind.to_string());
            let parsed = match (api_version.as_str(), kind.as_str()) {
                (operator::API_VERSION, operator::KIND) => {
                    DevfileBinding::Operator(Box::new(parse_binding(document, &component.name)?))
                }
                (spec::API_VERSION, spec::KIND) => {
                    DevfileBinding::Spec(Box::new(parse_binding(document, &component.name)?))
                }
                _ => {
                    debug!("component {} is a {kind}, not a binding", component.name);
                    continue;
                }
            };
            result.push(parsed);
        }
        Ok(result)
    }

    /// Bindings declared in the devfile, without status
    pub async fn get_bindings_from_devfile(&self, devfile: &Devfile, context: &Path) -> Result<Vec<ServiceBinding>> {
        let mut result = Vec::new();
        for binding in Self::devfile_bindings(devfile, context)? {
            let sb = match binding {
                DevfileBinding::Operator(b) => self.convert_operator_binding(&b).await?,
                DevfileBinding::Spec(b) => from_spec_binding(&b),
            };
            result.push(sb);
        }
        Ok(result)
    }

    /// Bindings declared in the devfile, with the status of their cluster
    /// counterpart when there is one
    pub async fn describe_bindings_from_devfile(
        &self,
        devfile: &Devfile,
        context: &Path,
    ) -> Result<Vec<ServiceBinding>> {
        let mut result = Vec::new();
        for binding in Self::devfile_bindings(devfile, context)? {
            let sb = match binding {
                DevfileBinding::Operator(b) => {
                    let mut sb = self.convert_operator_binding(&b).await?;
                    sb.status = self.get_status_from_binding(&sb.name).await?;
                    sb
                }
                DevfileBinding::Spec(b) => {
                    let mut sb = from_spec_binding(&b);
                    sb.status = self.get_status_from_spec(&sb.name).await?;
                    sb
                }
            };
            result.push(sb);
        }
        Ok(result)
    }

    /// Merge the devfile bindings with the bindings found on the cluster.
    ///
    /// Returns the bindings sorted by name, a cluster binding replacing the
    /// devfile one of the same name, and the names declared in the devfile in
    /// devfile order.
    pub async fn list_all_bindings(
        &self,
        devfile: &Devfile,
        context: &Path,
    ) -> Result<(Vec<ServiceBinding>, Vec<String>)> {
        let mut list = BindingList::new();
        let mut names_in_devfile = Vec::new();

        for binding in self.get_bindings_from_devfile(devfile, context).await? {
            names_in_devfile.push(binding.name.clone());
            list.upsert(binding);
        }

        let Some(kube) = self.kubernetes_client.as_deref() else {
            debug!("no cluster, listing devfile bindings only");
            return Ok((list.into_sorted_vec(), names_in_devfile));
        };

        let (specs, bindings) = kube.list_service_bindings_from_all_groups().await?;
        let cluster_objects = specs
            .iter()
            .map(|b| (b.name_any(), b.labels().get(MODE_LABEL).cloned()))
            .chain(
                bindings
                    .iter()
                    .map(|b| (b.name_any(), b.labels().get(MODE_LABEL).cloned())),
            );

        for (name, mode) in cluster_objects {
            let mut sb = self.get_binding_from_cluster(&name).await?;
            sb.status = api::with_running_mode(sb.status, mode.as_deref());
            if list.upsert(sb).is_some() {
                debug!("cluster binding {name} replaces the devfile one");
            }
        }

        Ok((list.into_sorted_vec(), names_in_devfile))
    }
}
