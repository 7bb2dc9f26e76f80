use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use super::{BindingClient, first_manifest_document, manifest_identity};
use crate::backend::{Flags, RemoveBindingBackend};
use crate::devfile::Devfile;
use crate::error::BindingNotFoundSnafu;

/// A `ServiceBinding` manifest found in a Kubernetes component
struct BindingComponent {
    component: String,
    binding: String,
}

impl BindingClient {
    fn binding_components(devfile: &Devfile, context: &Path) -> Vec<BindingComponent> {
        let mut result = Vec::new();
        for component in devfile.kubernetes_components() {
            let document = devfile
                .kubernetes_manifest(component, context)
                .and_then(|manifest| first_manifest_document(&manifest));
            let document = match document {
                Ok(Some(document)) => document,
                Ok(None) => continue,
                Err(err) => {
                    debug!("skipping component {}: {err:#}", component.name);
                    continue;
                }
            };
            let (_, kind, name) = manifest_identity(&document);
            if kind == "ServiceBinding" {
                result.push(BindingComponent {
                    component: component.name.clone(),
                    binding: name.to_string(),
                });
            }
        }
        result
    }

    /// Names of the bindings declared in the devfile, in devfile order
    pub fn get_binding_names_in_devfile(&self, devfile: &Devfile, context: &Path) -> Vec<String> {
        Self::binding_components(devfile, context)
            .into_iter()
            .map(|c| c.binding)
            .collect()
    }

    /// Name of the binding to remove, from `--name` or by prompting among the
    /// bindings of the devfile
    pub fn select_binding_to_remove(&self, flags: &Flags, devfile: &Devfile, context: &Path) -> Result<String> {
        let backend = self.select_backend(flags);
        backend.validate(flags)?;
        let candidates = self.get_binding_names_in_devfile(devfile, context);
        backend.select_binding_name(flags, &candidates)
    }

    /// Delete the component declaring the binding `name`
    pub fn remove_binding(&self, name: &str, mut devfile: Devfile, context: &Path) -> Result<Devfile> {
        let components = Self::binding_components(&devfile, context);
        let Some(found) = components.iter().find(|c| c.binding == name) else {
            let candidates: Vec<String> = components.into_iter().map(|c| c.binding).collect();
            return Err(BindingNotFoundSnafu { name, candidates }.build().into());
        };

        devfile.delete_component(&found.component)?;
        info!("removed binding {name} (component {})", found.component);
        Ok(devfile)
    }
}
