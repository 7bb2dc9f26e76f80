//! Devfile document model
//!
//! Only the parts the binding workflows touch are typed (`metadata.name`,
//! `variables` and `components[].kubernetes`). Every other key is carried in
//! `extra` maps so a load → mutate → save cycle keeps the user's content.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use snafu::{OptionExt, ResultExt, ensure};
use tracing::debug;

use crate::error::{
    ComponentNotFoundSnafu, DuplicateComponentSnafu, EmptyKubernetesComponentSnafu,
    InvalidResourceNameSnafu, ParseDevfileSnafu, ReadDevfileSnafu,
};

static DNS1123_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

/// Hex floats are numeric for Go's `strconv.ParseFloat` but not for `f64::from_str`
static HEX_FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-f]+p-?[0-9]+$").expect("valid regex"));

static VARIABLE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_-]+)\s*\}\}").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Devfile {
    pub schema_version: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub variables: Mapping,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<KubernetesComponent>,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KubernetesComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inlined: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl Devfile {
    /// Load a devfile from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context(ReadDevfileSnafu { path })?;
        let devfile = serde_yaml::from_str(&content).context(ParseDevfileSnafu { path })?;
        debug!("loaded devfile {}", path.display());
        Ok(devfile)
    }

    /// Write the devfile back to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_yaml()?;
        std::fs::write(path, content).map_err(|e| {
            anyhow::Error::new(e).context(format!("Failed to write devfile {}", path.display()))
        })?;
        debug!("wrote devfile {}", path.display());
        Ok(())
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| anyhow::Error::new(e).context("Failed to parse devfile content"))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| anyhow::Error::new(e).context("Failed to serialize devfile"))
    }

    pub fn metadata_name(&self) -> &str {
        &self.metadata.name
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Components of type Kubernetes, in devfile order
    pub fn kubernetes_components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.kubernetes.is_some())
    }

    /// Append a Kubernetes component carrying an inlined manifest
    pub fn add_kubernetes_component(&mut self, name: &str, inlined: String) -> Result<()> {
        ensure!(
            self.component(name).is_none(),
            DuplicateComponentSnafu { name }
        );
        self.components.push(Component {
            name: name.to_string(),
            kubernetes: Some(KubernetesComponent {
                inlined: Some(inlined),
                ..Default::default()
            }),
            extra: Mapping::new(),
        });
        Ok(())
    }

    pub fn delete_component(&mut self, name: &str) -> Result<()> {
        let index = self
            .components
            .iter()
            .position(|c| c.name == name)
            .context(ComponentNotFoundSnafu { name })?;
        self.components.remove(index);
        Ok(())
    }

    /// Manifest text of a Kubernetes component with devfile variables substituted.
    ///
    /// `uri` components are read relative to `context`.
    pub fn kubernetes_manifest(&self, component: &Component, context: &Path) -> Result<String> {
        let kubernetes = component
            .kubernetes
            .as_ref()
            .context(EmptyKubernetesComponentSnafu {
                name: component.name.as_str(),
            })?;

        let raw = match (&kubernetes.inlined, &kubernetes.uri) {
            (Some(inlined), _) => inlined.clone(),
            (None, Some(uri)) => {
                let path = context.join(uri);
                std::fs::read_to_string(&path).map_err(|e| {
                    anyhow::Error::new(e).context(format!(
                        "Failed to read manifest {} of component {}",
                        path.display(),
                        component.name
                    ))
                })?
            }
            (None, None) => {
                return Err(EmptyKubernetesComponentSnafu {
                    name: component.name.as_str(),
                }
                .build()
                .into());
            }
        };

        Ok(self.substitute_variables(&raw))
    }

    /// Replace `{{VAR}}` references with the devfile's top-level variables.
    /// Unknown references are left as they are.
    pub fn substitute_variables(&self, text: &str) -> String {
        VARIABLE_REF
            .replace_all(text, |caps: &regex::Captures<'_>| {
                self.variables
                    .get(&caps[1])
                    .and_then(serde_yaml::Value::as_str)
                    .map_or_else(|| caps[0].to_string(), ToString::to_string)
            })
            .into_owned()
    }
}

/// Check that `value` is usable as a Kubernetes resource name (DNS-1123 label,
/// not purely numeric)
pub fn validate_k8s_resource_name(key: &str, value: &str) -> Result<()> {
    let numeric = value.parse::<f64>().is_ok() || HEX_FLOAT.is_match(value);
    ensure!(
        value.len() <= 63 && DNS1123_LABEL.is_match(value) && !numeric,
        InvalidResourceNameSnafu { key, value }
    );
    Ok(())
}
