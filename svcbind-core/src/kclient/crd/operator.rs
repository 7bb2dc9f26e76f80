//! `ServiceBinding.binding.operators.coreos.com/v1alpha1`

use kube::CustomResource;
use serde::{Deserialize, Serialize};

use super::BindingCondition;

pub const GROUP: &str = "binding.operators.coreos.com";
pub const VERSION: &str = "v1alpha1";
pub const KIND: &str = "ServiceBinding";
pub const PLURAL: &str = "servicebindings";
pub const API_VERSION: &str = "binding.operators.coreos.com/v1alpha1";

/// Binds one or more backing services to an application workload.
#[derive(CustomResource, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[kube(
    group = "binding.operators.coreos.com",
    version = "v1alpha1",
    kind = "ServiceBinding",
    plural = "servicebindings",
    status = "ServiceBindingStatus",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBindingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub application: Application,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default = "default_bind_as_files")]
    pub bind_as_files: bool,
    #[serde(default)]
    pub detect_binding_resources: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naming_strategy: Option<String>,
}

fn default_bind_as_files() -> bool {
    true
}

/// Workload reference, by kind or by resource
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Application {
    #[serde(default)]
    pub group: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource: String,
    pub name: String,
}

/// Backing service reference
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Service {
    #[serde(default)]
    pub group: String,
    pub version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ServiceBindingStatus {
    #[serde(default)]
    pub conditions: Vec<BindingCondition>,
    #[serde(default)]
    pub secret: String,
}
