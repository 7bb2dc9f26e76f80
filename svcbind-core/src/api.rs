//! Group-agnostic view of a ServiceBinding
//!
//! Bindings come from two CRD groups (`binding.operators.coreos.com` and
//! `servicebinding.io`) and from devfile manifests. Everything is converted
//! into [`ServiceBinding`] before being merged or displayed.

use k8s_openapi::api::core::v1::ObjectReference;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label carrying the mode a resource was deployed in
pub const MODE_LABEL: &str = "odo.dev/mode";

/// Root under which bound files are mounted in the workload
pub const SERVICE_BINDING_ROOT: &str = "${SERVICE_BINDING_ROOT}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceBinding {
    pub name: String,
    pub spec: ServiceBindingSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ServiceBindingStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBindingSpec {
    pub application: ObjectReference,
    #[serde(default)]
    pub services: Vec<ObjectReference>,
    pub detect_binding_resources: bool,
    pub bind_as_files: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub naming_strategy: String,
}

/// Binding information only known once the operator has reconciled the binding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBindingStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binding_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binding_env_vars: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_in: Option<RunningModes>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunningMode {
    Dev,
    Deploy,
}

impl RunningMode {
    /// Map a `odo.dev/mode` label value to a running mode
    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "Dev" => Some(Self::Dev),
            "Deploy" => Some(Self::Deploy),
            _ => None,
        }
    }
}

impl fmt::Display for RunningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dev => write!(f, "Dev"),
            Self::Deploy => write!(f, "Deploy"),
        }
    }
}

/// Set of modes a binding is running in, serialized as `{"dev": .., "deploy": ..}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningModes {
    pub dev: bool,
    pub deploy: bool,
}

impl RunningModes {
    pub fn insert(&mut self, mode: RunningMode) {
        match mode {
            RunningMode::Dev => self.dev = true,
            RunningMode::Deploy => self.deploy = true,
        }
    }

    pub fn contains(&self, mode: RunningMode) -> bool {
        match mode {
            RunningMode::Dev => self.dev,
            RunningMode::Deploy => self.deploy,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.dev && !self.deploy
    }
}

impl fmt::Display for RunningModes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modes: Vec<String> = [RunningMode::Dev, RunningMode::Deploy]
            .into_iter()
            .filter(|m| self.contains(*m))
            .map(|m| m.to_string())
            .collect();
        if modes.is_empty() {
            write!(f, "None")
        } else {
            write!(f, "{}", modes.join(", "))
        }
    }
}

/// Record the running mode carried by a cluster object's mode label.
///
/// The status is created on demand. An absent or unknown label leaves the
/// status untouched.
pub fn with_running_mode(
    status: Option<ServiceBindingStatus>,
    mode_label: Option<&str>,
) -> Option<ServiceBindingStatus> {
    let Some(mode) = mode_label.and_then(RunningMode::from_label) else {
        return status;
    };
    let mut status = status.unwrap_or_default();
    status
        .running_in
        .get_or_insert_with(RunningModes::default)
        .insert(mode);
    Some(status)
}

/// Split an `apiVersion` into its group and version (core group is empty)
pub fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

/// Join a group and version back into an `apiVersion`
pub fn join_api_version(group: &str, version: &str) -> String {
    if group.is_empty() {
        version.to_string()
    } else {
        format!("{group}/{version}")
    }
}

/// Human label for a service reference: `<name> (<Kind>.<group>)`
pub fn service_display_name(service: &ObjectReference) -> String {
    let api_version = service.api_version.as_deref().unwrap_or_default();
    let (group, _) = split_api_version(api_version);
    let kind = service.kind.as_deref().unwrap_or_default();
    let name = service.name.as_deref().unwrap_or_default();
    let mut label = format!("{name} ({kind}.{group})");
    if let Some(ns) = service.namespace.as_deref().filter(|ns| !ns.is_empty()) {
        label.push_str(&format!(" (namespace: {ns})"));
    }
    label
}
