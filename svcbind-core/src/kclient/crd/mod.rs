//! Custom resources read from and written to the cluster
//!
//! Both binding APIs name their kind `ServiceBinding`; they live in separate
//! modules and are referred to as `operator::ServiceBinding` and
//! `spec::ServiceBinding`.

pub mod operator;
pub mod spec;

use serde::{Deserialize, Serialize};

/// Condition type set once the binding data has been projected into the workload
pub const INJECTION_READY: &str = "InjectionReady";

/// Subset of `metav1.Condition` the binding workflows look at
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BindingCondition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `true` when the condition of the given type has status `True`
pub fn is_condition_true(conditions: &[BindingCondition], type_: &str) -> bool {
    conditions
        .iter()
        .any(|c| c.type_ == type_ && c.status == "True")
}

/// `status` of the cluster-scoped `BindableKinds` resource named `bindable-kinds`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BindableKindsStatus {
    pub group: String,
    pub version: String,
    pub kind: String,
}

pub const BINDABLE_KINDS_RESOURCE: &str = "bindablekinds";
pub const BINDABLE_KINDS_NAME: &str = "bindable-kinds";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injection_ready() {
        let conditions = vec![
            BindingCondition {
                type_: "CollectionReady".to_string(),
                status: "True".to_string(),
                ..Default::default()
            },
            BindingCondition {
                type_: INJECTION_READY.to_string(),
                status: "False".to_string(),
                ..Default::default()
            },
        ];
        assert!(!is_condition_true(&conditions, INJECTION_READY));
        assert!(is_condition_true(&conditions, "CollectionReady"));
    }

    #[test]
    fn test_operator_binding_defaults_bind_as_files() {
        let binding: operator::ServiceBinding = serde_yaml::from_str(
            r"
apiVersion: binding.operators.coreos.com/v1alpha1
kind: ServiceBinding
metadata:
  name: b
spec:
  application:
    group: apps
    version: v1
    resource: deployments
    name: app
  services:
  - group: postgresql.k8s.enterprisedb.io
    version: v1
    kind: Cluster
    name: cluster-sample
",
        )
        .unwrap();
        assert!(binding.spec.bind_as_files);
        assert!(!binding.spec.detect_binding_resources);
        assert_eq!(binding.spec.application.resource, "deployments");
        assert_eq!(binding.spec.services[0].kind, "Cluster");
    }
}
