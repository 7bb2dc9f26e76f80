//! Domain errors raised by the binding workflows
//!
//! Collaborator failures (Kubernetes API, filesystem) travel as `anyhow::Error`
//! and are never wrapped; the variants here are the errors this crate decides
//! on its own, so callers can `downcast_ref::<BindingError>()` when they need
//! to tell them apart.

use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BindingError {
    #[snafu(display("missing --{flag} parameter: {hint}"))]
    MissingFlag { flag: &'static str, hint: &'static str },

    #[snafu(display(
        "{key} \"{value}\" is not valid, {key} should conform the following requirements:\n\
         - Contain at most 63 characters\n\
         - Contain only lowercase alphanumeric characters or '-'\n\
         - Start with an alphanumeric character\n\
         - End with an alphanumeric character\n\
         - Must not contain all numeric values"
    ))]
    InvalidResourceName { key: String, value: String },

    #[snafu(display("unable to set {value:?} to --{flag}, value must be a boolean"))]
    InvalidBool { flag: &'static str, value: String },

    #[snafu(display("{service:?} service not found"))]
    ServiceNotFound { service: String },

    #[snafu(display(
        "found more than one service with name {name:?} [{}]; please use <name>/<kind>.<apigroup> to select one",
        candidates.join(", ")
    ))]
    AmbiguousService { name: String, candidates: Vec<String> },

    #[snafu(display(
        "unable to find a binding with name {name:?} in the devfile; available binding names are: {}",
        candidates.join(", ")
    ))]
    BindingNotFound { name: String, candidates: Vec<String> },

    #[snafu(display("ServiceBinding {name:?} not found"))]
    BindingNotOnCluster { name: String },

    #[snafu(display("component {name:?} already exists in the devfile"))]
    DuplicateComponent { name: String },

    #[snafu(display("component {name:?} not found in the devfile"))]
    ComponentNotFound { name: String },

    #[snafu(display("devfile has no metadata.name, unable to derive the workload name"))]
    MissingComponentName,

    #[snafu(display("component {name:?} has neither inlined content nor a uri"))]
    EmptyKubernetesComponent { name: String },

    #[snafu(display("failed to read devfile {}", path.display()))]
    ReadDevfile { path: PathBuf, source: std::io::Error },

    #[snafu(display("failed to parse devfile {}", path.display()))]
    ParseDevfile { path: PathBuf, source: serde_yaml::Error },

    #[snafu(display("this operation needs access to a Kubernetes cluster"))]
    NoCluster,

    #[snafu(display(
        "Service Binding Operator is not installed on the cluster, please ensure it is installed before proceeding"
    ))]
    ServiceBindingNotSupported,

    #[snafu(display(
        "No bindable operators found on the cluster. Please ensure that at least one bindable operator is installed successfully before proceeding"
    ))]
    NoBindableOperators,
}
