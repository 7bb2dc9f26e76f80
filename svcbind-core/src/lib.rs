//! Service Binding management for devfile-based workloads
//!
//! Bindings between an application and backing services live in two places:
//! inlined `ServiceBinding` manifests in the devfile, and `ServiceBinding`
//! resources reconciled on the cluster. [`BindingClient`] adds and removes the
//! former and merges both into a single list.

pub mod api;
pub mod asker;
pub mod backend;
pub mod binding;
pub mod binding_list;
pub mod devfile;
pub mod error;
pub mod kclient;

pub use api::{RunningMode, RunningModes, ServiceBinding, ServiceBindingSpec, ServiceBindingStatus};
pub use asker::Asker;
pub use backend::{BackendKind, Flags};
pub use binding::{AddInputs, BindingClient};
pub use binding_list::BindingList;
pub use devfile::Devfile;
pub use error::BindingError;
pub use kclient::{ClusterClient, KubernetesClient};
