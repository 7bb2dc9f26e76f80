//! `add|list|describe|remove binding`

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use kube::ResourceExt;
use svcbind_core::backend::{AddBindingBackend, FLAG_BIND_AS_FILES, FLAG_NAME, FLAG_SERVICE, FlagsBackend};
use svcbind_core::kclient::gvk_of;
use svcbind_core::{BackendKind, BindingClient, ClusterClient, Devfile, KubernetesClient};
use tracing::{info, warn};

use super::GlobalArgs;
use crate::asker::InquireAsker;
use crate::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
}

#[derive(Debug, Args)]
pub struct AddBindingArgs {
    /// Service instance to bind, as <name>[/<kind>.<apigroup>]
    #[clap(long)]
    pub service: Option<String>,

    /// Name of the ServiceBinding
    #[clap(long)]
    pub name: Option<String>,

    /// Bind as files (true) or as environment variables (false)
    #[clap(long)]
    pub bind_as_files: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListBindingArgs {
    /// Output format
    #[clap(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

#[derive(Debug, Args)]
pub struct DescribeBindingArgs {
    /// Binding on the cluster to describe; all devfile bindings when absent
    #[clap(long)]
    pub name: Option<String>,

    /// Output format
    #[clap(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

#[derive(Debug, Args)]
pub struct RemoveBindingArgs {
    /// Name of the ServiceBinding to remove
    #[clap(long)]
    pub name: Option<String>,
}

fn flag_map(pairs: &[(&str, &Option<String>)]) -> HashMap<String, String> {
    pairs
        .iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| ((*k).to_string(), v.clone())))
        .collect()
}

fn context_dir(devfile: &Path) -> &Path {
    devfile
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

async fn connect(namespace: Option<String>) -> Result<Arc<dyn KubernetesClient>> {
    let client = ClusterClient::try_default(namespace).await?;
    Ok(Arc::new(client))
}

async fn connect_or_offline(namespace: Option<String>) -> Option<Arc<dyn KubernetesClient>> {
    match connect(namespace).await {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("cluster unavailable, showing devfile bindings only: {e:#}");
            None
        }
    }
}

pub async fn add(args: AddBindingArgs, globals: &GlobalArgs) -> Result<()> {
    let raw = flag_map(&[
        (FLAG_SERVICE, &args.service),
        (FLAG_NAME, &args.name),
        (FLAG_BIND_AS_FILES, &args.bind_as_files),
    ]);
    // flag errors are reported before any cluster access
    if BackendKind::for_flags(&raw) == BackendKind::Flags {
        FlagsBackend::new().validate(&raw)?;
    }

    let devfile = Devfile::load(&globals.devfile)?;
    let kube = connect(globals.namespace.clone()).await?;
    let namespace = kube.get_current_namespace();
    let client = BindingClient::new(Box::new(InquireAsker), Some(kube));
    let flags = client.get_flags(&raw);

    let instances = client.get_service_instances().await?;
    if instances.is_empty() {
        bail!("No bindable service instances found in namespace {namespace:?}");
    }

    let inputs = client.resolve_add_inputs(&flags, &devfile, &instances)?;
    let service = instances
        .get(&inputs.service)
        .with_context(|| format!("service {} disappeared", inputs.service))?;

    let devfile = client
        .add_binding(&inputs.name, inputs.bind_as_files, service, devfile)
        .await?;
    devfile.save(&globals.devfile)?;
    info!("binding {} written to {}", inputs.name, globals.devfile.display());

    println!("✅ Successfully added the binding to the devfile.");
    println!("   Apply the devfile to create the ServiceBinding on the cluster.");

    if inputs.backend == BackendKind::Interactive {
        let service_flag = match gvk_of(service) {
            Some(gvk) => format!("{}/{}.{}", service.name_any(), gvk.kind, gvk.group),
            None => service.name_any(),
        };
        println!();
        println!("You can automate this command by executing:");
        println!(
            "   svcbind add binding --service {service_flag} --name {} --bind-as-files={}",
            inputs.name, inputs.bind_as_files
        );
    }
    Ok(())
}

pub async fn list(args: ListBindingArgs, globals: &GlobalArgs) -> Result<()> {
    let devfile = Devfile::load(&globals.devfile)?;
    let kube = connect_or_offline(globals.namespace.clone()).await;
    let client = BindingClient::new(Box::new(InquireAsker), kube);

    let (bindings, in_devfile) = client
        .list_all_bindings(&devfile, context_dir(&globals.devfile))
        .await?;

    match args.output {
        Some(OutputFormat::Json) => output::print_json(&serde_json::json!({
            "bindings": bindings,
            "bindingsInDevfile": in_devfile,
        })),
        None => {
            output::print_binding_table(&bindings, &in_devfile, client.is_offline());
            Ok(())
        }
    }
}

pub async fn describe(args: DescribeBindingArgs, globals: &GlobalArgs) -> Result<()> {
    let bindings = match &args.name {
        Some(name) => {
            let kube = connect(globals.namespace.clone()).await?;
            let client = BindingClient::new(Box::new(InquireAsker), Some(kube));
            vec![client.get_binding_from_cluster(name).await?]
        }
        None => {
            let devfile = Devfile::load(&globals.devfile)?;
            let kube = connect_or_offline(globals.namespace.clone()).await;
            let client = BindingClient::new(Box::new(InquireAsker), kube);
            client
                .describe_bindings_from_devfile(&devfile, context_dir(&globals.devfile))
                .await?
        }
    };

    match args.output {
        Some(OutputFormat::Json) if args.name.is_some() => output::print_json(&bindings[0]),
        Some(OutputFormat::Json) => output::print_json(&bindings),
        None => {
            output::print_descriptions(&bindings);
            Ok(())
        }
    }
}

pub fn remove(args: RemoveBindingArgs, globals: &GlobalArgs) -> Result<()> {
    let raw = flag_map(&[(FLAG_NAME, &args.name)]);
    let context = context_dir(&globals.devfile);
    let devfile = Devfile::load(&globals.devfile)?;

    // removal only touches the devfile
    let client = BindingClient::new(Box::new(InquireAsker), None);
    let flags = client.get_flags(&raw);
    let name = client.select_binding_to_remove(&flags, &devfile, context)?;
    let devfile = client.remove_binding(&name, devfile, context)?;
    devfile.save(&globals.devfile)?;
    info!("binding {name} removed from {}", globals.devfile.display());

    println!("✅ Successfully removed the binding {name:?} from the devfile.");
    println!("   Apply the devfile to delete the ServiceBinding from the cluster.");
    Ok(())
}
