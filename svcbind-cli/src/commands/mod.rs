pub mod binding;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use binding::{AddBindingArgs, DescribeBindingArgs, ListBindingArgs, RemoveBindingArgs};

/// Settings shared by every command, after config and flags are merged
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub devfile: PathBuf,
    pub namespace: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a resource to the devfile
    Add {
        #[clap(subcommand)]
        resource: AddResource,
    },
    /// List resources from the devfile and the cluster
    List {
        #[clap(subcommand)]
        resource: ListResource,
    },
    /// Describe resources
    Describe {
        #[clap(subcommand)]
        resource: DescribeResource,
    },
    /// Remove a resource from the devfile
    Remove {
        #[clap(subcommand)]
        resource: RemoveResource,
    },
}

#[derive(Debug, Subcommand)]
pub enum AddResource {
    /// Bind the devfile's workload to a service instance
    Binding(AddBindingArgs),
}

#[derive(Debug, Subcommand)]
pub enum ListResource {
    /// List the bindings of the devfile and of the current namespace
    Binding(ListBindingArgs),
}

#[derive(Debug, Subcommand)]
pub enum DescribeResource {
    /// Describe one binding of the cluster, or every binding of the devfile
    Binding(DescribeBindingArgs),
}

#[derive(Debug, Subcommand)]
pub enum RemoveResource {
    /// Remove a binding from the devfile
    Binding(RemoveBindingArgs),
}

pub async fn handle_command(command: Commands, globals: &GlobalArgs) -> Result<()> {
    match command {
        Commands::Add {
            resource: AddResource::Binding(args),
        } => binding::add(args, globals).await,
        Commands::List {
            resource: ListResource::Binding(args),
        } => binding::list(args, globals).await,
        Commands::Describe {
            resource: DescribeResource::Binding(args),
        } => binding::describe(args, globals).await,
        Commands::Remove {
            resource: RemoveResource::Binding(args),
        } => binding::remove(args, globals),
    }
}
