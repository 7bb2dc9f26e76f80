//! Terminal prompts backing the interactive mode

use anyhow::{Context, Result, bail};
use inquire::validator::Validation;
use inquire::{Select, Text};
use svcbind_core::Asker;
use svcbind_core::devfile::validate_k8s_resource_name;

const BIND_AS_FILES: &str = "Bind as Files";
const BIND_AS_ENV_VARS: &str = "Bind as Environment Variables";

pub struct InquireAsker;

impl Asker for InquireAsker {
    fn ask_service_instance(&self, options: &[String]) -> Result<String> {
        if options.is_empty() {
            bail!("no bindable service instance found");
        }
        Select::new("Select service instance you want to bind to:", options.to_vec())
            .prompt()
            .context("Failed to select a service instance")
    }

    fn ask_service_binding_name(&self, default_name: &str) -> Result<String> {
        Text::new("Enter the Binding's name")
            .with_default(default_name)
            .with_validator(|input: &str| {
                Ok(match validate_k8s_resource_name("binding name", input) {
                    Ok(()) => Validation::Valid,
                    Err(e) => Validation::Invalid(e.to_string().into()),
                })
            })
            .prompt()
            .context("Failed to read the binding name")
    }

    fn ask_bind_as_files(&self) -> Result<bool> {
        let choice = Select::new(
            "How do you want to bind the service?",
            vec![BIND_AS_FILES, BIND_AS_ENV_VARS],
        )
        .prompt()
        .context("Failed to select the binding mode")?;
        Ok(choice == BIND_AS_FILES)
    }

    fn ask_binding_to_remove(&self, options: &[String]) -> Result<String> {
        if options.is_empty() {
            bail!("no ServiceBinding found in the devfile");
        }
        Select::new("Select the binding you want to remove:", options.to_vec())
            .prompt()
            .context("Failed to select a binding")
    }
}
