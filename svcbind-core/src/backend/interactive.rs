//! Inputs taken from terminal prompts

use anyhow::Result;

use super::{AddBindingBackend, Flags, RemoveBindingBackend};
use crate::asker::Asker;

pub struct InteractiveBackend {
    asker: Box<dyn Asker>,
}

impl InteractiveBackend {
    pub fn new(asker: Box<dyn Asker>) -> Self {
        Self { asker }
    }
}

fn sorted(candidates: &[String]) -> Vec<String> {
    let mut options = candidates.to_vec();
    options.sort();
    options
}

impl AddBindingBackend for InteractiveBackend {
    fn validate(&self, _flags: &Flags) -> Result<()> {
        Ok(())
    }

    fn select_service_instance(&self, _flags: &Flags, candidates: &[String]) -> Result<String> {
        self.asker.ask_service_instance(&sorted(candidates))
    }

    fn ask_binding_name(&self, default_name: &str, _flags: &Flags) -> Result<String> {
        self.asker.ask_service_binding_name(default_name)
    }

    fn ask_bind_as_files(&self, _flags: &Flags) -> Result<bool> {
        self.asker.ask_bind_as_files()
    }
}

impl RemoveBindingBackend for InteractiveBackend {
    fn validate(&self, _flags: &Flags) -> Result<()> {
        Ok(())
    }

    fn select_binding_name(&self, _flags: &Flags, candidates: &[String]) -> Result<String> {
        self.asker.ask_binding_to_remove(&sorted(candidates))
    }
}
