//! Input resolution strategies
//!
//! Every binding operation resolves its inputs either from command-line flags
//! or by prompting. The strategy is picked once per operation with
//! [`BackendKind::for_flags`] and then used for every input of that operation.

pub mod flags;
pub mod interactive;

use std::collections::HashMap;

use anyhow::Result;

pub use flags::FlagsBackend;
pub use interactive::InteractiveBackend;

pub const FLAG_NAME: &str = "name";
pub const FLAG_SERVICE: &str = "service";
pub const FLAG_BIND_AS_FILES: &str = "bind-as-files";

/// Binding flags given on the command line, keyed by flag name without dashes
pub type Flags = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Flags,
    Interactive,
}

impl BackendKind {
    pub fn for_flags(flags: &Flags) -> Self {
        if flags.is_empty() {
            Self::Interactive
        } else {
            Self::Flags
        }
    }
}

/// Inputs of the add-binding operation
pub trait AddBindingBackend {
    fn validate(&self, flags: &Flags) -> Result<()>;

    /// Pick one of `candidates` (sorted display names of the service instances)
    fn select_service_instance(&self, flags: &Flags, candidates: &[String]) -> Result<String>;

    fn ask_binding_name(&self, default_name: &str, flags: &Flags) -> Result<String>;

    fn ask_bind_as_files(&self, flags: &Flags) -> Result<bool>;
}

/// Inputs of the remove-binding operation
pub trait RemoveBindingBackend {
    fn validate(&self, flags: &Flags) -> Result<()>;

    fn select_binding_name(&self, flags: &Flags, candidates: &[String]) -> Result<String>;
}

/// The backend chosen for one operation
#[derive(Clone, Copy)]
pub enum Backend<'a> {
    Flags(&'a FlagsBackend),
    Interactive(&'a InteractiveBackend),
}

impl Backend<'_> {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Flags(_) => BackendKind::Flags,
            Self::Interactive(_) => BackendKind::Interactive,
        }
    }
}

impl AddBindingBackend for Backend<'_> {
    fn validate(&self, flags: &Flags) -> Result<()> {
        match self {
            Self::Flags(b) => AddBindingBackend::validate(*b, flags),
            Self::Interactive(b) => AddBindingBackend::validate(*b, flags),
        }
    }

    fn select_service_instance(&self, flags: &Flags, candidates: &[String]) -> Result<String> {
        match self {
            Self::Flags(b) => b.select_service_instance(flags, candidates),
            Self::Interactive(b) => b.select_service_instance(flags, candidates),
        }
    }

    fn ask_binding_name(&self, default_name: &str, flags: &Flags) -> Result<String> {
        match self {
            Self::Flags(b) => b.ask_binding_name(default_name, flags),
            Self::Interactive(b) => b.ask_binding_name(default_name, flags),
        }
    }

    fn ask_bind_as_files(&self, flags: &Flags) -> Result<bool> {
        match self {
            Self::Flags(b) => b.ask_bind_as_files(flags),
            Self::Interactive(b) => b.ask_bind_as_files(flags),
        }
    }
}

impl RemoveBindingBackend for Backend<'_> {
    fn validate(&self, flags: &Flags) -> Result<()> {
        match self {
            Self::Flags(b) => RemoveBindingBackend::validate(*b, flags),
            Self::Interactive(b) => RemoveBindingBackend::validate(*b, flags),
        }
    }

    fn select_binding_name(&self, flags: &Flags, candidates: &[String]) -> Result<String> {
        match self {
            Self::Flags(b) => b.select_binding_name(flags, candidates),
            Self::Interactive(b) => b.select_binding_name(flags, candidates),
        }
    }
}
