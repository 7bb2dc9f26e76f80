//! Prompting capability used by the interactive backend
//!
//! The renderer lives with the CLI; the core only depends on this trait.

use anyhow::Result;

pub trait Asker: Send + Sync {
    /// Pick one service instance out of `options` (already sorted)
    fn ask_service_instance(&self, options: &[String]) -> Result<String>;

    /// Name of the binding, proposing `default_name`
    fn ask_service_binding_name(&self, default_name: &str) -> Result<String>;

    /// `true` to bind as files, `false` to bind as environment variables
    fn ask_bind_as_files(&self) -> Result<bool>;

    /// Pick the binding to remove out of `options`
    fn ask_binding_to_remove(&self, options: &[String]) -> Result<String>;
}
