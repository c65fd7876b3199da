//! Execution coordinator and its in-flight registry.

mod config;
mod executor;
mod registry;

pub use config::CoordinatorConfig;
pub use executor::{Capabilities, ExecutionCoordinator};
pub use registry::{ExecutionRegistry, RegistryError};
