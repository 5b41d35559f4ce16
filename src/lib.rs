//! Registry of installed plugins.
//!
//! Tracks plugin metadata, enabled state and per-platform artifacts in a
//! structured file, and installs plugins through pluggable backends chosen by
//! the shape of the source string.

pub mod config;
pub mod context;
pub mod error;
pub mod fs;
pub mod installer;
pub mod plugin;
pub mod registry;
pub mod settings;

#[cfg(test)]
mod testing;

pub use config::{Configuration, Configurator, FileConfigurator, MemConfigurator};
pub use context::Context;
pub use error::{Error, Result};
pub use installer::{CallbackInstaller, Installer, InstallerRegistry, LocalInstaller};
pub use plugin::{Artifact, ArtifactIdentifier, Platform, Plugin, Plugins};
pub use registry::{Registry, RegistryBuilder};
