//! Persistence of the installed plugin set.
//!
//! [`Configurator`] is the contract; [`FileConfigurator`] keeps the set in a
//! structured file and [`MemConfigurator`] caches any other configurator in
//! memory, forwarding every write upstream before applying it locally.

pub mod codec;
pub mod file;
pub mod mem;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::plugin::{Plugin, Plugins};

pub use codec::Codec;
pub use file::FileConfigurator;
pub use mem::MemConfigurator;

/// Default name of the registry configuration file.
pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub plugins: Plugins,
}

/// Reads and mutates the persisted plugin set.
///
/// `remove_plugin`, `enable_plugin` and `disable_plugin` fail with
/// [`Error::PluginNotExist`](crate::Error::PluginNotExist) when `name` is not
/// recorded.
pub trait Configurator: Send + Sync {
    fn config(&self) -> Result<Configuration>;

    /// Inserts the plugin or replaces the entry with the same name.
    fn set_plugin(&self, plugin: Plugin) -> Result<()>;

    fn remove_plugin(&self, name: &str) -> Result<()>;

    fn enable_plugin(&self, name: &str) -> Result<()>;

    fn disable_plugin(&self, name: &str) -> Result<()>;
}

impl<T: Configurator + ?Sized> Configurator for Arc<T> {
    fn config(&self) -> Result<Configuration> {
        (**self).config()
    }

    fn set_plugin(&self, plugin: Plugin) -> Result<()> {
        (**self).set_plugin(plugin)
    }

    fn remove_plugin(&self, name: &str) -> Result<()> {
        (**self).remove_plugin(name)
    }

    fn enable_plugin(&self, name: &str) -> Result<()> {
        (**self).enable_plugin(name)
    }

    fn disable_plugin(&self, name: &str) -> Result<()> {
        (**self).disable_plugin(name)
    }
}

impl<T: Configurator + ?Sized> Configurator for Box<T> {
    fn config(&self) -> Result<Configuration> {
        (**self).config()
    }

    fn set_plugin(&self, plugin: Plugin) -> Result<()> {
        (**self).set_plugin(plugin)
    }

    fn remove_plugin(&self, name: &str) -> Result<()> {
        (**self).remove_plugin(name)
    }

    fn enable_plugin(&self, name: &str) -> Result<()> {
        (**self).enable_plugin(name)
    }

    fn disable_plugin(&self, name: &str) -> Result<()> {
        (**self).disable_plugin(name)
    }
}
