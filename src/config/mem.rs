use parking_lot::Mutex;
use tracing::debug;

use crate::config::{Configuration, Configurator};
use crate::error::{Error, Result};
use crate::plugin::Plugin;

/// In-memory copy of an upstream configurator.
///
/// The upstream is read once on construction; afterwards reads are served
/// from memory and every mutation is forwarded upstream first, then applied
/// locally only if the upstream call succeeded.
pub struct MemConfigurator<C> {
    upstream: C,
    config: Mutex<Configuration>,
}

impl<C: Configurator> MemConfigurator<C> {
    pub fn new(upstream: C) -> Result<Self> {
        let config = upstream.config()?;
        debug!(plugins = config.plugins.len(), "configuration cached");

        Ok(Self {
            upstream,
            config: Mutex::new(config),
        })
    }

    pub fn upstream(&self) -> &C {
        &self.upstream
    }

    fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let mut config = self.config.lock();

        if enabled {
            self.upstream.enable_plugin(name)?;
        } else {
            self.upstream.disable_plugin(name)?;
        }

        let plugin = config
            .plugins
            .get_mut(name)
            .ok_or(Error::PluginNotExist)?;
        plugin.enabled = enabled;
        Ok(())
    }
}

impl<C: Configurator> Configurator for MemConfigurator<C> {
    fn config(&self) -> Result<Configuration> {
        Ok(self.config.lock().clone())
    }

    fn set_plugin(&self, plugin: Plugin) -> Result<()> {
        let mut config = self.config.lock();

        self.upstream.set_plugin(plugin.clone())?;
        config.plugins.upsert(plugin);
        Ok(())
    }

    fn remove_plugin(&self, name: &str) -> Result<()> {
        let mut config = self.config.lock();

        self.upstream.remove_plugin(name)?;
        config.plugins.remove(name);
        Ok(())
    }

    fn enable_plugin(&self, name: &str) -> Result<()> {
        self.set_enabled(name, true)
    }

    fn disable_plugin(&self, name: &str) -> Result<()> {
        self.set_enabled(name, false)
    }
}
