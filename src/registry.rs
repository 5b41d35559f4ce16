use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::{CONFIG_FILE, Configuration, Configurator, FileConfigurator, MemConfigurator};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::fs::{Fs, OsFs};
use crate::installer::InstallerRegistry;
use crate::plugin::{Plugin, plugin_dir};

/// Plugins installed under one directory, with their state recorded in a
/// configuration file.
pub struct Registry {
    fs: Arc<dyn Fs>,
    config: Box<dyn Configurator>,
    installers: Arc<InstallerRegistry>,
    path: PathBuf,
}

pub struct RegistryBuilder {
    path: PathBuf,
    fs: Option<Arc<dyn Fs>>,
    configurator: Option<Box<dyn Configurator>>,
    config_file: Option<PathBuf>,
    installers: Option<Arc<InstallerRegistry>>,
}

impl RegistryBuilder {
    pub fn fs(mut self, fs: Arc<dyn Fs>) -> Self {
        self.fs = Some(fs);
        self
    }

    pub fn configurator(mut self, configurator: impl Configurator + 'static) -> Self {
        self.configurator = Some(Box::new(configurator));
        self
    }

    /// Overrides `<path>/config.yaml`. Ignored when a configurator is set.
    pub fn config_file(mut self, config_file: impl Into<PathBuf>) -> Self {
        self.config_file = Some(config_file.into());
        self
    }

    pub fn installers(mut self, installers: Arc<InstallerRegistry>) -> Self {
        self.installers = Some(installers);
        self
    }

    /// Without an explicit configurator this reads the configuration file
    /// once, and fails if it cannot be loaded.
    pub fn build(self) -> Result<Registry> {
        let fs = self.fs.unwrap_or_else(|| Arc::new(OsFs));

        let config = match self.configurator {
            Some(configurator) => configurator,
            None => {
                let config_file = self
                    .config_file
                    .unwrap_or_else(|| self.path.join(CONFIG_FILE));
                let file = FileConfigurator::new(config_file).with_fs(Arc::clone(&fs));
                Box::new(MemConfigurator::new(file)?)
            }
        };

        Ok(Registry {
            fs,
            config,
            installers: self
                .installers
                .unwrap_or_else(|| Arc::new(InstallerRegistry::with_defaults())),
            path: self.path,
        })
    }
}

impl Registry {
    pub fn builder(path: impl Into<PathBuf>) -> RegistryBuilder {
        RegistryBuilder {
            path: path.into(),
            fs: None,
            configurator: None,
            config_file: None,
            installers: None,
        }
    }

    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(path).build()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn installers(&self) -> &InstallerRegistry {
        &self.installers
    }

    pub fn config(&self) -> Result<Configuration> {
        self.config.config()
    }

    pub fn get_plugin(&self, name: &str) -> Result<Option<Plugin>> {
        Ok(self.config()?.plugins.get(name).cloned())
    }

    pub fn enable(&self, name: &str) -> Result<()> {
        self.config.enable_plugin(name)
    }

    pub fn disable(&self, name: &str) -> Result<()> {
        self.config.disable_plugin(name)
    }

    /// Installs from `src` with the first installer that accepts it and
    /// records the result. Reinstalling keeps the recorded enabled flag.
    pub fn install(&self, ctx: &Context, src: &str) -> Result<Plugin> {
        let ctx = ctx.with_fs(Arc::clone(&self.fs));

        let installer = self.installers.find(&ctx, src)?;
        let mut plugin = installer.install(&ctx, &self.path, src)?;
        plugin_dir(&self.path, &plugin.name)?;

        if let Some(existing) = self.get_plugin(&plugin.name)? {
            plugin.enabled = existing.enabled;
        }

        self.config.set_plugin(plugin.clone())?;

        info!(plugin = %plugin.name, version = %plugin.version, source = src, "plugin installed");
        Ok(plugin)
    }

    /// Removes the plugin directory, then the recorded entry, so a failed
    /// removal leaves the plugin recorded.
    pub fn uninstall(&self, name: &str) -> Result<()> {
        if !self.config()?.plugins.has(name) {
            return Err(Error::PluginNotExist);
        }

        let dir = plugin_dir(&self.path, name)?;
        self.fs.remove_all(&dir).map_err(|err| Error::io(&dir, err))?;
        self.config.remove_plugin(name)?;

        info!(plugin = name, "plugin uninstalled");
        Ok(())
    }
}
