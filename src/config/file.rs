use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{Codec, Configuration, Configurator};
use crate::error::{Error, Result};
use crate::fs::{Fs, OsFs};
use crate::plugin::Plugin;

/// Configurator backed by a single structured file.
///
/// Every operation holds the instance lock for its whole load, modify and
/// write cycle. Writes truncate and rewrite the file; there is no protection
/// against a crash mid-write and no locking against other processes.
pub struct FileConfigurator {
    fs: Arc<dyn Fs>,
    config_file: PathBuf,
    codec: Codec,
    lock: Mutex<()>,
}

impl FileConfigurator {
    pub fn new(config_file: impl Into<PathBuf>) -> Self {
        let config_file = config_file.into();

        Self {
            fs: Arc::new(OsFs),
            codec: Codec::for_path(&config_file),
            config_file,
            lock: Mutex::new(()),
        }
    }

    pub fn with_fs(mut self, fs: Arc<dyn Fs>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn path(&self) -> &Path {
        &self.config_file
    }

    fn load_locked(&self) -> Result<Configuration> {
        let exists = self
            .fs
            .exists(&self.config_file)
            .map_err(|err| Error::io(&self.config_file, err))?;

        if !exists {
            debug!(path = %self.config_file.display(), "config file not found, using empty");
            return Ok(Configuration::default());
        }

        let raw = self
            .fs
            .read(&self.config_file)
            .map_err(|err| Error::io(&self.config_file, err))?;

        self.codec.decode(&raw).map_err(|source| Error::Decode {
            path: self.config_file.clone(),
            source,
        })
    }

    fn write_locked(&self, config: &Configuration) -> Result<()> {
        let raw = self.codec.encode(config).map_err(|source| Error::Encode {
            path: self.config_file.clone(),
            source,
        })?;

        self.fs
            .write(&self.config_file, &raw)
            .map_err(|err| Error::io(&self.config_file, err))?;

        debug!(
            path = %self.config_file.display(),
            plugins = config.plugins.len(),
            "config file written"
        );
        Ok(())
    }

    fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Configuration) -> Result<()>,
    {
        let _guard = self.lock.lock();

        let mut config = self.load_locked()?;
        apply(&mut config)?;
        self.write_locked(&config)
    }

    fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        self.update(|config| {
            let Some(plugin) = config.plugins.get_mut(name) else {
                warn!(plugin = name, "plugin not found");
                return Err(Error::PluginNotExist);
            };

            plugin.enabled = enabled;
            Ok(())
        })?;

        info!(plugin = name, enabled, "plugin state changed");
        Ok(())
    }
}

impl Configurator for FileConfigurator {
    fn config(&self) -> Result<Configuration> {
        let _guard = self.lock.lock();
        self.load_locked()
    }

    fn set_plugin(&self, plugin: Plugin) -> Result<()> {
        let name = plugin.name.clone();

        self.update(|config| {
            config.plugins.upsert(plugin);
            Ok(())
        })?;

        info!(plugin = %name, "plugin recorded");
        Ok(())
    }

    fn remove_plugin(&self, name: &str) -> Result<()> {
        self.update(|config| {
            if config.plugins.remove(name).is_none() {
                warn!(plugin = name, "plugin not found");
                return Err(Error::PluginNotExist);
            }
            Ok(())
        })?;

        info!(plugin = name, "plugin removed");
        Ok(())
    }

    fn enable_plugin(&self, name: &str) -> Result<()> {
        self.set_enabled(name, true)
    }

    fn disable_plugin(&self, name: &str) -> Result<()> {
        self.set_enabled(name, false)
    }
}
