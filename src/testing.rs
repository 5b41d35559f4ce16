//! Test doubles shared by the unit tests.

use parking_lot::Mutex;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{Configuration, Configurator};
use crate::error::{Error, Result};
use crate::fs::{Fs, OsFs};
use crate::plugin::Plugin;

/// `OsFs` with switchable failures.
#[derive(Debug, Default)]
pub struct FaultyFs {
    exists: bool,
    read: bool,
    write: bool,
    remove: bool,
}

impl FaultyFs {
    pub fn fail_exists(mut self) -> Self {
        self.exists = true;
        self
    }

    pub fn fail_read(mut self) -> Self {
        self.read = true;
        self
    }

    pub fn fail_write(mut self) -> Self {
        self.write = true;
        self
    }

    pub fn fail_remove(mut self) -> Self {
        self.remove = true;
        self
    }
}

fn injected(op: &str) -> io::Error {
    io::Error::other(format!("{op} failed"))
}

impl Fs for FaultyFs {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        if self.exists {
            return Err(injected("stat"));
        }
        OsFs.exists(path)
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        if self.exists {
            return Err(injected("stat"));
        }
        OsFs.is_dir(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        if self.read {
            return Err(injected("read"));
        }
        OsFs.read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        if self.write {
            return Err(injected("write"));
        }
        OsFs.write(path, data)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if self.write {
            return Err(injected("mkdir"));
        }
        OsFs.create_dir_all(path)
    }

    fn remove_all(&self, path: &Path) -> io::Result<()> {
        if self.remove {
            return Err(injected("remove"));
        }
        OsFs.remove_all(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if self.read {
            return Err(injected("read dir"));
        }
        OsFs.read_dir(path)
    }
}

/// Storage failure as the file store would report it.
fn stub_error(message: &str) -> Error {
    Error::io("stub.yaml", io::Error::other(message.to_string()))
}

/// In-memory configurator that records calls and can be told to fail.
#[derive(Debug, Default)]
pub struct StubConfigurator {
    state: Mutex<StubState>,
}

#[derive(Debug, Default)]
struct StubState {
    config: Configuration,
    calls: Vec<String>,
    fail_config: bool,
    fail_writes: bool,
}

impl StubConfigurator {
    pub fn with_plugins(plugins: impl IntoIterator<Item = Plugin>) -> Self {
        let stub = Self::default();
        stub.state.lock().config.plugins = plugins.into_iter().collect();
        stub
    }

    pub fn set_fail_config(&self, fail: bool) {
        self.state.lock().fail_config = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Mutates the stored configuration without recording a call.
    pub fn tamper(&self, apply: impl FnOnce(&mut Configuration)) {
        apply(&mut self.state.lock().config);
    }

    fn write(&self, call: String, apply: impl FnOnce(&mut Configuration) -> Result<()>) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(call);

        if state.fail_writes {
            return Err(stub_error("config error"));
        }

        apply(&mut state.config)
    }

    fn set_enabled(&self, call: String, name: &str, enabled: bool) -> Result<()> {
        self.write(call, |config| {
            let plugin = config.plugins.get_mut(name).ok_or(Error::PluginNotExist)?;
            plugin.enabled = enabled;
            Ok(())
        })
    }
}

impl Configurator for StubConfigurator {
    fn config(&self) -> Result<Configuration> {
        let mut state = self.state.lock();
        state.calls.push("config".to_string());

        if state.fail_config {
            return Err(stub_error("load error"));
        }

        Ok(state.config.clone())
    }

    fn set_plugin(&self, plugin: Plugin) -> Result<()> {
        self.write(format!("set_plugin {}", plugin.name), |config| {
            config.plugins.upsert(plugin);
            Ok(())
        })
    }

    fn remove_plugin(&self, name: &str) -> Result<()> {
        self.write(format!("remove_plugin {name}"), |config| {
            config
                .plugins
                .remove(name)
                .map(|_| ())
                .ok_or(Error::PluginNotExist)
        })
    }

    fn enable_plugin(&self, name: &str) -> Result<()> {
        self.set_enabled(format!("enable_plugin {name}"), name, true)
    }

    fn disable_plugin(&self, name: &str) -> Result<()> {
        self.set_enabled(format!("disable_plugin {name}"), name, false)
    }
}
