use anyhow::anyhow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::fs::Fs;
use crate::installer::{Installer, InstallerRegistry};
use crate::plugin::{METADATA_FILE, Plugin, plugin_dir};

/// Installs a plugin from a directory on the local file store.
///
/// Accepts `path` or `file://path` sources pointing at a directory that
/// contains `.plugin.registry.yaml`. The tree is copied to `<dest>/<name>`,
/// replacing any previous copy.
pub struct LocalInstaller {
    fs: Arc<dyn Fs>,
}

impl LocalInstaller {
    pub const NAME: &'static str = "local";

    pub fn new(fs: Arc<dyn Fs>) -> Self {
        Self { fs }
    }

    pub fn register(registry: &InstallerRegistry) {
        registry.register(Self::NAME, Self::accepts, Self::new);
    }

    pub fn accepts(ctx: &Context, src: &str) -> bool {
        let dir = source_dir(src);
        let fs = ctx.fs();

        matches!(fs.is_dir(&dir), Ok(true))
            && matches!(fs.exists(&dir.join(METADATA_FILE)), Ok(true))
    }

    fn copy_dir_recursive(&self, ctx: &Context, src: &Path, dest: &Path) -> Result<()> {
        self.fs
            .create_dir_all(dest)
            .map_err(|err| Error::io(dest, err))?;

        let entries = self.fs.read_dir(src).map_err(|err| Error::io(src, err))?;

        for src_path in entries {
            if ctx.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let Some(file_name) = src_path.file_name() else {
                continue;
            };
            let dest_path = dest.join(file_name);

            let is_dir = self
                .fs
                .is_dir(&src_path)
                .map_err(|err| Error::io(&src_path, err))?;

            if is_dir {
                self.copy_dir_recursive(ctx, &src_path, &dest_path)?;
            } else {
                let data = self
                    .fs
                    .read(&src_path)
                    .map_err(|err| Error::io(&src_path, err))?;
                self.fs
                    .write(&dest_path, &data)
                    .map_err(|err| Error::io(&dest_path, err))?;
            }
        }

        Ok(())
    }
}

impl Installer for LocalInstaller {
    fn install(&self, ctx: &Context, dest: &Path, src: &str) -> Result<Plugin> {
        let src_dir = source_dir(src);
        let plugin = Plugin::load(self.fs.as_ref(), &src_dir)?;

        if plugin.name.is_empty() {
            return Err(anyhow!("plugin metadata in {} has no name", src_dir.display()).into());
        }

        let target = plugin_dir(dest, &plugin.name)?;
        if target.starts_with(&src_dir) || src_dir.starts_with(&target) {
            return Err(anyhow!(
                "source {} overlaps install directory {}",
                src_dir.display(),
                target.display()
            )
            .into());
        }

        debug!(source = %src_dir.display(), target = %target.display(), "copying plugin");

        self.fs
            .remove_all(&target)
            .map_err(|err| Error::io(&target, err))?;
        self.copy_dir_recursive(ctx, &src_dir, &target)?;

        info!(plugin = %plugin.name, version = %plugin.version, "plugin copied");
        Ok(plugin)
    }
}

fn source_dir(src: &str) -> PathBuf {
    PathBuf::from(src.strip_prefix("file://").unwrap_or(src))
}
