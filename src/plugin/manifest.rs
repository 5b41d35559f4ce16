use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::fs::Fs;
use crate::plugin::artifact::{Artifact, Artifacts, DEFAULT_ARTIFACT_FILE, Platform, substitute};

/// Metadata file a plugin ships in its own directory.
pub const METADATA_FILE: &str = ".plugin.registry.yaml";

/// Installed plugin record, keyed by `name`.
///
/// Decoding fills defaults first (`enabled: true`, no artifacts) and then
/// guarantees an artifact for the running OS exists, so a bare `{name: x}`
/// record decodes to an enabled plugin with the default artifact template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPlugin")]
pub struct Plugin {
    pub name: String,
    pub url: String,
    pub version: String,
    pub description: String,
    pub enabled: bool,
    pub hidden: bool,
    pub artifacts: Artifacts,
    pub tags: Tags,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            ..Self::default()
        }
    }

    /// Reads `.plugin.registry.yaml` from the plugin directory `dir`.
    pub fn load(fs: &dyn Fs, dir: &Path) -> Result<Self> {
        let path = dir.join(METADATA_FILE);

        let raw = fs
            .read(&path)
            .map_err(|err| metadata_error(dir, Error::io(&path, err)))?;

        serde_yaml::from_slice(&raw).map_err(|err| {
            metadata_error(
                dir,
                Error::Decode {
                    path,
                    source: err.into(),
                },
            )
        })
    }

    /// Artifact for the running platform.
    pub fn runtime_artifact(&self) -> Artifact {
        self.artifact_for(&Platform::current())
    }

    /// `os/arch` entry, then the `os` entry, then the default template.
    pub fn artifact_for(&self, platform: &Platform) -> Artifact {
        self.artifacts
            .get(&platform.identifier())
            .or_else(|| self.artifacts.get(&platform.identifier_without_arch()))
            .cloned()
            .unwrap_or_else(|| Artifact::new(DEFAULT_ARTIFACT_FILE))
    }

    /// Replaces `${name}`, `${version}`, `${os}` and `${arch}` in the
    /// artifact filename for the running platform.
    pub fn resolve_artifact(&self, artifact: &Artifact) -> Artifact {
        self.resolve_artifact_for(artifact, &Platform::current())
    }

    pub fn resolve_artifact_for(&self, artifact: &Artifact, platform: &Platform) -> Artifact {
        Artifact::new(substitute(
            &artifact.file,
            &[
                ("${name}", self.name.as_str()),
                ("${version}", self.version.as_str()),
                ("${os}", platform.os.as_str()),
                ("${arch}", platform.arch.as_str()),
            ],
        ))
    }

    fn ensure_platform_artifact(&mut self, platform: &Platform) {
        if self.artifacts.contains_key(&platform.identifier())
            || self.artifacts.contains_key(&platform.identifier_without_arch())
        {
            return;
        }

        self.artifacts
            .insert(platform.identifier(), Artifact::new(DEFAULT_ARTIFACT_FILE));
    }
}

/// Directory of the plugin `name` under `root`.
///
/// The name must be a single normal path component, so the result never
/// leaves `root`.
pub fn plugin_dir(root: &Path, name: &str) -> Result<PathBuf> {
    let mut components = Path::new(name).components();

    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(root.join(name)),
        _ => Err(Error::InvalidName(name.to_string())),
    }
}

fn metadata_error(dir: &Path, source: Error) -> Error {
    Error::Metadata {
        path: dir.to_path_buf(),
        source: Box::new(source),
    }
}

#[derive(Debug, Deserialize)]
struct RawPlugin {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    artifacts: Artifacts,
    #[serde(default)]
    tags: Tags,
}

impl From<RawPlugin> for Plugin {
    fn from(raw: RawPlugin) -> Self {
        let mut plugin = Self {
            name: raw.name,
            url: raw.url,
            version: raw.version,
            description: raw.description,
            enabled: raw.enabled,
            hidden: raw.hidden,
            artifacts: raw.artifacts,
            tags: raw.tags,
        };

        plugin.ensure_platform_artifact(&Platform::current());
        plugin
    }
}

fn default_enabled() -> bool {
    true
}

/// Tag list with duplicates removed, first occurrence kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = Vec::new();
        for tag in iter {
            let tag = tag.into();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Self(tags)
    }
}

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}

/// Plugins keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plugins(BTreeMap<String, Plugin>);

impl Plugins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Inserts or replaces the entry keyed by the plugin's name.
    pub fn upsert(&mut self, plugin: Plugin) -> Option<Plugin> {
        self.0.insert(plugin.name.clone(), plugin)
    }

    pub fn filter_by_tag(&self, tag: &str) -> Plugins {
        self.0
            .values()
            .filter(|plugin| plugin.tags.contains(tag))
            .cloned()
            .collect()
    }
}

impl Deref for Plugins {
    type Target = BTreeMap<String, Plugin>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Plugins {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<Plugin> for Plugins {
    fn from_iter<I: IntoIterator<Item = Plugin>>(iter: I) -> Self {
        let mut plugins = Self::new();
        for plugin in iter {
            plugins.upsert(plugin);
        }
        plugins
    }
}

impl IntoIterator for Plugins {
    type Item = (String, Plugin);
    type IntoIter = std::collections::btree_map::IntoIter<String, Plugin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
