use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Filename used when a plugin declares no artifact for the running platform.
pub const DEFAULT_ARTIFACT_FILE: &str = "${name}-${version}-${os}-${arch}.tar.gz";

/// Platform-specific artifacts, keyed by `os` or `os/arch`.
pub type Artifacts = BTreeMap<ArtifactIdentifier, Artifact>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub file: String,
}

impl Artifact {
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }
}

/// Identifies the platform an artifact is built for. An empty `arch` matches
/// every architecture of `os`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactIdentifier {
    pub os: String,
    pub arch: String,
}

impl ArtifactIdentifier {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    pub fn os(os: impl Into<String>) -> Self {
        Self::new(os, "")
    }
}

impl fmt::Display for ArtifactIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arch.is_empty() {
            write!(f, "{}", self.os)
        } else {
            write!(f, "{}/{}", self.os, self.arch)
        }
    }
}

impl FromStr for ArtifactIdentifier {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw.split_once('/') {
            Some((os, arch)) => Self::new(os, arch),
            None => Self::os(raw),
        })
    }
}

impl Serialize for ArtifactIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ArtifactIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let Ok(id) = raw.parse::<ArtifactIdentifier>();
        Ok(id)
    }
}

/// Operating system and architecture an artifact is resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this process runs on.
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn identifier(&self) -> ArtifactIdentifier {
        ArtifactIdentifier::new(&self.os, &self.arch)
    }

    pub fn identifier_without_arch(&self) -> ArtifactIdentifier {
        ArtifactIdentifier::os(&self.os)
    }
}

pub fn runtime_artifact_identifier() -> ArtifactIdentifier {
    Platform::current().identifier()
}

pub fn runtime_artifact_identifier_without_arch() -> ArtifactIdentifier {
    Platform::current().identifier_without_arch()
}

/// Single left-to-right pass over `template`: each placeholder is replaced
/// once and the replacement text is never scanned again.
pub(crate) fn substitute(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    'scan: while !rest.is_empty() {
        for (placeholder, value) in replacements {
            if let Some(tail) = rest.strip_prefix(placeholder) {
                out.push_str(value);
                rest = tail;
                continue 'scan;
            }
        }

        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            out.push(ch);
        }
        rest = chars.as_str();
    }

    out
}
