pub mod artifact;
pub mod manifest;

pub use artifact::{
    Artifact, ArtifactIdentifier, Artifacts, DEFAULT_ARTIFACT_FILE, Platform,
    runtime_artifact_identifier, runtime_artifact_identifier_without_arch,
};
pub use manifest::{METADATA_FILE, Plugin, Plugins, Tags, plugin_dir};
