use std::path::Path;

use crate::config::Configuration;
use crate::error::CodecError;

/// Structured-file format of the registry configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Codec {
    #[default]
    Yaml,
    Toml,
}

impl Codec {
    /// `.toml` files use TOML, everything else YAML.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }

    pub fn encode(self, config: &Configuration) -> Result<Vec<u8>, CodecError> {
        let text = match self {
            Self::Yaml => serde_yaml::to_string(config)?,
            Self::Toml => toml::to_string(config)?,
        };
        Ok(text.into_bytes())
    }

    pub fn decode(self, raw: &[u8]) -> Result<Configuration, CodecError> {
        match self {
            Self::Yaml => Ok(serde_yaml::from_slice(raw)?),
            Self::Toml => {
                let text = String::from_utf8(raw.to_vec())?;
                Ok(toml::from_str(&text)?)
            }
        }
    }
}
