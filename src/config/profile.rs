use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Набор скаляров для семейства устройств, загружается из YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String, // например "generic-endpoint" или "printer"
    pub scalars: BTreeMap<String, String>, // имя метрики -> OID скаляра
}

impl Profile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read profile: {}", path.display()))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let profile: Profile = serde_yml::from_str(content).context("Failed to parse profile YAML")?;

        if profile.scalars.is_empty() {
            anyhow::bail!("Profile '{}' is empty", profile.name);
        }

        Ok(profile)
    }
}
