use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ReportError, Result};
use crate::pipeline::ingestion::fold;

/// One entry of the user-maintained client status file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientStatus {
    /// Household tag for family-level rankings.
    pub family: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusFile {
    #[serde(default)]
    clients: HashMap<String, ClientStatus>,
}

/// Read-only client -> family/status mapping, keyed case/accent
/// insensitively. The pipeline never writes back to the store.
#[derive(Debug, Clone, Default)]
pub struct FamilyMap {
    entries: HashMap<String, ClientStatus>,
}

impl FamilyMap {
    /// Loads the mapping from a toml file. A missing or unreadable file is
    /// a configuration error: family rankings must fail loudly rather than
    /// silently report "no family data".
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!(
                "cannot read family mapping '{}': {}",
                path.display(),
                e
            ))
        })?;
        let file: StatusFile = toml::from_str(&content)?;
        Ok(Self::from_entries(file.clients))
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, ClientStatus)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(client, status)| (fold(&client), status))
                .collect(),
        }
    }

    pub fn family_of(&self, client: &str) -> Option<String> {
        self.entries.get(&fold(client))?.family.clone()
    }

    pub fn status_of(&self, client: &str) -> Option<&str> {
        self.entries.get(&fold(client))?.status.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
