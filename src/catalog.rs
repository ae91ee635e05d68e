//! Profile catalog (§6.5): a read-only source of configured tone profiles per stream scope.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::ToneProfile;

/// Read-only collaborator the match engine (C6) consults for `ToneProfile`s.
pub trait ProfileCatalog: Send + Sync {
    fn list_profiles(&self, stream_scope: &str) -> Vec<ToneProfile>;
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct CatalogFile {
    #[serde(default)]
    scopes: HashMap<String, Vec<ToneProfile>>,
}

/// Default `ProfileCatalog`: a TOML file of `[scopes.<stream_scope>]` tables,
/// each holding the profiles active for that radio system.
pub struct TomlProfileCatalog {
    scopes: HashMap<String, Vec<ToneProfile>>,
}

impl TomlProfileCatalog {
    pub fn load(path: &Path) -> Result<Self, crate::error::CatalogError> {
        let text = std::fs::read_to_string(path)?;
        let file: CatalogFile = toml::from_str(&text)?;
        Ok(Self { scopes: file.scopes })
    }

    pub fn empty() -> Self {
        Self {
            scopes: HashMap::new(),
        }
    }

    pub fn save(&self, path: &PathBuf) -> Result<(), crate::error::CatalogError> {
        let file = CatalogFile {
            scopes: self.scopes.clone(),
        };
        let text = toml::to_string_pretty(&file)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn insert_profile(&mut self, stream_scope: &str, profile: ToneProfile) {
        self.scopes
            .entry(stream_scope.to_string())
            .or_default()
            .push(profile);
    }
}

impl ProfileCatalog for TomlProfileCatalog {
    fn list_profiles(&self, stream_scope: &str) -> Vec<ToneProfile> {
        match self.scopes.get(stream_scope) {
            Some(profiles) => profiles.clone(),
            None => {
                warn!(scope = stream_scope, "no profiles configured for stream scope");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> ToneProfile {
        ToneProfile {
            profile_id: id.to_string(),
            profile_name: id.to_string(),
            a_tone: 726.8,
            b_tone: 1122.5,
            c_tone: 0.0,
            d_tone: 0.0,
            tone_tolerance_percent: 2.0,
            ignore_seconds: 300.0,
            extra: Default::default(),
        }
    }

    #[test]
    fn unknown_scope_returns_empty() {
        let catalog = TomlProfileCatalog::empty();
        assert!(catalog.list_profiles("nobody").is_empty());
    }

    #[test]
    fn inserted_profiles_are_scoped() {
        let mut catalog = TomlProfileCatalog::empty();
        catalog.insert_profile("scope-a", profile("p1"));
        assert_eq!(catalog.list_profiles("scope-a").len(), 1);
        assert!(catalog.list_profiles("scope-b").is_empty());
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.toml");

        let mut catalog = TomlProfileCatalog::empty();
        catalog.insert_profile("scope-a", profile("p1"));
        catalog.save(&path).unwrap();

        let reloaded = TomlProfileCatalog::load(&path).unwrap();
        assert_eq!(reloaded.list_profiles("scope-a").len(), 1);
    }
}
