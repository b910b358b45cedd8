//! Media catalog derived from configured library locations.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use poster_tools::normalize::normalize;

/// Kind of media a library holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    #[serde(alias = "show")]
    Series,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Series => write!(f, "series"),
        }
    }
}

/// A media library declared in the user config file.
#[derive(Debug, Clone, Deserialize)]
pub struct Library {
    pub title: String,
    pub kind: MediaKind,
    pub locations: Vec<PathBuf>,
}

/// One known media title with the locations that contain it.
///
/// Immutable per run. The title is the media folder name as it appears on
/// disk; `normalized_title` is precomputed for comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    pub kind: MediaKind,
    pub normalized_title: String,
    pub storage_paths: Vec<PathBuf>,
}

impl Library {
    /// Build catalog entries by listing the media folders in every location.
    ///
    /// A title present under several locations gets one entry carrying all of
    /// them, in location order. Entry order follows the sorted folder names of
    /// the first location that contains each title.
    pub fn catalog_entries(&self) -> Result<Vec<CatalogEntry>> {
        let mut entries: Vec<CatalogEntry> = Vec::new();
        let mut index_for_title: HashMap<String, usize> = HashMap::new();

        for location in &self.locations {
            let mut names: Vec<String> = Vec::new();
            for entry in
                fs::read_dir(location).with_context(|| format!("Failed to read library location {}", location.display()))?
            {
                let entry = entry?;
                if !entry.file_type()?.is_dir() {
                    continue;
                }
                let name = poster_tools::get_normalized_dir_name(&entry.path())?;
                if !poster_tools::is_hidden_name(&name) {
                    names.push(name);
                }
            }
            names.sort();

            for name in names {
                if let Some(&index) = index_for_title.get(&name) {
                    if !entries[index].storage_paths.contains(location) {
                        entries[index].storage_paths.push(location.clone());
                    }
                } else {
                    index_for_title.insert(name.clone(), entries.len());
                    entries.push(CatalogEntry {
                        normalized_title: normalize(&name),
                        title: name,
                        kind: self.kind,
                        storage_paths: vec![location.clone()],
                    });
                }
            }
        }

        Ok(entries)
    }
}
