use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::{Dataset, RawRecord};

/// One selectable section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    /// Short tab caption.
    pub link: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Dataset file, relative to the manifest.
    pub url: String,
}

/// A local list of datasets, read from a JSON array of [`ManifestEntry`].
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
    base: PathBuf,
}

impl Manifest {
    pub fn open(path: &Path) -> Result<Self> {
        let text = read(path)?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&text, base)
    }

    pub fn parse(text: &str, base: impl Into<PathBuf>) -> Result<Self> {
        let entries: Vec<ManifestEntry> = serde_json::from_str(text)?;
        Ok(Self {
            entries,
            base: base.into(),
        })
    }

    pub fn find(&self, id: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn first(&self) -> Option<&ManifestEntry> {
        self.entries.first()
    }

    pub fn dataset_path(&self, entry: &ManifestEntry) -> PathBuf {
        self.base.join(&entry.url)
    }

    /// Read the dataset of section `id`, titled from its manifest entry.
    pub fn load(&self, id: &str) -> Result<Dataset> {
        let entry = self
            .find(id)
            .ok_or_else(|| Error::UnknownSection(id.to_string()))?;
        let path = self.dataset_path(entry);
        let data: RawRecord = serde_json::from_str(&read(&path)?)?;
        tracing::debug!("Loaded section '{}' from {}", id, path.display());
        Ok(Dataset {
            title: entry.title.clone(),
            description: entry.description.clone(),
            data,
        })
    }
}

/// Read a bare dataset file: either a `Dataset` object or a root record.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let text = read(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    if value.get("data").is_some() {
        return Ok(serde_json::from_value(value)?);
    }
    let data: RawRecord = serde_json::from_value(value)?;
    Ok(Dataset {
        title: data.name.clone(),
        description: String::new(),
        data,
    })
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
